// THEORY:
// The `Color` module is the most fundamental unit of the extraction side of
// the engine: a "dumb" three-channel 8-bit triplet, always stored in
// red-green-blue order. Capture devices hand the engine whatever byte order
// their driver produces (OpenCV-style captures are blue-green-red), so the
// one piece of intelligence that lives here is `ChannelOrder`: a description
// of the incoming layout plus the conversion into the canonical `Rgb`.
//
// Key architectural principles:
// 1.  **One canonical order**: every color that leaves the extractor is RGB.
//     Conversion happens exactly once, at the point where channel sums become
//     a triplet — never downstream.
// 2.  **No color science**: there is deliberately no gamma, no luminance, no
//     color-space math here. Spatial gamma correction is a separate concern
//     (`gamma.rs`) applied after extraction.

pub mod color {
    use serde::{Deserialize, Serialize};

    pub type Channel = u8;

    /// A color triplet in red-green-blue order. The final per-LED output type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Rgb {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Rgb {
        pub const BLACK: Rgb = Rgb { red: 0, green: 0, blue: 0 };

        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }
    }

    /// The byte order of the three channels in an incoming frame buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ChannelOrder {
        /// Bytes arrive as red, green, blue.
        Rgb,
        /// Bytes arrive as blue, green, red (OpenCV-style captures).
        Bgr,
    }

    impl ChannelOrder {
        /// Build a canonical `Rgb` from the three raw channel values of one
        /// pixel, as they appear in buffer order.
        pub fn to_rgb(self, c0: Channel, c1: Channel, c2: Channel) -> Rgb {
            match self {
                ChannelOrder::Rgb => Rgb::new(c0, c1, c2),
                ChannelOrder::Bgr => Rgb::new(c2, c1, c0),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::color::{ChannelOrder, Rgb};

    #[test]
    fn bgr_buffers_are_reordered() {
        assert_eq!(ChannelOrder::Bgr.to_rgb(10, 20, 30), Rgb::new(30, 20, 10));
        assert_eq!(ChannelOrder::Rgb.to_rgb(10, 20, 30), Rgb::new(10, 20, 30));
    }
}
