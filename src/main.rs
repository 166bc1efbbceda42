// This file is a small example runner for the `glowcast` library.
// The main library entry point is `src/lib.rs`.

use glowcast::{
    ChannelOrder, ExtractionStrategy, LedPipeline, PipelineConfig, SamplingLayout,
};
use glowcast::core_modules::layout::{Direction, StartCorner};

fn main() {
    env_logger::init();
    println!("glowcast - example runner");

    let config = PipelineConfig {
        frame_width: 640,
        frame_height: 360,
        top_curve: "M 20 20 C 220 10 420 10 620 20".into(),
        right_curve: "M 620 20 C 630 120 630 240 620 340".into(),
        bottom_curve: "M 620 340 C 420 350 220 350 20 340".into(),
        left_curve: "M 20 340 C 10 240 10 120 20 20".into(),
        curve_samples: 50,
        polygon_samples: 15,
        fit_curves: false,
        scale_factor: 1.0,
        layout: SamplingLayout::EdgeSlices {
            horizontal_slices: 20,
            vertical_slices: 12,
            horizontal_coverage_percent: 12.0,
            vertical_coverage_percent: 8.0,
        },
        strategy: ExtractionStrategy::Mean,
        channel_order: ChannelOrder::Rgb,
        start_corner: StartCorner::TopLeft,
        direction: Direction::Clockwise,
        gamma: None,
    };

    let pipeline = match LedPipeline::new(config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            eprintln!("setup failed: {err}");
            std::process::exit(1);
        }
    };

    // Either a real image from the command line, or a synthetic horizontal
    // gradient so the runner works standalone.
    let frame = match std::env::args().nth(1) {
        Some(path) => match image::open(&path) {
            Ok(img) => {
                let rgb = img
                    .resize_exact(640, 360, image::imageops::FilterType::Triangle)
                    .to_rgb8();
                rgb.into_raw()
            }
            Err(err) => {
                eprintln!("could not open {path}: {err}");
                std::process::exit(1);
            }
        },
        None => synthetic_gradient(640, 360),
    };

    let colors = pipeline.process_frame(&frame);
    for (led, color) in colors.iter().enumerate() {
        println!("LED {led:3}: ({:3}, {:3}, {:3})", color.red, color.green, color.blue);
    }
}

fn synthetic_gradient(width: u32, height: u32) -> Vec<u8> {
    let mut frame = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            frame.push((x * 255 / width.max(1)) as u8);
            frame.push((y * 255 / height.max(1)) as u8);
            frame.push(128);
        }
    }
    frame
}
