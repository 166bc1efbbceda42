// THEORY:
// The `layout` module owns the mapping between *cells* (the order the
// geometry generates sampling regions in) and *LEDs* (the order the physical
// strip is wired in). The two orders rarely agree: edge cells are generated
// top, bottom, left, right for geometric convenience, while a backlight
// strip snakes around the perimeter from whatever corner the wiring starts
// at, in whichever direction the installer soldered it.
//
// Key architectural principles:
// 1.  **Bijection invariant**: the mapping is a permutation of
//     [0, total). Every cell feeds exactly one LED and vice versa; the
//     constructor refuses anything else by construction.
// 2.  **Traversal is configuration**: the starting corner and direction of
//     an edge layout are parameters, not assumptions. Different controller
//     firmwares disagreed on this historically; hard-coding it was a bug
//     factory.
// 3.  **Perimeter geometry lives here**: the layout also knows each cell's
//     position along the physical perimeter (measured clockwise from the
//     top-left corner, in LED units). The gamma blender consumes that; it
//     has no business re-deriving strip geometry.

use serde::{Deserialize, Serialize};

/// The physical corner where LED index 0 sits on an edge strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartCorner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

/// Which way LED indices advance around the perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Grid { rows: u32, cols: u32 },
    Edge { top: u32, right: u32, bottom: u32, left: u32 },
}

/// A deterministic, bijective mapping from cell index to LED index.
#[derive(Debug, Clone)]
pub struct LedLayout {
    kind: Kind,
    /// `order[led]` is the cell whose color that LED shows.
    order: Vec<usize>,
    /// Clockwise-from-top-left perimeter coordinate per *cell*, in LED
    /// units. Empty for grid layouts.
    cell_perimeter: Vec<f64>,
}

impl LedLayout {
    /// A rows × cols matrix wired row-major: cell index equals LED index.
    pub fn grid(rows: u32, cols: u32) -> Self {
        let total = (rows * cols) as usize;
        Self {
            kind: Kind::Grid { rows, cols },
            order: (0..total).collect(),
            cell_perimeter: Vec::new(),
        }
    }

    /// A perimeter strip with the given per-edge LED counts, wired clockwise
    /// from the top-left corner. Cell order is the edge-slice generation
    /// order (top and bottom left-to-right, left and right top-to-bottom).
    pub fn edge_clockwise(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self::edge(top, right, bottom, left, StartCorner::TopLeft, Direction::Clockwise)
    }

    /// A perimeter strip with an explicit wiring start corner and direction.
    pub fn edge(
        top: u32,
        right: u32,
        bottom: u32,
        left: u32,
        start: StartCorner,
        direction: Direction,
    ) -> Self {
        let (t, r, b, l) = (top as usize, right as usize, bottom as usize, left as usize);

        // Cell blocks in generation order: top, bottom, left, right.
        let top_block = 0;
        let bottom_block = t;
        let left_block = t + b;
        let right_block = t + b + l;

        // Canonical clockwise-from-top-left traversal, expressed in cell
        // indices: top L->R, right T->B, bottom R->L, left B->T.
        let mut order = Vec::with_capacity(t + r + b + l);
        order.extend((0..t).map(|j| top_block + j));
        order.extend((0..r).map(|j| right_block + j));
        order.extend((0..b).rev().map(|j| bottom_block + j));
        order.extend((0..l).rev().map(|j| left_block + j));

        // Every cell's physical perimeter coordinate falls out of the
        // canonical traversal directly.
        let mut cell_perimeter = vec![0.0; order.len()];
        for (coord, &cell) in order.iter().enumerate() {
            cell_perimeter[cell] = coord as f64;
        }

        if direction == Direction::CounterClockwise {
            order.reverse();
        }
        let offset = match (direction, start) {
            (Direction::Clockwise, StartCorner::TopLeft) => 0,
            (Direction::Clockwise, StartCorner::TopRight) => t,
            (Direction::Clockwise, StartCorner::BottomRight) => t + r,
            (Direction::Clockwise, StartCorner::BottomLeft) => t + r + b,
            (Direction::CounterClockwise, StartCorner::TopLeft) => 0,
            (Direction::CounterClockwise, StartCorner::BottomLeft) => l,
            (Direction::CounterClockwise, StartCorner::BottomRight) => l + b,
            (Direction::CounterClockwise, StartCorner::TopRight) => l + b + r,
        };
        order.rotate_left(offset);

        Self {
            kind: Kind::Edge { top, right, bottom, left },
            order,
            cell_perimeter,
        }
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    /// The cell whose color LED `led` shows.
    pub fn cell_for_led(&self, led: usize) -> usize {
        self.order[led]
    }

    /// `order[led] == cell` view of the whole mapping.
    pub fn led_order(&self) -> &[usize] {
        &self.order
    }

    /// Grid layouts only: the LED index for a row/col position.
    pub fn grid_to_led(&self, row: u32, col: u32) -> Option<usize> {
        match self.kind {
            Kind::Grid { rows, cols } if row < rows && col < cols => {
                Some((row * cols + col) as usize)
            }
            _ => None,
        }
    }

    /// Edge layouts only: per-edge LED counts as (top, right, bottom, left).
    pub fn edge_counts(&self) -> Option<(u32, u32, u32, u32)> {
        match self.kind {
            Kind::Edge { top, right, bottom, left } => Some((top, right, bottom, left)),
            Kind::Grid { .. } => None,
        }
    }

    /// Edge layouts only: the clockwise-from-top-left perimeter coordinate
    /// of the cell a given LED shows.
    pub fn perimeter_coordinate(&self, led: usize) -> Option<f64> {
        if self.cell_perimeter.is_empty() {
            None
        } else {
            Some(self.cell_perimeter[self.order[led]])
        }
    }
}
