//! Drawable shape descriptors
//!
//! The simulation never draws. Each frame it hands the rendering side a flat
//! list of circles and rectangles in arena-pixel space.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sim::geom::Point;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Random opaque colour, never fully black (invisible on the background)
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let color = Self::rgb(rng.random(), rng.random(), rng.random());
            if color != crate::consts::BACKGROUND {
                return color;
            }
        }
    }
}

/// One thing to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// Filled circle around `center`
    Circle {
        center: Point,
        radius: u16,
        color: Color,
    },
    /// Filled axis-aligned rectangle with its top-left corner at `origin`
    Rect {
        origin: Point,
        width: u16,
        height: u16,
        color: Color,
    },
}

impl Shape {
    pub fn color(&self) -> Color {
        match *self {
            Shape::Circle { color, .. } | Shape::Rect { color, .. } => color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_color_is_deterministic() {
        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        for _ in 0..16 {
            assert_eq!(Color::random(&mut a), Color::random(&mut b));
        }
    }

    #[test]
    fn test_shape_json() {
        let shape = Shape::Circle {
            center: Point::new(400, 300),
            radius: 10,
            color: Color::rgb(0xff, 0xff, 0),
        };
        let json = serde_json::to_string(&shape).unwrap();
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
        assert_eq!(back.color(), Color::rgb(0xff, 0xff, 0));
    }
}
