//! Integer geometry kernel
//!
//! Points live in arena-pixel space with non-negative 16-bit coordinates.
//! Lines are kept in slope-intercept form (with a separate vertical case) and
//! intersect in f64; anything handed back to the simulation is truncated to
//! a `Point` again so every tick stays integer and reproducible.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A position in arena-pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Truncate a float position back into arena space (clamped to u16 range)
    pub fn from_dvec2(v: DVec2) -> Self {
        let clamp = |c: f64| c.clamp(0.0, u16::MAX as f64) as u16;
        Self {
            x: clamp(v.x),
            y: clamp(v.y),
        }
    }

    #[inline]
    pub fn as_dvec2(self) -> DVec2 {
        DVec2::new(self.x as f64, self.y as f64)
    }

    /// Euclidean distance, truncated.
    ///
    /// Truncation (not rounding) keeps equal-distance ties stable across
    /// platforms, which the resolver relies on for first-found-wins ordering.
    pub fn distance_to(self, other: Point) -> u32 {
        self.as_dvec2().distance(other.as_dvec2()) as u32
    }

    /// Truncated distance to a float position
    pub fn distance_to_vec(self, other: DVec2) -> u32 {
        self.as_dvec2().distance(other) as u32
    }
}

/// Signed per-tick movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Displacement {
    pub dx: i32,
    pub dy: i32,
}

impl Displacement {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Translate a point, saturating at the edges of arena space
    pub fn apply(self, p: Point) -> Point {
        let shift = |c: u16, d: i32| (c as i64 + d as i64).clamp(0, u16::MAX as i64) as u16;
        Point::new(shift(p.x, self.dx), shift(p.y, self.dy))
    }

    /// Mirror across a vertical surface
    pub const fn flip_x(self) -> Self {
        Self::new(self.dx.saturating_neg(), self.dy)
    }

    /// Mirror across a horizontal surface
    pub const fn flip_y(self) -> Self {
        Self::new(self.dx, self.dy.saturating_neg())
    }
}

/// An infinite line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Line {
    /// y = slope * x + intercept
    Sloped { slope: f64, intercept: f64 },
    /// x = const
    Vertical { x: f64 },
}

impl Line {
    /// Line through two points (vertical when they share an x)
    pub fn through(a: Point, b: Point) -> Self {
        let (a, b) = (a.as_dvec2(), b.as_dvec2());
        if a.x == b.x {
            return Line::Vertical { x: a.x };
        }
        let slope = (b.y - a.y) / (b.x - a.x);
        Line::Sloped {
            slope,
            intercept: a.y - slope * a.x,
        }
    }

    /// Slope, or `None` for vertical lines
    pub fn slope(&self) -> Option<f64> {
        match *self {
            Line::Sloped { slope, .. } => Some(slope),
            Line::Vertical { .. } => None,
        }
    }

    /// Parallel iff slopes compare equal; two verticals are always parallel
    pub fn is_parallel(&self, other: &Line) -> bool {
        self.slope() == other.slope()
    }

    /// Crossing point of two lines, `None` when parallel
    pub fn intersection(&self, other: &Line) -> Option<DVec2> {
        if self.is_parallel(other) {
            return None;
        }
        match (*self, *other) {
            (Line::Vertical { x }, Line::Sloped { slope, intercept })
            | (Line::Sloped { slope, intercept }, Line::Vertical { x }) => {
                Some(DVec2::new(x, slope * x + intercept))
            }
            (
                Line::Sloped {
                    slope: a0,
                    intercept: b0,
                },
                Line::Sloped {
                    slope: a1,
                    intercept: b1,
                },
            ) => {
                let x = (b1 - b0) / (a0 - a1);
                Some(DVec2::new(x, a0 * x + b0))
            }
            (Line::Vertical { .. }, Line::Vertical { .. }) => None,
        }
    }

    /// Line through `p` at a right angle to this one
    pub fn perpendicular(&self, p: Point) -> Line {
        let p = p.as_dvec2();
        match *self {
            Line::Vertical { .. } => Line::Sloped {
                slope: 0.0,
                intercept: p.y,
            },
            Line::Sloped { slope, .. } if slope == 0.0 => Line::Vertical { x: p.x },
            Line::Sloped { slope, .. } => {
                let slope = -1.0 / slope;
                Line::Sloped {
                    slope,
                    intercept: p.y - slope * p.x,
                }
            }
        }
    }

    /// Whether `p` satisfies the line equation within `tolerance`
    pub fn contains(&self, p: DVec2, tolerance: f64) -> bool {
        match *self {
            Line::Vertical { x } => (p.x - x).abs() <= tolerance,
            Line::Sloped { slope, intercept } => (slope * p.x + intercept - p.y).abs() <= tolerance,
        }
    }
}

/// A bounded piece of a line between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn line(&self) -> Line {
        Line::through(self.a, self.b)
    }

    /// Both endpoints share an x
    pub fn is_vertical(&self) -> bool {
        self.a.x == self.b.x
    }

    /// Both endpoints share a y
    pub fn is_horizontal(&self) -> bool {
        self.a.y == self.b.y
    }

    /// Movement from `a` to `b`
    pub fn displacement(&self) -> Displacement {
        Displacement::new(
            self.b.x as i32 - self.a.x as i32,
            self.b.y as i32 - self.a.y as i32,
        )
    }

    /// Midpoint, truncated
    pub fn midpoint(&self) -> Point {
        Point::from_dvec2((self.a.as_dvec2() + self.b.as_dvec2()) / 2.0)
    }

    /// Whether `p` lies inside this segment's bounding box on both axes.
    ///
    /// No tolerance: bounds are integers, so anything accepted here still lies
    /// inside the box after truncation to a `Point`.
    pub fn bounds_contain(&self, p: DVec2) -> bool {
        let (a, b) = (self.a.as_dvec2(), self.b.as_dvec2());
        let within = |v: f64, lo: f64, hi: f64| v >= lo.min(hi) && v <= lo.max(hi);
        within(p.x, a.x, b.x) && within(p.y, a.y, b.y)
    }

    /// Crossing point of two bounded segments
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        let p = self.line().intersection(&other.line())?;
        if self.bounds_contain(p) && other.bounds_contain(p) {
            Some(Point::from_dvec2(p))
        } else {
            None
        }
    }

    /// Approximate contact test for a circle of radius `distance` travelling
    /// along `route`.
    ///
    /// Measures from `route.b` to this segment: the perpendicular foot when it
    /// lands on the segment, otherwise the nearer endpoint. On a hit the
    /// route's midpoint stands in for the contact point.
    pub fn close_point(&self, route: &Segment, distance: u32) -> Option<Point> {
        let line = self.line();
        let foot = line
            .intersection(&line.perpendicular(route.b))
            .filter(|p| self.bounds_contain(*p));

        let gap = match foot {
            Some(foot) => route.b.distance_to_vec(foot),
            None => route.b.distance_to(self.a).min(route.b.distance_to(self.b)),
        };

        (gap <= distance).then(|| route.midpoint())
    }
}

/// Closed rectangle outline starting at the top-left corner, clockwise
pub fn rect_outline(origin: Point, size: (u16, u16)) -> Vec<Segment> {
    let right = origin.x.saturating_add(size.0);
    let bottom = origin.y.saturating_add(size.1);
    let tl = origin;
    let tr = Point::new(right, origin.y);
    let br = Point::new(right, bottom);
    let bl = Point::new(origin.x, bottom);
    vec![
        Segment::new(tl, tr),
        Segment::new(tr, br),
        Segment::new(br, bl),
        Segment::new(bl, tl),
    ]
}
