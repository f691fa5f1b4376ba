#![forbid(unsafe_code)]

//! Geometric primitives.

/// A position in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// One of the two scroll axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The axis with the larger magnitude. Ties go to the horizontal axis.
    #[inline]
    #[must_use]
    pub fn dominant(dx: f32, dy: f32) -> Self {
        if dx.abs() >= dy.abs() {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }

    /// Select the component of `(dx, dy)` along this axis.
    #[inline]
    #[must_use]
    pub const fn pick(self, dx: f32, dy: f32) -> f32 {
        match self {
            Self::Horizontal => dx,
            Self::Vertical => dy,
        }
    }
}
