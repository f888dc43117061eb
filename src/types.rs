use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 2D point in normalized image coordinates.
///
/// Face-mesh landmarks arrive with `x` and `y` in `[0, 1]` relative to the
/// frame; any depth component in the source data is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Scale a normalized point to pixel coordinates on a `width` x `height` surface.
    pub fn to_pixel(&self, width: u32, height: u32) -> (f64, f64) {
        (self.x * width as f64, self.y * height as f64)
    }
}

/// The ordered landmark list for one detected face.
///
/// Indices are only meaningful through the detector's fixed anatomical
/// mapping, see [`crate::landmarks`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmarks {
    pub points: Vec<Point>,
}

impl Landmarks {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Checked access to a landmark by index.
    pub fn get(&self, index: usize) -> Result<Point> {
        self.points
            .get(index)
            .copied()
            .ok_or(Error::LandmarkOutOfRange {
                index,
                len: self.points.len(),
            })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }
}

impl From<Vec<Point>> for Landmarks {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a Landmarks {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
