use serde::{Deserialize, Serialize};

use crate::detector::DetectorError;
use crate::error::CropError;

/// Number of points in the iBUG 68-point facial landmark layout.
pub const LANDMARK_COUNT: usize = 68;
/// Outer corner of the left eye (iBUG index).
pub const LEFT_EYE_OUTER: usize = 36;
/// Outer corner of the right eye (iBUG index).
pub const RIGHT_EYE_OUTER: usize = 45;

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding box of a detected face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl FaceRegion {
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection-over-Union with another region, in [0, 1].
    pub fn iou(&self, other: &FaceRegion) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - inter;

        if union > 0.0 {
            inter / union
        } else {
            0.0
        }
    }
}

/// The 68 landmark points predicted for one face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Result<Self, DetectorError> {
        if points.len() != LANDMARK_COUNT {
            return Err(DetectorError::LandmarkCount(points.len()));
        }
        Ok(Self { points })
    }

    /// Integer midpoint of the two outer eye corners.
    pub fn eye_anchor(&self) -> AnchorPoint {
        let left = self.points[LEFT_EYE_OUTER];
        let right = self.points[RIGHT_EYE_OUTER];
        AnchorPoint {
            x: ((left.x as f64 + right.x as f64) / 2.0).floor() as i64,
            y: ((left.y as f64 + right.y as f64) / 2.0).floor() as i64,
        }
    }
}

/// Pixel coordinate the output crop is centered on, in original image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub x: i64,
    pub y: i64,
}

impl AnchorPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Uniform scale applied to both image axes before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(value: f64) -> Result<Self, CropError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(CropError::InvalidScale(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Requested output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    width: u32,
    height: u32,
}

impl OutputSpec {
    pub fn new(width: u32, height: u32) -> Result<Self, CropError> {
        if width == 0 || height == 0 {
            return Err(CropError::InvalidOutputSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }
}

/// Crop bounds within the scaled image: `left <= right <= scaled_width`,
/// `top <= bottom <= scaled_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRegion {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}
