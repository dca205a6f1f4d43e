use crate::{EstimateClose, EPS};
use nalgebra::Point2;

/// Reference frame size used to denormalize ground-truth boxes
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSize {
    pub width: f32,
    pub height: f32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl FrameSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Pixel bounding box in the format (left, top, right, bottom)
///
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Constructs the box from (left, top, width, height)
    ///
    pub fn from_ltwh(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    /// Box of the given size centered on `center`
    ///
    pub fn centered_at(center: &Point2<f32>, width: f32, height: f32) -> Self {
        Self::from_ltwh(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(
            self.left + self.width() / 2.0,
            self.top + self.height() / 2.0,
        )
    }
}

impl EstimateClose for BoundingBox {
    fn almost_same(&self, other: &Self, eps: f32) -> bool {
        (self.left - other.left).abs() < eps
            && (self.top - other.top).abs() < eps
            && (self.right - other.right).abs() < eps
            && (self.bottom - other.bottom).abs() < eps
    }
}

impl PartialEq<Self> for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.almost_same(other, EPS)
    }
}

/// Box in the format (left, top, width, height) expressed in fractions of a [`FrameSize`]
///
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Normalizes a pixel box against the reference frame
    ///
    pub fn from_pixels(bbox: &BoundingBox, frame: FrameSize) -> Self {
        Self {
            left: bbox.left / frame.width,
            top: bbox.top / frame.height,
            width: bbox.width() / frame.width,
            height: bbox.height() / frame.height,
        }
    }

    pub fn denormalize(&self, frame: FrameSize) -> BoundingBox {
        BoundingBox::from_ltwh(
            self.left * frame.width,
            self.top * frame.height,
            self.width * frame.width,
            self.height * frame.height,
        )
    }
}
