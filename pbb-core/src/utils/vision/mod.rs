//! Vision sensing and alignment.
//!
//! - `aligner`: proportional turn-to-target controller

pub mod aligner;

pub use aligner::{AlignState, VisionAligner};

/// Signature id the sensor reports when nothing was found.
pub const NO_OBJECT_SIGNATURE: u8 = 0;

/// Largest blob of one colour signature as reported by the sensor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisionObject {
    pub signature: u8,
    /// Horizontal center coordinate in pixels.
    pub x_middle: i32,
    /// Bounding width in pixels.
    pub width: i32,
}

impl VisionObject {
    /// Whether this observation is a usable target.
    pub fn is_valid(
        &self,
        min_width: i32,
    ) -> bool {
        self.signature != NO_OBJECT_SIGNATURE && self.width >= min_width
    }
}

/// Colour-signature vision sensor.
pub trait VisionSensor {
    /// Largest object matching `signature`, or `None` when the sensor has
    /// nothing to report.
    fn largest(
        &mut self,
        signature: u8,
    ) -> Option<VisionObject>;
}

impl<V: VisionSensor + ?Sized> VisionSensor for &mut V {
    fn largest(
        &mut self,
        signature: u8,
    ) -> Option<VisionObject> {
        (**self).largest(signature)
    }
}
