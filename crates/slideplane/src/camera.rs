use serde::{Deserialize, Serialize};

use crate::geometry::Vector2;

/// Viewport pose over the plane.
///
/// `offset` is the plane point shown at the center of the window, in multiples of
/// screen size. `scale` is the zoom factor: 1.0 is natural size, below 1.0 zooms out.
///
/// A camera is a value. Every navigation step builds a new one so the surface can
/// interpolate between two complete poses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub offset: Vector2,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vector2::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera {
    pub const fn new(offset: Vector2, scale: f64) -> Self {
        Self { offset, scale }
    }

    pub fn with_offset(self, offset: Vector2) -> Self {
        Self { offset, ..self }
    }

    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// Shift the offset by `delta`.
    pub fn panned(self, delta: Vector2) -> Self {
        self.with_offset(self.offset + delta)
    }

    /// One zoom-in step: a third of the current scale.
    pub fn zoomed_in(self) -> Self {
        self.with_scale(self.scale + self.scale / 3.0)
    }

    /// One zoom-out step: a third of the current scale.
    pub fn zoomed_out(self) -> Self {
        self.with_scale(self.scale - self.scale / 3.0)
    }

    /// Linear interpolation between two poses; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, to: Camera, t: f64) -> Camera {
        let t = t.clamp(0.0, 1.0);
        Camera {
            offset: self.offset + (to.offset - self.offset) * t,
            scale: self.scale + (to.scale - self.scale) * t,
        }
    }
}

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
