//! Viewport-derived table height

use serde::{Deserialize, Serialize};

/// Share of the window a regular table may occupy
pub const REGULAR_HEIGHT_RATIO: f64 = 0.7;

/// Share of the window a dense table may occupy
pub const DENSE_HEIGHT_RATIO: f64 = 0.75;

/// Row density of a view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Regular,
    Dense,
}

impl Density {
    #[must_use]
    pub const fn height_ratio(self) -> f64 {
        match self {
            Self::Regular => REGULAR_HEIGHT_RATIO,
            Self::Dense => DENSE_HEIGHT_RATIO,
        }
    }

    /// Maximum table height for a window of `viewport_height` pixels
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn max_height(self, viewport_height: u32) -> u32 {
        (f64::from(viewport_height) * self.height_ratio()).floor() as u32
    }
}

/// Source of the current window height
pub trait ViewportSource {
    fn height(&self) -> u32;
}

/// Fixed-height viewport, for headless use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedViewport(pub u32);

impl ViewportSource for FixedViewport {
    fn height(&self) -> u32 {
        self.0
    }
}
