//! Image resolution

use serde::{Deserialize, Serialize};

/// Metres per inch.
const METRES_PER_INCH: f64 = 0.0254;

/// Resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dpi {
    pub horizontal: u32,
    pub vertical: u32,
}

impl Dpi {
    pub const fn new(horizontal: u32, vertical: u32) -> Self {
        Dpi {
            horizontal,
            vertical,
        }
    }

    /// Same resolution on both axes.
    pub const fn square(dpi: u32) -> Self {
        Self::new(dpi, dpi)
    }

    /// True if either axis is unknown (zero).
    pub fn is_null(&self) -> bool {
        self.horizontal == 0 || self.vertical == 0
    }

    /// Convert to dots per metre.
    pub fn to_dpm(&self) -> Dpm {
        Dpm {
            horizontal: (f64::from(self.horizontal) / METRES_PER_INCH).round() as u32,
            vertical: (f64::from(self.vertical) / METRES_PER_INCH).round() as u32,
        }
    }
}

/// Resolution in dots per metre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dpm {
    pub horizontal: u32,
    pub vertical: u32,
}

impl Dpm {
    /// Convert back to dots per inch.
    pub fn to_dpi(&self) -> Dpi {
        Dpi::new(
            (f64::from(self.horizontal) * METRES_PER_INCH).round() as u32,
            (f64::from(self.vertical) * METRES_PER_INCH).round() as u32,
        )
    }
}

impl From<Dpi> for Dpm {
    fn from(dpi: Dpi) -> Self {
        dpi.to_dpm()
    }
}
