//! Output parameters
//!
//! Everything the user can choose for a page's output: color mode and
//! its options, splitting into layers, picture shape, dewarping, depth
//! perception, plus the per-page flags the generator memoizes. All types
//! serialize with serde; enums also have short string forms.

use crate::error::{OutputError, OutputResult};
use scanout_recog::{MAX_DEPTH_PERCEPTION, MIN_DEPTH_PERCEPTION};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Enum with `as_str`, `Display` and strict `FromStr`.
macro_rules! string_enum {
    ($name:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = OutputError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(OutputError::InvalidParameters(format!(
                        concat!("unknown ", $what, ": {:?}"),
                        other
                    ))),
                }
            }
        }
    };
}

/// Kind of output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    BlackAndWhite,
    ColorGrayscale,
    Mixed,
}

string_enum!(ColorMode, "color mode", {
    BlackAndWhite => "bw",
    ColorGrayscale => "color_grayscale",
    Mixed => "mixed",
});

/// Color used for the margins around the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillingColor {
    /// The detected page background color.
    #[default]
    Background,
    White,
}

string_enum!(FillingColor, "filling color", {
    Background => "background",
    White => "white",
});

/// Options shared by all color modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorCommonOptions {
    pub fill_margins_color: FillingColor,
    /// Clip the output to the content area instead of the page box.
    pub cut_margins: bool,
    /// Normalize illumination of color and grayscale output.
    pub normalize_illumination: bool,
    pub fill_offcut: bool,
}

impl Default for ColorCommonOptions {
    fn default() -> Self {
        ColorCommonOptions {
            fill_margins_color: FillingColor::Background,
            cut_margins: true,
            normalize_illumination: false,
            fill_offcut: true,
        }
    }
}

impl ColorCommonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill_margins_color(mut self, color: FillingColor) -> Self {
        self.fill_margins_color = color;
        self
    }

    pub fn with_cut_margins(mut self, cut: bool) -> Self {
        self.cut_margins = cut;
        self
    }

    pub fn with_normalize_illumination(mut self, normalize: bool) -> Self {
        self.normalize_illumination = normalize;
        self
    }

    pub fn with_fill_offcut(mut self, fill: bool) -> Self {
        self.fill_offcut = fill;
        self
    }
}

/// Global or local thresholding algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinarizationMethod {
    #[default]
    Otsu,
    Sauvola,
    Wolf,
}

string_enum!(BinarizationMethod, "binarization method", {
    Otsu => "otsu",
    Sauvola => "sauvola",
    Wolf => "wolf",
});

/// Options of black and white output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackWhiteOptions {
    /// Bias added to the Otsu threshold, in `-100..=100`.
    pub threshold_adjustment: i32,
    pub binarization_method: BinarizationMethod,
    /// Side of the square local window; zero derives it from the DPI.
    pub window_size: u32,
    pub sauvola_coef: f64,
    pub wolf_lower_bound: u8,
    pub wolf_upper_bound: u8,
    pub wolf_coef: f64,
    pub normalize_illumination: bool,
    pub savitzky_golay_smoothing: bool,
    pub morphological_smoothing: bool,
}

impl Default for BlackWhiteOptions {
    fn default() -> Self {
        BlackWhiteOptions {
            threshold_adjustment: 0,
            binarization_method: BinarizationMethod::Otsu,
            window_size: 200,
            sauvola_coef: 0.34,
            wolf_lower_bound: 1,
            wolf_upper_bound: 254,
            wolf_coef: 0.3,
            normalize_illumination: true,
            savitzky_golay_smoothing: true,
            morphological_smoothing: true,
        }
    }
}

impl BlackWhiteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold_adjustment(mut self, adjustment: i32) -> Self {
        self.threshold_adjustment = adjustment;
        self
    }

    pub fn with_binarization_method(mut self, method: BinarizationMethod) -> Self {
        self.binarization_method = method;
        self
    }

    pub fn with_window_size(mut self, size: u32) -> Self {
        self.window_size = size;
        self
    }

    pub fn with_sauvola_coef(mut self, k: f64) -> Self {
        self.sauvola_coef = k;
        self
    }

    pub fn with_wolf_bounds(mut self, lower: u8, upper: u8) -> Self {
        self.wolf_lower_bound = lower;
        self.wolf_upper_bound = upper;
        self
    }

    pub fn with_wolf_coef(mut self, k: f64) -> Self {
        self.wolf_coef = k;
        self
    }

    pub fn with_normalize_illumination(mut self, normalize: bool) -> Self {
        self.normalize_illumination = normalize;
        self
    }

    pub fn with_savitzky_golay_smoothing(mut self, smooth: bool) -> Self {
        self.savitzky_golay_smoothing = smooth;
        self
    }

    pub fn with_morphological_smoothing(mut self, smooth: bool) -> Self {
        self.morphological_smoothing = smooth;
        self
    }

    pub fn validate(&self) -> OutputResult<()> {
        if !(-100..=100).contains(&self.threshold_adjustment) {
            return Err(OutputError::InvalidParameters(format!(
                "threshold_adjustment must be in -100..=100, got {}",
                self.threshold_adjustment
            )));
        }
        if self.window_size != 0 && self.window_size < 3 {
            return Err(OutputError::InvalidParameters(format!(
                "window_size must be 0 or at least 3, got {}",
                self.window_size
            )));
        }
        if self.wolf_lower_bound > self.wolf_upper_bound {
            return Err(OutputError::InvalidParameters(format!(
                "wolf bounds out of order: {} > {}",
                self.wolf_lower_bound, self.wolf_upper_bound
            )));
        }
        for (name, k) in [("sauvola_coef", self.sauvola_coef), ("wolf_coef", self.wolf_coef)] {
            if !k.is_finite() || k < 0.0 {
                return Err(OutputError::InvalidParameters(format!(
                    "{name} must be non-negative, got {k}"
                )));
            }
        }
        Ok(())
    }
}

/// Color mode with the options of every mode.
///
/// Options of the modes not selected are kept so switching back and
/// forth does not lose them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorParams {
    pub color_mode: ColorMode,
    pub color_common_options: ColorCommonOptions,
    pub black_white_options: BlackWhiteOptions,
}

impl ColorParams {
    pub fn new(color_mode: ColorMode) -> Self {
        ColorParams {
            color_mode,
            ..Self::default()
        }
    }

    pub fn with_color_common_options(mut self, options: ColorCommonOptions) -> Self {
        self.color_common_options = options;
        self
    }

    pub fn with_black_white_options(mut self, options: BlackWhiteOptions) -> Self {
        self.black_white_options = options;
        self
    }

    pub fn validate(&self) -> OutputResult<()> {
        self.black_white_options.validate()
    }
}

/// Content of the foreground layer of a split output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForegroundType {
    #[default]
    BlackAndWhite,
    Color,
}

impl ForegroundType {
    pub fn as_str(self) -> &'static str {
        match self {
            ForegroundType::BlackAndWhite => "bw",
            ForegroundType::Color => "color",
        }
    }
}

impl fmt::Display for ForegroundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything other than `"color"` parses as black and white.
impl FromStr for ForegroundType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "color" {
            ForegroundType::Color
        } else {
            ForegroundType::BlackAndWhite
        })
    }
}

/// Split mixed output into a foreground and a background layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SplittingOptions {
    pub split_output: bool,
    pub foreground_type: ForegroundType,
}

impl SplittingOptions {
    pub fn new(split_output: bool, foreground_type: ForegroundType) -> Self {
        SplittingOptions {
            split_output,
            foreground_type,
        }
    }
}

/// Shape of automatically detected picture areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PictureShape {
    #[default]
    Free,
    Rectangular,
}

string_enum!(PictureShape, "picture shape", {
    Free => "free",
    Rectangular => "rectangular",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PictureShapeOptions {
    pub shape: PictureShape,
    /// Percentage; see `scanout_region::rectangularize_areas`.
    pub sensitivity: u32,
}

impl Default for PictureShapeOptions {
    fn default() -> Self {
        PictureShapeOptions {
            shape: PictureShape::Free,
            sensitivity: 100,
        }
    }
}

impl PictureShapeOptions {
    pub fn new(shape: PictureShape) -> Self {
        PictureShapeOptions {
            shape,
            ..Self::default()
        }
    }

    pub fn with_sensitivity(mut self, sensitivity: u32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn validate(&self) -> OutputResult<()> {
        if self.sensitivity > 100 {
            return Err(OutputError::InvalidParameters(format!(
                "sensitivity must be in 0..=100, got {}",
                self.sensitivity
            )));
        }
        Ok(())
    }
}

/// Source of the distortion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DewarpingMode {
    #[default]
    Off,
    /// Traced from the page content.
    Auto,
    /// Edited by the user and stored with the page.
    Manual,
    /// Fitted to the page margins.
    Marginal,
}

string_enum!(DewarpingMode, "dewarping mode", {
    Off => "off",
    Auto => "auto",
    Manual => "manual",
    Marginal => "marginal",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DewarpingOptions {
    pub mode: DewarpingMode,
    /// Deskew the dewarped image (marginal and manual modes only).
    pub post_deskew: bool,
}

impl Default for DewarpingOptions {
    fn default() -> Self {
        DewarpingOptions {
            mode: DewarpingMode::Off,
            post_deskew: true,
        }
    }
}

impl DewarpingOptions {
    pub fn new(mode: DewarpingMode) -> Self {
        DewarpingOptions {
            mode,
            ..Self::default()
        }
    }

    pub fn with_post_deskew(mut self, post_deskew: bool) -> Self {
        self.post_deskew = post_deskew;
        self
    }
}

/// How strongly the dewarper assumes the page curls away from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepthPerception(f64);

impl DepthPerception {
    pub const DEFAULT: f64 = 2.0;

    /// Clamps `value` into the supported range.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        DepthPerception(value.clamp(MIN_DEPTH_PERCEPTION, MAX_DEPTH_PERCEPTION))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for DepthPerception {
    fn default() -> Self {
        DepthPerception(Self::DEFAULT)
    }
}

impl fmt::Display for DepthPerception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DepthPerception {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .map(DepthPerception::new)
            .map_err(|e| OutputError::InvalidParameters(format!("bad depth perception {s:?}: {e}")))
    }
}

/// Per-page decisions the generator makes once and then reuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputProcessingParams {
    /// Rectangular picture zones were already added to the page.
    pub auto_zones_found: bool,
    pub white_on_black_auto_detected: bool,
    pub white_on_black_mode: bool,
}
