//! What a generation pass has to do, derived from the user's options

use crate::params::{ColorMode, ColorParams, FillingColor, ForegroundType, SplittingOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderParams {
    binary_output: bool,
    mixed_output: bool,
    need_binarization: bool,
    normalize_illumination: bool,
    normalize_illumination_color: bool,
    savitzky_golay_smoothing: bool,
    morphological_smoothing: bool,
    cut_margins: bool,
    split_output: bool,
    fill_white: bool,
}

impl RenderParams {
    pub fn new(color_params: &ColorParams, splitting: &SplittingOptions) -> Self {
        let common = &color_params.color_common_options;
        let bw = &color_params.black_white_options;
        let mut rp = RenderParams {
            cut_margins: common.cut_margins,
            normalize_illumination_color: common.normalize_illumination,
            fill_white: common.fill_margins_color == FillingColor::White,
            ..Self::default()
        };
        match color_params.color_mode {
            ColorMode::BlackAndWhite => {
                rp.binary_output = true;
                rp.need_binarization = true;
            }
            ColorMode::ColorGrayscale => {}
            ColorMode::Mixed => {
                rp.mixed_output = true;
                rp.split_output = splitting.split_output;
                rp.need_binarization = !(splitting.split_output
                    && splitting.foreground_type == ForegroundType::Color);
            }
        }
        if rp.need_binarization {
            rp.normalize_illumination = bw.normalize_illumination;
            rp.savitzky_golay_smoothing = bw.savitzky_golay_smoothing;
            rp.morphological_smoothing = bw.morphological_smoothing;
        }
        rp
    }

    pub fn binary_output(&self) -> bool {
        self.binary_output
    }

    pub fn mixed_output(&self) -> bool {
        self.mixed_output
    }

    pub fn need_binarization(&self) -> bool {
        self.need_binarization
    }

    /// Illumination normalization ahead of binarization.
    pub fn normalize_illumination(&self) -> bool {
        self.normalize_illumination
    }

    /// Illumination normalization of color and grayscale content.
    pub fn normalize_illumination_color(&self) -> bool {
        self.normalize_illumination_color
    }

    pub fn need_normalize_illumination(&self) -> bool {
        (self.normalize_illumination && self.need_binarization)
            || (self.normalize_illumination_color && !self.need_binarization)
    }

    pub fn need_savitzky_golay_smoothing(&self) -> bool {
        self.savitzky_golay_smoothing
    }

    pub fn need_morphological_smoothing(&self) -> bool {
        self.morphological_smoothing
    }

    pub fn cut_margins(&self) -> bool {
        self.cut_margins
    }

    pub fn split_output(&self) -> bool {
        self.split_output
    }

    /// Margins are filled white instead of the background color.
    pub fn fill_margins_white(&self) -> bool {
        self.fill_white
    }
}
