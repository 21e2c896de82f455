//! Structuring Element (SEL) for hit-miss operations
//!
//! A SEL is a small grid of [`SelElement`]s written as a text pattern:
//!
//! | char | element | meaning |
//! |------|---------|---------|
//! | `X`  | [`SelElement::Hit`] | must be black |
//! | ` `  | [`SelElement::Miss`] | must be white |
//! | `?`  | [`SelElement::DontCare`] | ignored |
//! | `+`  | [`SelElement::Paint`] | must be white, becomes black on a match |
//! | `-`  | [`SelElement::Erase`] | must be black, becomes white on a match |
//!
//! The origin is the first replacement element in row-major order (or the
//! centre when there is none), so a match whose replacement lands inside
//! the image always has its origin inside the image too.

use crate::{MorphError, MorphResult};

/// Element type in a structuring element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelElement {
    /// Don't care - this position is ignored
    #[default]
    DontCare,
    /// Hit - must match foreground (black)
    Hit,
    /// Miss - must match background (white)
    Miss,
    /// Hit that is turned white when the pattern matches
    Erase,
    /// Miss that is turned black when the pattern matches
    Paint,
}

impl SelElement {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'X' => Some(SelElement::Hit),
            ' ' => Some(SelElement::Miss),
            '?' => Some(SelElement::DontCare),
            '+' => Some(SelElement::Paint),
            '-' => Some(SelElement::Erase),
            _ => None,
        }
    }

    /// Requires a black pixel.
    pub fn is_hit(self) -> bool {
        matches!(self, SelElement::Hit | SelElement::Erase)
    }

    /// Requires a white pixel.
    pub fn is_miss(self) -> bool {
        matches!(self, SelElement::Miss | SelElement::Paint)
    }

    pub fn is_replacement(self) -> bool {
        matches!(self, SelElement::Erase | SelElement::Paint)
    }
}

/// Structuring Element (SEL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sel {
    width: u32,
    height: u32,
    cx: u32,
    cy: u32,
    data: Vec<SelElement>,
}

impl Sel {
    /// Create a SEL from a text pattern of `width * height` characters.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidSel`] if the pattern has the wrong
    /// length or contains an unknown character.
    pub fn from_pattern(pattern: &str, width: u32, height: u32) -> MorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidSel(format!(
                "empty pattern size {}x{}",
                width, height
            )));
        }
        let data = pattern
            .chars()
            .map(|c| {
                SelElement::from_char(c)
                    .ok_or_else(|| MorphError::InvalidSel(format!("unknown pattern char {:?}", c)))
            })
            .collect::<MorphResult<Vec<_>>>()?;
        if data.len() != (width * height) as usize {
            return Err(MorphError::InvalidSel(format!(
                "pattern has {} elements, expected {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self::from_elements(width, height, data))
    }

    fn from_elements(width: u32, height: u32, data: Vec<SelElement>) -> Self {
        let origin = data
            .iter()
            .position(|e| e.is_replacement())
            .map(|idx| (idx as u32 % width, idx as u32 / width))
            .unwrap_or((width / 2, height / 2));
        Sel {
            width,
            height,
            cx: origin.0,
            cy: origin.1,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Origin `(cx, cy)`.
    pub fn origin(&self) -> (u32, u32) {
        (self.cx, self.cy)
    }

    /// Get an element at (x, y)
    pub fn get_element(&self, x: u32, y: u32) -> Option<SelElement> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    fn offsets<'a>(&'a self, pred: impl Fn(SelElement) -> bool + 'a) -> impl Iterator<Item = (i32, i32)> + 'a {
        let cx = self.cx as i32;
        let cy = self.cy as i32;
        let width = self.width;
        self.data.iter().enumerate().filter_map(move |(idx, &elem)| {
            pred(elem).then(|| {
                let x = (idx as u32 % width) as i32;
                let y = (idx as u32 / width) as i32;
                (x - cx, y - cy)
            })
        })
    }

    /// Offsets that must be black, relative to the origin.
    pub fn hit_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.offsets(SelElement::is_hit)
    }

    /// Offsets that must be white, relative to the origin.
    pub fn miss_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.offsets(SelElement::is_miss)
    }

    /// Offsets turned white on a match.
    pub fn erase_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.offsets(|e| e == SelElement::Erase)
    }

    /// Offsets turned black on a match.
    pub fn paint_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.offsets(|e| e == SelElement::Paint)
    }

    fn remap(&self, new_w: u32, new_h: u32, map: impl Fn(u32, u32) -> (u32, u32)) -> Sel {
        let mut data = vec![SelElement::DontCare; self.data.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                let (nx, ny) = map(x, y);
                data[(ny * new_w + nx) as usize] = self.data[(y * self.width + x) as usize];
            }
        }
        Sel::from_elements(new_w, new_h, data)
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate_cw(&self) -> Sel {
        let h = self.height;
        self.remap(self.height, self.width, |x, y| (h - 1 - y, x))
    }

    /// Rotate 180 degrees.
    pub fn rotate_180(&self) -> Sel {
        let (w, h) = (self.width, self.height);
        self.remap(w, h, |x, y| (w - 1 - x, h - 1 - y))
    }

    /// Rotate 90 degrees counter-clockwise.
    pub fn rotate_ccw(&self) -> Sel {
        let w = self.width;
        self.remap(self.height, self.width, |x, y| (y, w - 1 - x))
    }
}
