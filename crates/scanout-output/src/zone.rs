//! Picture and fill zones
//!
//! A zone is a closed outline in original image coordinates plus a set
//! of properties. Picture zones force areas of a mixed page into or out
//! of the picture layer; fill zones paint areas of the output with a
//! solid color.

use scanout_core::{Polygon, Transform, color};
use serde::{Deserialize, Serialize};

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// As a 32 bpp pixel.
    pub fn to_pixel(self) -> u32 {
        color::compose_rgb(self.r, self.g, self.b)
    }

    pub fn gray(self) -> u8 {
        color::gray(self.to_pixel())
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

/// How a picture zone edits the picture mask. Layers apply in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PictureLayer {
    #[default]
    NoOp,
    /// Remove from the picture layer.
    Eraser1,
    /// Add to the picture layer.
    Painter2,
    /// Remove, applied after the painters.
    Eraser3,
}

/// Who created a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneCategory {
    #[default]
    Manual,
    /// Added by rectangular picture detection; replaced on redetection.
    RectangularOutline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneProperty {
    FillColor(Rgb),
    PictureLayer(PictureLayer),
    ZoneCategory(ZoneCategory),
}

impl ZoneProperty {
    fn same_kind(&self, other: &ZoneProperty) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// At most one property of each kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertySet {
    props: Vec<ZoneProperty>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `prop`, replacing a property of the same kind.
    pub fn set(&mut self, prop: ZoneProperty) {
        match self.props.iter_mut().find(|p| p.same_kind(&prop)) {
            Some(slot) => *slot = prop,
            None => self.props.push(prop),
        }
    }

    pub fn with(mut self, prop: ZoneProperty) -> Self {
        self.set(prop);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneProperty> {
        self.props.iter()
    }

    /// White when not set.
    pub fn fill_color(&self) -> Rgb {
        self.props
            .iter()
            .find_map(|p| match p {
                ZoneProperty::FillColor(c) => Some(*c),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn picture_layer(&self) -> PictureLayer {
        self.props
            .iter()
            .find_map(|p| match p {
                ZoneProperty::PictureLayer(l) => Some(*l),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn zone_category(&self) -> ZoneCategory {
        self.props
            .iter()
            .find_map(|p| match p {
                ZoneProperty::ZoneCategory(c) => Some(*c),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Closed outline in original image coordinates.
    spline: Polygon,
    properties: PropertySet,
}

impl Zone {
    pub fn new(spline: Polygon, properties: PropertySet) -> Self {
        Zone { spline, properties }
    }

    /// Picture zone found by rectangular picture detection.
    pub fn auto_picture(spline: Polygon) -> Self {
        let properties = PropertySet::new()
            .with(ZoneProperty::PictureLayer(PictureLayer::Painter2))
            .with(ZoneProperty::ZoneCategory(ZoneCategory::RectangularOutline));
        Zone { spline, properties }
    }

    pub fn spline(&self) -> &Polygon {
        &self.spline
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }

    /// Outline mapped through `xform`.
    pub fn polygon(&self, xform: &Transform) -> Polygon {
        xform.map_polygon(&self.spline)
    }
}

/// Ordered list of zones.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, zone: Zone) {
        self.zones.push(zone);
    }

    /// Remove the zones matching `pred`, returning how many went.
    pub fn remove_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Zone) -> bool,
    {
        let before = self.zones.len();
        self.zones.retain(|z| !pred(z));
        before - self.zones.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl<'a> IntoIterator for &'a ZoneSet {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}

impl FromIterator<Zone> for ZoneSet {
    fn from_iter<I: IntoIterator<Item = Zone>>(iter: I) -> Self {
        ZoneSet {
            zones: iter.into_iter().collect(),
        }
    }
}
