//! Connected component analysis
//!
//! Two-pass labeling with a union-find table. Components are sets of
//! pixels of a chosen color (`BwColor::Black` for ink, `BwColor::White`
//! for holes and picture areas of a mask).

use crate::error::{RegionError, RegionResult};
use scanout_core::{BwColor, Pix, PixelDepth, Rect};

/// Connectivity type for component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityType {
    /// 4-way connectivity (up, down, left, right)
    FourWay,
    /// 8-way connectivity (includes diagonals)
    #[default]
    EightWay,
}

/// A connected component in an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedComponent {
    /// Label in the owning [`ComponentMap`], starting at 1
    pub label: u32,
    /// Number of pixels in this component
    pub pixel_count: u32,
    /// Bounding box of this component
    pub bounds: Rect,
}

/// Per-pixel labels plus the component list.
///
/// Label 0 means background; component `i` of [`components`] has label
/// `i + 1`.
///
/// [`components`]: ComponentMap::components
#[derive(Debug, Clone)]
pub struct ComponentMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    components: Vec<ConnectedComponent>,
}

impl ComponentMap {
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Label at `(x, y)`, 0 for background.
    #[inline]
    pub fn label(&self, x: u32, y: u32) -> u32 {
        self.labels[(y * self.width + x) as usize]
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn components(&self) -> &[ConnectedComponent] {
        &self.components
    }

    pub fn component(&self, label: u32) -> Option<&ConnectedComponent> {
        label
            .checked_sub(1)
            .and_then(|i| self.components.get(i as usize))
    }

    /// 1 bpp image holding the components for which `keep` returns true.
    pub fn render(&self, keep: impl Fn(&ConnectedComponent) -> bool) -> RegionResult<Pix> {
        let kept: Vec<bool> = std::iter::once(false)
            .chain(self.components.iter().map(keep))
            .collect();
        let mut out = Pix::new(self.width, self.height, PixelDepth::Bit1)?.into_mut();
        for y in 0..self.height {
            for x in 0..self.width {
                if kept[self.label(x, y) as usize] {
                    out.set_pixel_unchecked(x, y, 1);
                }
            }
        }
        Ok(out.into())
    }
}

struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        // Slot 0 is the background label.
        UnionFind { parent: vec![0] }
    }

    fn make(&mut self) -> u32 {
        let l = self.parent.len() as u32;
        self.parent.push(l);
        l
    }

    fn find(&mut self, mut l: u32) -> u32 {
        while self.parent[l as usize] != l {
            let grand = self.parent[self.parent[l as usize] as usize];
            self.parent[l as usize] = grand;
            l = grand;
        }
        l
    }

    fn union(&mut self, a: u32, b: u32) -> u32 {
        let ra = self.find(a);
        let rb = self.find(b);
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[hi as usize] = lo;
        lo
    }
}

/// Label the connected components of `color` pixels in a binary image.
pub fn label_components(
    pix: &Pix,
    color: BwColor,
    connectivity: ConnectivityType,
) -> RegionResult<ComponentMap> {
    if pix.depth() != PixelDepth::Bit1 {
        return Err(RegionError::UnsupportedDepth {
            expected: "1 bpp",
            actual: pix.depth().bits(),
        });
    }
    let w = pix.width();
    let h = pix.height();
    let want = color.bit();
    let mut labels = vec![0u32; (w * h) as usize];
    let mut uf = UnionFind::new();

    for y in 0..h {
        for x in 0..w {
            if pix.get_pixel_unchecked(x, y) != want {
                continue;
            }
            let idx = (y * w + x) as usize;
            let mut l = 0u32;
            let neighbor = |nl: u32, l: &mut u32, uf: &mut UnionFind| {
                if nl != 0 {
                    *l = if *l == 0 { nl } else { uf.union(*l, nl) };
                }
            };
            if x > 0 {
                neighbor(labels[idx - 1], &mut l, &mut uf);
            }
            if y > 0 {
                let up = idx - w as usize;
                neighbor(labels[up], &mut l, &mut uf);
                if connectivity == ConnectivityType::EightWay {
                    if x > 0 {
                        neighbor(labels[up - 1], &mut l, &mut uf);
                    }
                    if x + 1 < w {
                        neighbor(labels[up + 1], &mut l, &mut uf);
                    }
                }
            }
            labels[idx] = if l == 0 { uf.make() } else { l };
        }
    }

    // Resolve to compact labels and gather statistics.
    let mut compact = vec![0u32; uf.parent.len()];
    let mut components: Vec<ConnectedComponent> = Vec::new();
    let mut extents: Vec<(i32, i32, i32, i32)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if labels[idx] == 0 {
                continue;
            }
            let root = uf.find(labels[idx]) as usize;
            if compact[root] == 0 {
                components.push(ConnectedComponent {
                    label: components.len() as u32 + 1,
                    pixel_count: 0,
                    bounds: Rect::default(),
                });
                extents.push((x as i32, y as i32, x as i32, y as i32));
                compact[root] = components.len() as u32;
            }
            let l = compact[root];
            labels[idx] = l;
            let i = (l - 1) as usize;
            components[i].pixel_count += 1;
            let e = &mut extents[i];
            e.0 = e.0.min(x as i32);
            e.1 = e.1.min(y as i32);
            e.2 = e.2.max(x as i32);
            e.3 = e.3.max(y as i32);
        }
    }
    for (c, e) in components.iter_mut().zip(&extents) {
        c.bounds = Rect::new(e.0, e.1, e.2 - e.0 + 1, e.3 - e.1 + 1);
    }

    Ok(ComponentMap {
        width: w,
        height: h,
        labels,
        components,
    })
}

/// Find the black connected components of a binary image.
pub fn find_connected_components(
    pix: &Pix,
    connectivity: ConnectivityType,
) -> RegionResult<Vec<ConnectedComponent>> {
    Ok(label_components(pix, BwColor::Black, connectivity)?.components)
}
