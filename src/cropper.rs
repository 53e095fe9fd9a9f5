//! Greedy nearest-neighbour ordering of the nails and the polygon crop built
//! from it.

use crate::error::CropError;
use crate::placement::PlacementStore;
use image::{DynamicImage, GrayImage, Luma, RgbaImage};

/// Nails in visiting order, treated as a closed polygon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedPath {
    pub indices: Vec<usize>,
    pub points: Vec<(u32, u32)>,
}

impl OrderedPath {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

pub struct SmartCropper {
    path: OrderedPath,
}

impl SmartCropper {
    /// Starts at the priority nail and keeps jumping to the closest nail not
    /// yet visited. Uses the `scanned` flags of the store as the visited set.
    pub fn order(store: &mut PlacementStore) -> Self {
        store.reset_scan();
        let mut path = OrderedPath::default();

        let start = match store.priority_index() {
            Some(index) => index,
            None if !store.is_empty() => 0,
            None => {
                log::debug!("No nails to order");
                return Self { path };
            }
        };

        let mut current = start;
        loop {
            store.mark_scanned(current);
            let origin = store.as_slice()[current];
            path.indices.push(current);
            path.points.push(origin.position());

            let mut closest: Option<(usize, f32)> = None;
            for (i, candidate) in store.iter().enumerate() {
                if candidate.scanned {
                    continue;
                }
                let distance = origin.distance_to(candidate);
                if closest.map_or(true, |(_, best)| distance < best) {
                    closest = Some((i, distance));
                }
            }

            match closest {
                Some((next, _)) => current = next,
                None => break,
            }
        }

        log::info!("Ordered {} nails starting from #{}", path.len(), start);
        Self { path }
    }

    pub fn path(&self) -> &OrderedPath {
        &self.path
    }

    /// Cuts the polygon traced by the path out of `source`; everything
    /// outside it becomes transparent.
    pub fn crop(&self, source: &DynamicImage) -> Result<RgbaImage, CropError> {
        if self.path.len() < 3 {
            log::info!("Nothing to crop with {} nails", self.path.len());
            return Err(CropError::NothingToCrop {
                found: self.path.len(),
            });
        }
        let rgba = source.to_rgba8();
        let mask = polygon_mask(&self.path.points, rgba.width(), rgba.height());
        Ok(apply_mask(&rgba, &mask))
    }
}

/// Single-channel mask with the closed polygon set to 255, its boundary
/// included on every side.
pub fn polygon_mask(points: &[(u32, u32)], width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let n = points.len();
    if n < 3 || width == 0 {
        return mask;
    }

    let vertices: Vec<(f32, f32)> = points.iter().map(|&(x, y)| (x as f32, y as f32)).collect();
    let mut nodes: Vec<f32> = Vec::with_capacity(n);

    for y in 0..height {
        let yf = y as f32;
        nodes.clear();
        // Edges include the closing one from the last vertex back to the first.
        for i in 0..n {
            let (xi, yi) = vertices[i];
            let (xj, yj) = vertices[(i + 1) % n];
            if (yi <= yf && yj > yf) || (yj <= yf && yi > yf) {
                let t = (yf - yi) / (yj - yi);
                nodes.push(xi + t * (xj - xi));
            }
        }
        nodes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for pair in nodes.chunks_exact(2) {
            fill_row(&mut mask, y, pair[0].ceil(), pair[1].floor());
        }

        // The half-open crossings skip the bottom row and horizontal edges.
        for i in 0..n {
            let (xi, yi) = vertices[i];
            let (xj, yj) = vertices[(i + 1) % n];
            if yf < yi.min(yj) || yf > yi.max(yj) {
                continue;
            }
            if yi == yj {
                fill_row(&mut mask, y, xi.min(xj), xi.max(xj));
            } else {
                let x = (xi + (yf - yi) / (yj - yi) * (xj - xi)).round();
                fill_row(&mut mask, y, x, x);
            }
        }
    }

    mask
}

fn fill_row(mask: &mut GrayImage, y: u32, x_start: f32, x_end: f32) {
    let x_end = x_end.min((mask.width() - 1) as f32);
    if x_end < 0.0 || x_start > x_end {
        return;
    }
    for x in x_start.max(0.0) as u32..=x_end as u32 {
        mask.put_pixel(x, y, Luma([255u8]));
    }
}

/// Source pixels where the mask is set, fully transparent elsewhere.
pub fn apply_mask(source: &RgbaImage, mask: &GrayImage) -> RgbaImage {
    let mut result = RgbaImage::new(source.width(), source.height());
    for (x, y, value) in mask.enumerate_pixels() {
        if value.0[0] > 0 && x < source.width() && y < source.height() {
            result.put_pixel(x, y, *source.get_pixel(x, y));
        }
    }
    result
}
