use image::{GrayImage, RgbImage};

use crate::motion::overlay;

/// Axis-aligned bounding box of a qualifying motion region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Pixel count of the connected component.
    pub area: u64,
}

/// Per-frame classification result.
#[derive(Debug, Clone)]
pub struct Classification {
    /// True when at least one region passed the area filter.
    pub motion: bool,
    pub regions: Vec<Region>,
    /// Copy of the input frame with green boxes drawn over each region.
    /// The raw frame, not this copy, is what gets persisted as a snapshot.
    pub annotated: RgbImage,
}

/// Scans the dilated change mask for contiguous regions and keeps the ones
/// large enough to count as motion. The area floor is the primary noise
/// filter and the most important tuning constant in the pipeline.
pub struct MotionClassifier {
    min_region_area: u64,
}

impl MotionClassifier {
    pub fn new(min_region_area: u64) -> Self {
        Self { min_region_area }
    }

    pub fn classify(&self, frame: &RgbImage, mask: &GrayImage) -> Classification {
        let mut annotated = frame.clone();
        let mut regions = Vec::new();

        for region in connected_regions(mask) {
            // Strictly greater: a region exactly at the floor is still noise.
            if region.area > self.min_region_area {
                overlay::draw_rect_outline(
                    &mut annotated,
                    region.x,
                    region.y,
                    region.width,
                    region.height,
                );
                regions.push(region);
            }
        }

        Classification {
            motion: !regions.is_empty(),
            regions,
            annotated,
        }
    }
}

/// Labels 8-connected components of the binary mask and reports one region
/// per outer component (pixel count as area, tight bounding box).
fn connected_regions(mask: &GrayImage) -> Vec<Region> {
    let (width, height) = mask.dimensions();
    let mut visited = vec![false; (width * height) as usize];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for start_y in 0..height {
        for start_x in 0..width {
            let idx = (start_y * width + start_x) as usize;
            if visited[idx] || mask.get_pixel(start_x, start_y)[0] == 0 {
                continue;
            }

            let mut area = 0u64;
            let (mut min_x, mut min_y) = (start_x, start_y);
            let (mut max_x, mut max_y) = (start_x, start_y);

            visited[idx] = true;
            stack.push((start_x, start_y));

            while let Some((x, y)) = stack.pop() {
                area += 1;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);

                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx < 0 || ny < 0 || nx as u32 >= width || ny as u32 >= height {
                            continue;
                        }
                        let (nx, ny) = (nx as u32, ny as u32);
                        let nidx = (ny * width + nx) as usize;
                        if !visited[nidx] && mask.get_pixel(nx, ny)[0] > 0 {
                            visited[nidx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            regions.push(Region {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
                area,
            });
        }
    }

    regions
}
