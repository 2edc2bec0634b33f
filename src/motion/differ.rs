use image::{imageops, GrayImage, RgbImage};

/// Sigma matching a 21x21 Gaussian kernel with auto-derived deviation
/// (0.3 * ((21 - 1) / 2 - 1) + 0.8).
const BLUR_SIGMA: f32 = 3.5;

/// Turns raw color frames into comparable grayscale candidates and computes
/// binary change masks against a reference baseline.
pub struct FrameDiffer {
    blur_sigma: f32,
    diff_threshold: u8,
    dilate_iterations: u32,
}

impl FrameDiffer {
    pub fn new(diff_threshold: u8, dilate_iterations: u32) -> Self {
        Self {
            blur_sigma: BLUR_SIGMA,
            diff_threshold,
            dilate_iterations,
        }
    }

    /// Grayscale + heavy blur. The blur suppresses per-pixel sensor noise so
    /// the absolute difference only reacts to real scene changes.
    pub fn grayscale_blur(&self, frame: &RgbImage) -> GrayImage {
        let gray = imageops::grayscale(frame);
        imageops::blur(&gray, self.blur_sigma)
    }

    /// Pixel-wise |reference - candidate|, thresholded to a 0/255 mask, then
    /// dilated to merge nearby changed pixels into contiguous regions.
    pub fn diff_mask(&self, reference: &GrayImage, candidate: &GrayImage) -> GrayImage {
        let width = reference.width().min(candidate.width());
        let height = reference.height().min(candidate.height());

        let mut mask = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let a = reference.get_pixel(x, y)[0];
                let b = candidate.get_pixel(x, y)[0];
                if a.abs_diff(b) > self.diff_threshold {
                    mask.put_pixel(x, y, image::Luma([255]));
                }
            }
        }

        for _ in 0..self.dilate_iterations {
            mask = dilate3x3(&mask);
        }
        mask
    }
}

/// One pass of 3x3 max-filter dilation over a binary mask.
fn dilate3x3(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut hit = false;
            'probe: for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx >= 0
                        && ny >= 0
                        && (nx as u32) < width
                        && (ny as u32) < height
                        && mask.get_pixel(nx as u32, ny as u32)[0] > 0
                    {
                        hit = true;
                        break 'probe;
                    }
                }
            }
            if hit {
                out.put_pixel(x, y, image::Luma([255]));
            }
        }
    }
    out
}
