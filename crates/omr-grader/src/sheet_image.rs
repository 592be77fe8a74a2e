//! Image loading and the fixed working-size resize.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use serde::{Deserialize, Serialize};

use crate::GradeError;

/// Working resolution every sheet is resized to before detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 2100,
            height: 3050,
        }
    }
}

/// Decode a sheet photograph from disk.
pub fn load_sheet_image(path: impl AsRef<Path>) -> Result<DynamicImage, GradeError> {
    Ok(ImageReader::open(path)?.decode()?)
}

/// Resize to the working resolution (bilinear, aspect ratio not preserved).
pub fn prepare_image(image: &DynamicImage, size: ImageSize) -> RgbImage {
    let rgb = image.to_rgb8();
    if rgb.dimensions() == (size.width, size.height) {
        return rgb;
    }
    image::imageops::resize(&rgb, size.width, size.height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_resizes_to_working_size() {
        let img = DynamicImage::new_rgb8(300, 200);
        let out = prepare_image(&img, ImageSize::default());
        assert_eq!(out.dimensions(), (2100, 3050));
    }

    #[test]
    fn prepare_keeps_matching_size() {
        let size = ImageSize {
            width: 40,
            height: 60,
        };
        let img = DynamicImage::new_luma8(40, 60);
        let out = prepare_image(&img, size);
        assert_eq!(out.dimensions(), (40, 60));
    }
}
