//! Heightmap image decoding.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use terrain::sources::Raster;

use crate::errors::BakeError;

/// Decodes an image file into a raster of red-channel intensities.
pub fn load_raster(path: impl AsRef<Path>) -> Result<Raster, BakeError> {
    let img = image::open(path)?;
    raster_from_image(&img)
}

/// Decodes on the blocking pool and resolves once, when the raster is ready.
pub async fn load_raster_async(path: PathBuf) -> Result<Raster, BakeError> {
    tokio::task::spawn_blocking(move || load_raster(path))
        .await
        .map_err(|e| BakeError::Loader(e.to_string()))?
}

/// Converts a decoded image to a raster.
///
/// Only the red channel is read, scaled so 255 maps to 1.0. Grayscale
/// heightmaps carry the same value in every channel.
pub fn raster_from_image(img: &DynamicImage) -> Result<Raster, BakeError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let red: Vec<u8> = rgba.pixels().map(|p| p.0[0]).collect();
    Ok(Raster::from_luma8(width as usize, height as usize, &red)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_red_channel_only() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 255, 255]));
        let raster = raster_from_image(&DynamicImage::ImageRgba8(img)).unwrap();
        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 1);
        assert_eq!(raster, Raster::new(2, 1, vec![1.0, 0.0]).unwrap());
    }

    #[tokio::test]
    async fn test_load_raster_async() {
        let path =
            std::env::temp_dir().join(format!("terrain-heightmap-{}.png", std::process::id()));
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 1, Rgba([51, 51, 51, 255]));
        img.save(&path).unwrap();

        let raster = load_raster_async(path.clone()).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster, Raster::new(2, 2, vec![1.0, 0.0, 0.0, 0.2]).unwrap());

        let missing = load_raster_async(PathBuf::from("/definitely/not/here.png")).await;
        assert!(matches!(missing, Err(BakeError::Image(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_raster("/definitely/not/here.png");
        assert!(matches!(result, Err(BakeError::Image(_))));
    }
}
