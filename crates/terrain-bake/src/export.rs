//! Heightfield rendering.

use std::path::Path;

use image::{GrayImage, Luma};
use terrain::manager::TerrainChunkManager;
use tracing::{info, warn};

use crate::errors::BakeError;

/// Edge length used when none is given or the given one does not parse.
pub const DEFAULT_OUTPUT_SIZE: u32 = 512;

/// Reads an output edge length. Unparseable values fall back to
/// [`DEFAULT_OUTPUT_SIZE`]; zero is rejected.
pub fn parse_output_size(value: Option<&str>) -> Result<u32, BakeError> {
    let Some(value) = value else {
        return Ok(DEFAULT_OUTPUT_SIZE);
    };
    match value.trim().parse::<u32>() {
        Ok(0) => Err(BakeError::EmptyOutput),
        Ok(size) => Ok(size),
        Err(e) => {
            warn!(
                "Invalid output size {:?} ({}), using {}",
                value, e, DEFAULT_OUTPUT_SIZE
            );
            Ok(DEFAULT_OUTPUT_SIZE)
        }
    }
}

/// Lowest and highest height seen while rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRange {
    pub min: f64,
    pub max: f64,
}

/// Samples the whole lattice into a square grayscale image.
///
/// Pixel `(0, 0)` is the lattice's minimum corner. Heights are normalized to
/// the rendered range; a flat field renders black. Points with no chunk
/// behind them render black too.
pub fn render_heightfield(
    manager: &TerrainChunkManager,
    pixels_per_side: u32,
) -> (GrayImage, Option<HeightRange>) {
    let keys = manager.keys();
    if keys.is_empty() {
        return (GrayImage::new(pixels_per_side, pixels_per_side), None);
    }

    let size = manager.chunk_size();
    let min_x = keys.iter().map(|k| k.x).min().unwrap_or_default();
    let max_x = keys.iter().map(|k| k.x).max().unwrap_or_default();
    let min_z = keys.iter().map(|k| k.z).min().unwrap_or_default();
    let max_z = keys.iter().map(|k| k.z).max().unwrap_or_default();

    let origin_x = f64::from(min_x) * size - size * 0.5;
    let origin_y = f64::from(min_z) * size - size * 0.5;
    let extent = f64::from((max_x - min_x).max(max_z - min_z) + 1) * size;
    let step = extent / f64::from(pixels_per_side.max(1));

    let n = pixels_per_side as usize;
    let mut heights = Vec::with_capacity(n * n);
    let mut range: Option<HeightRange> = None;
    for row in 0..pixels_per_side {
        for col in 0..pixels_per_side {
            let x = origin_x + (f64::from(col) + 0.5) * step;
            let y = origin_y + (f64::from(row) + 0.5) * step;
            let height = manager.height_at(x, y);
            if let Some(h) = height {
                range = Some(match range {
                    Some(r) => HeightRange {
                        min: r.min.min(h),
                        max: r.max.max(h),
                    },
                    None => HeightRange { min: h, max: h },
                });
            }
            heights.push(height);
        }
    }

    let mut img = GrayImage::new(pixels_per_side, pixels_per_side);
    if let Some(r) = range {
        let span = r.max - r.min;
        for (idx, height) in heights.into_iter().enumerate() {
            let value = match height {
                Some(h) if span > 0.0 => ((h - r.min) / span * 255.0).round() as u8,
                _ => 0,
            };
            let col = (idx % n) as u32;
            let row = (idx / n) as u32;
            img.put_pixel(col, row, Luma([value]));
        }
    }

    (img, range)
}

/// Renders the lattice and writes it as a PNG.
pub fn write_png(
    manager: &TerrainChunkManager,
    pixels_per_side: u32,
    path: impl AsRef<Path>,
) -> Result<Option<HeightRange>, BakeError> {
    if pixels_per_side == 0 {
        return Err(BakeError::EmptyOutput);
    }
    let path = path.as_ref();
    let (img, range) = render_heightfield(manager, pixels_per_side);
    img.save(path)?;
    info!(path = %path.display(), pixels_per_side, "Wrote heightfield image");
    Ok(range)
}
