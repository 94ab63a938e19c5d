use thiserror::Error;

#[derive(Debug, Error)]
pub enum BakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Terrain error: {0}")]
    Terrain(#[from] terrain::errors::TerrainError),
    #[error("Heightmap loader stopped before finishing: {0}")]
    Loader(String),
    #[error("Output image needs at least one pixel per side")]
    EmptyOutput,
}

impl From<terrain::errors::ConfigError> for BakeError {
    fn from(e: terrain::errors::ConfigError) -> Self {
        BakeError::Terrain(e.into())
    }
}
