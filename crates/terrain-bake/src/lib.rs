//! Collaborators around the terrain core.
//!
//! The core never touches files. This crate decodes heightmap images into
//! rasters, reads configuration files, and renders the evaluated lattice to
//! an image for inspection.

pub mod config_file;
pub mod errors;
pub mod export;
pub mod image_source;

pub use errors::BakeError;
