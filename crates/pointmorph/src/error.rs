use std::path::PathBuf;

/// Failures raised while preparing images for the morph.
#[derive(Debug, thiserror::Error)]
pub enum MorphError {
    /// A file could not be opened or decoded.
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// An image does not share the grid established by the first image.
    #[error(
        "image {path} is {}x{} but the gallery grid is {}x{}",
        found.0, found.1, expected.0, expected.1
    )]
    DimensionMismatch {
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },
    /// The point grid is square; rectangular images must be resampled first.
    #[error("image {path} is {width}x{height}; the point grid requires square images")]
    NonSquareImage {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    #[error("no images supplied")]
    EmptyGallery,
    /// A decode or mapping worker panicked.
    #[error("image worker failed: {0}")]
    Worker(String),
}
