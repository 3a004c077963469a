use thiserror::Error;

/// Which of the two compared inputs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("No file selected ({0} image)")]
    MissingInput(Side),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Decode(String),

    /// A raster was built with zero dimensions or a pixel buffer of the wrong length.
    #[error("{0}")]
    InvalidRaster(String),

    #[error(
        "Images must be the same size. Before: {}x{}, After: {}x{}",
        .before.0,
        .before.1,
        .after.0,
        .after.1
    )]
    DimensionMismatch { before: (u32, u32), after: (u32, u32) },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode overlay: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Comparison task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CompareError {
    /// Attach the offending side to a validation or decode failure.
    pub(crate) fn for_side(self, side: Side) -> Self {
        match self {
            Self::Validation(msg) => Self::Validation(format!("{side} image: {msg}")),
            Self::Decode(msg) => Self::Decode(format!("{side} image: {msg}")),
            other => other,
        }
    }
}
