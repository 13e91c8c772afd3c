use std::{io, path::PathBuf};
use thiserror::Error;

/// Error a kernel variant may return from its run function
pub type KernelFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = BenchError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("failed to decode image {}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write image {}", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("variant `{0}` is already registered")]
    DuplicateVariant(String),
    #[error("variant `{0}` is not registered")]
    UnknownVariant(String),
    #[error("variant `{variant}` failed")]
    KernelExecution {
        variant: String,
        #[source]
        source: KernelFailure,
    },
    #[error(
        "output of `{candidate}` holds {actual} bytes but `{reference}` holds {expected}"
    )]
    ShapeMismatch {
        reference: String,
        candidate: String,
        expected: usize,
        actual: usize,
    },
    #[error("clock went backwards while timing `{0}`")]
    ClockError(String),
    #[error("invalid image dimensions {width}x{height}x{channels}")]
    InvalidDescriptor {
        width: usize,
        height: usize,
        channels: usize,
    },
    #[error("no variants to report")]
    NoVariants,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
