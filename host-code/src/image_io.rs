use crate::error::{BenchError, Result};
use image::{
    error::{ParameterError, ParameterErrorKind},
    ColorType, DynamicImage, ImageError,
};
use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Interleaved, row-major 8-bit samples
pub type PixelBuffer = Vec<u8>;

/// Shape of a decoded image. All dimensions are non-zero and the buffer
/// size fits in a `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDescriptor {
    width: usize,
    height: usize,
    channels: usize,
}

impl ImageDescriptor {
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        let size = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(channels));
        if width == 0 || height == 0 || channels == 0 || size.is_none() {
            return Err(BenchError::InvalidDescriptor {
                width,
                height,
                channels,
            });
        }
        Ok(Self {
            width,
            height,
            channels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of bytes in a buffer of this shape
    pub fn len(&self) -> usize {
        self.width * self.height * self.channels
    }

    /// Always false: a descriptor cannot be built with a zero dimension
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }
}

/// The boundary to image files. The harness never touches a file format
/// directly.
pub trait ImageStore {
    fn decode(&self, path: &Path) -> Result<(PixelBuffer, ImageDescriptor)>;

    fn encode(&self, path: &Path, pixels: &[u8], descriptor: &ImageDescriptor) -> Result<()>;
}

/// [`ImageStore`] on the filesystem, backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageStore;

fn parameter_error(kind: ParameterErrorKind) -> ImageError {
    ImageError::Parameter(ParameterError::from_kind(kind))
}

fn color_type(channels: usize) -> Option<ColorType> {
    match channels {
        1 => Some(ColorType::L8),
        2 => Some(ColorType::La8),
        3 => Some(ColorType::Rgb8),
        4 => Some(ColorType::Rgba8),
        _ => None,
    }
}

// 8-bit layouts are kept as they are; deeper or float images are narrowed
// to RGB8, or RGBA8 when they carry alpha.
fn into_raw(image: DynamicImage) -> (PixelBuffer, usize) {
    match image {
        DynamicImage::ImageLuma8(buf) => (buf.into_raw(), 1),
        DynamicImage::ImageLumaA8(buf) => (buf.into_raw(), 2),
        DynamicImage::ImageRgb8(buf) => (buf.into_raw(), 3),
        DynamicImage::ImageRgba8(buf) => (buf.into_raw(), 4),
        other if other.color().has_alpha() => (other.into_rgba8().into_raw(), 4),
        other => (other.into_rgb8().into_raw(), 3),
    }
}

impl ImageStore for FileImageStore {
    fn decode(&self, path: &Path) -> Result<(PixelBuffer, ImageDescriptor)> {
        let image = image::open(path).map_err(|source| BenchError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let (width, height) = (image.width() as usize, image.height() as usize);
        let (pixels, channels) = into_raw(image);
        let descriptor = ImageDescriptor::new(width, height, channels)?;
        tracing::debug!(path = %path.display(), width, height, channels, "decoded image");
        Ok((pixels, descriptor))
    }

    fn encode(&self, path: &Path, pixels: &[u8], descriptor: &ImageDescriptor) -> Result<()> {
        let write_error = |source: ImageError| BenchError::ImageWrite {
            path: path.to_path_buf(),
            source,
        };
        let color = color_type(descriptor.channels()).ok_or_else(|| {
            write_error(parameter_error(ParameterErrorKind::Generic(format!(
                "cannot encode {} channels",
                descriptor.channels()
            ))))
        })?;
        if pixels.len() != descriptor.len() {
            return Err(write_error(parameter_error(
                ParameterErrorKind::DimensionMismatch,
            )));
        }
        let (width, height) = match (
            u32::try_from(descriptor.width()),
            u32::try_from(descriptor.height()),
        ) {
            (Ok(width), Ok(height)) => (width, height),
            _ => {
                return Err(write_error(parameter_error(
                    ParameterErrorKind::DimensionMismatch,
                )))
            }
        };
        image::save_buffer(path, pixels, width, height, color).map_err(write_error)?;
        tracing::debug!(path = %path.display(), "wrote image");
        Ok(())
    }
}

/// In-memory [`ImageStore`], for driving the pipeline without touching disk
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: Mutex<HashMap<PathBuf, (PixelBuffer, ImageDescriptor)>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, pixels: PixelBuffer, descriptor: ImageDescriptor) {
        self.lock().insert(path.into(), (pixels, descriptor));
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<(PixelBuffer, ImageDescriptor)> {
        self.lock().get(path.as_ref()).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, (PixelBuffer, ImageDescriptor)>> {
        self.images
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ImageStore for MemoryImageStore {
    fn decode(&self, path: &Path) -> Result<(PixelBuffer, ImageDescriptor)> {
        self.get(path).ok_or_else(|| BenchError::ImageDecode {
            path: path.to_path_buf(),
            source: ImageError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                "no such image in memory store",
            )),
        })
    }

    fn encode(&self, path: &Path, pixels: &[u8], descriptor: &ImageDescriptor) -> Result<()> {
        if pixels.len() != descriptor.len() {
            return Err(BenchError::ImageWrite {
                path: path.to_path_buf(),
                source: parameter_error(ParameterErrorKind::DimensionMismatch),
            });
        }
        self.insert(path, pixels.to_vec(), *descriptor);
        Ok(())
    }
}
