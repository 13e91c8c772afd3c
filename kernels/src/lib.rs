//! blur5 kernels on interleaved 8-bit images.
//!
//! All three kernels compute the same 5x5 filter and produce byte-identical
//! output. They differ only in how the work is scheduled:
//! [`blur5`] runs one rayon task per row, [`blur5_serial`] runs on the
//! calling thread and [`blur5_parallel`] is the naive one-task-per-pixel
//! baseline.

use rayon::prelude::*;
use thiserror::Error;

mod filter;

use filter::blur_pixel;
pub use filter::{COLOR_CHANNELS, FILTER, FILTER_SIZE, SCALE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("image dimensions must be non-zero, got {width}x{height}x{channels}")]
    EmptyImage {
        width: usize,
        height: usize,
        channels: usize,
    },
    #[error("image dimensions {width}x{height}x{channels} overflow the address space")]
    TooLarge {
        width: usize,
        height: usize,
        channels: usize,
    },
    #[error("{buffer} buffer holds {actual} bytes, expected {expected}")]
    LengthMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
}

fn check_buffers(
    input: &[u8],
    output: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<(), KernelError> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(KernelError::EmptyImage {
            width,
            height,
            channels,
        });
    }
    let expected = width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(channels))
        .ok_or(KernelError::TooLarge {
            width,
            height,
            channels,
        })?;
    for (buffer, actual) in [("input", input.len()), ("output", output.len())] {
        if actual != expected {
            return Err(KernelError::LengthMismatch {
                buffer,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Production blur5: rows are distributed over the rayon pool.
pub fn blur5(
    input: &[u8],
    output: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<(), KernelError> {
    check_buffers(input, output, width, height, channels)?;
    output
        .par_chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            row.chunks_mut(channels)
                .enumerate()
                .for_each(|(x, pixel)| blur_pixel(input, width, height, channels, x, y, pixel));
        });
    Ok(())
}

/// Reference blur5 on the calling thread.
pub fn blur5_serial(
    input: &[u8],
    output: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<(), KernelError> {
    check_buffers(input, output, width, height, channels)?;
    for (y, row) in output.chunks_mut(width * channels).enumerate() {
        for (x, pixel) in row.chunks_mut(channels).enumerate() {
            blur_pixel(input, width, height, channels, x, y, pixel);
        }
    }
    Ok(())
}

/// Baseline parallel blur5: every pixel is its own work item.
pub fn blur5_parallel(
    input: &[u8],
    output: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<(), KernelError> {
    check_buffers(input, output, width, height, channels)?;
    output
        .par_chunks_mut(channels)
        .enumerate()
        .for_each(|(i, pixel)| {
            blur_pixel(input, width, height, channels, i % width, i / width, pixel)
        });
    Ok(())
}
