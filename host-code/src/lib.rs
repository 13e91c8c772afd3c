//! Benchmark and cross-check several implementations of the blur5 kernel.
//!
//! Each registered variant runs against the same pristine input: first one
//! untimed warm-up of the production variant, then one timed call per
//! variant. The production output is compared byte for byte with another
//! variant's and then written to the destination image.

pub mod check;
pub mod error;
pub mod harness;
pub mod image_io;
pub mod registry;
pub mod report;

pub use check::{compare, compare_against, ComparisonOutcome};
pub use error::{BenchError, KernelFailure, Result};
pub use harness::{BenchmarkResult, Harness, HarnessConfig};
pub use image_io::{FileImageStore, ImageDescriptor, ImageStore, MemoryImageStore, PixelBuffer};
pub use registry::{Blur5Variant, KernelRegistry, KernelVariant};
pub use report::ReportWriter;

use std::{io::Write, path::Path};
use tracing::{info, warn};

/// Decode `input`, benchmark every variant of `registry`, check the
/// canonical (first) output against the output of `compare_with`, print the
/// report to `out` and write the canonical output to `output`.
///
/// A mismatch is reported, not returned as an error.
pub fn run_benchmark<S: ImageStore, W: Write>(
    store: &S,
    registry: &KernelRegistry,
    harness: &Harness,
    compare_with: &str,
    input: &Path,
    output: &Path,
    out: W,
) -> Result<ComparisonOutcome> {
    if registry.find(compare_with).is_none() {
        return Err(BenchError::UnknownVariant(compare_with.to_owned()));
    }
    let (pixels, descriptor) = store.decode(input)?;

    info!(variants = registry.len(), "Running variants for comparison...");
    let results = harness.run(registry, &pixels, &descriptor)?;
    let canonical = results.first().ok_or(BenchError::NoVariants)?;

    info!("Checking results for comparison...");
    let outcomes = compare_against(canonical, &results)?;
    for &(variant, outcome) in &outcomes {
        if let Some(index) = outcome.first_mismatch_index {
            warn!(variant, index, "output differs from {}", canonical.variant_name);
        }
    }
    let outcome = if compare_with == canonical.variant_name {
        ComparisonOutcome::equal()
    } else {
        outcomes
            .iter()
            .find_map(|&(variant, outcome)| (variant == compare_with).then_some(outcome))
            .ok_or_else(|| BenchError::UnknownVariant(compare_with.to_owned()))?
    };

    ReportWriter::new(store, out).write(&results, &outcome, &descriptor, output)?;
    Ok(outcome)
}
