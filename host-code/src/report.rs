use crate::{
    check::ComparisonOutcome,
    error::{BenchError, Result},
    harness::BenchmarkResult,
    image_io::{ImageDescriptor, ImageStore},
};
use std::{io::Write, path::Path};

/// Prints the timing report and persists the canonical output.
pub struct ReportWriter<'a, S: ImageStore, W: Write> {
    store: &'a S,
    out: W,
}

impl<'a, S: ImageStore, W: Write> ReportWriter<'a, S, W> {
    pub fn new(store: &'a S, out: W) -> Self {
        Self { store, out }
    }

    /// Print one timing line per result and the verdict, then encode the
    /// first (production) result's output to `destination`.
    pub fn write(
        &mut self,
        results: &[BenchmarkResult],
        outcome: &ComparisonOutcome,
        descriptor: &ImageDescriptor,
        destination: &Path,
    ) -> Result<()> {
        let canonical = results.first().ok_or(BenchError::NoVariants)?;
        for result in results {
            writeln!(
                self.out,
                "Time taken for {}: {:.4} seconds",
                result.variant_name, result.elapsed_seconds
            )?;
        }
        writeln!(self.out, "{}", verdict(outcome))?;
        self.out.flush()?;
        self.store
            .encode(destination, &canonical.output, descriptor)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn verdict(outcome: &ComparisonOutcome) -> &'static str {
    if outcome.equal {
        "Code results are correct."
    } else {
        "Code results are incorrect."
    }
}
