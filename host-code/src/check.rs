use crate::{
    error::{BenchError, Result},
    harness::BenchmarkResult,
};
use rayon::prelude::*;

/// Verdict of an exact comparison between two outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonOutcome {
    pub equal: bool,
    pub first_mismatch_index: Option<usize>,
}

impl ComparisonOutcome {
    pub fn equal() -> Self {
        Self {
            equal: true,
            first_mismatch_index: None,
        }
    }

    pub fn mismatch(index: usize) -> Self {
        Self {
            equal: false,
            first_mismatch_index: Some(index),
        }
    }
}

/// Compare `candidate`'s output against `reference`'s, byte for byte.
///
/// There is no tolerance: outputs are 8-bit, so any difference is a bug in
/// the candidate. The lowest differing index is reported.
pub fn compare(reference: &BenchmarkResult, candidate: &BenchmarkResult) -> Result<ComparisonOutcome> {
    let (expected, actual) = (reference.output.len(), candidate.output.len());
    if expected != actual {
        return Err(BenchError::ShapeMismatch {
            reference: reference.variant_name.clone(),
            candidate: candidate.variant_name.clone(),
            expected,
            actual,
        });
    }
    let outcome = reference
        .output
        .par_iter()
        .zip(candidate.output.par_iter())
        .position_first(|(a, b)| a != b)
        .map_or_else(ComparisonOutcome::equal, ComparisonOutcome::mismatch);
    Ok(outcome)
}

/// Compare every result except `reference` itself against `reference`,
/// in the order given.
pub fn compare_against<'a>(
    reference: &BenchmarkResult,
    results: &'a [BenchmarkResult],
) -> Result<Vec<(&'a str, ComparisonOutcome)>> {
    results
        .iter()
        .filter(|result| result.variant_name != reference.variant_name)
        .map(|result| {
            compare(reference, result).map(|outcome| (result.variant_name.as_str(), outcome))
        })
        .collect()
}
