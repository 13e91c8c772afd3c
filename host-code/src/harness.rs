//! Warm-up and timed execution of every registered variant.

use crate::{
    error::{BenchError, Result},
    image_io::{ImageDescriptor, PixelBuffer},
    registry::{KernelRegistry, KernelVariant},
};
use cpu_time::ProcessTime;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Output and timings of one timed variant call
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub variant_name: String,
    /// Wall-clock duration of the timed call
    pub elapsed_seconds: f64,
    /// Process CPU time over the timed call, summed over all threads
    pub cpu_seconds: f64,
    pub output: PixelBuffer,
}

/// How the harness schedules the variants' internal parallelism
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Size of a dedicated rayon pool; `None` runs on the global pool
    pub threads: Option<usize>,
    /// Cores to pin the pool's worker threads to, handed out round-robin
    pub pin_cores: Option<Vec<usize>>,
}

pub struct Harness {
    pool: Option<ThreadPool>,
}

impl Harness {
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let HarnessConfig { threads, pin_cores } = config.clone();
        if threads == Some(0) {
            return Err(BenchError::Config("threads must be at least 1".into()));
        }
        if let Some(cores) = &pin_cores {
            let available = affinity::get_core_num();
            if cores.is_empty() {
                return Err(BenchError::Config("pin-cores must name at least one core".into()));
            }
            if let Some(core) = cores.iter().find(|&&core| core >= available) {
                return Err(BenchError::Config(format!(
                    "core {core} does not exist, {available} cores available"
                )));
            }
        }
        let pool = match (threads, pin_cores) {
            (None, None) => None,
            (threads, pin_cores) => {
                let mut builder = ThreadPoolBuilder::new()
                    .thread_name(|index| format!("blur5-worker-{index}"));
                if let Some(threads) = threads.or(pin_cores.as_ref().map(Vec::len)) {
                    builder = builder.num_threads(threads);
                }
                if let Some(cores) = pin_cores {
                    builder = builder.start_handler(move |index| {
                        let core = cores[index % cores.len()];
                        if let Err(e) = affinity::set_thread_affinity(&[core]) {
                            warn!(worker = index, core, error = %e, "could not pin worker thread");
                        }
                    });
                }
                let pool = builder
                    .build()
                    .map_err(|e| BenchError::Config(e.to_string()))?;
                debug!(threads = pool.current_num_threads(), "built dedicated thread pool");
                Some(pool)
            }
        };
        Ok(Self { pool })
    }

    /// Run every variant of `registry` against the same `input`.
    ///
    /// The first variant is called once untimed to absorb one-time setup
    /// cost, then every variant is timed once in registration order. The
    /// first failing variant aborts the run.
    pub fn run(
        &self,
        registry: &KernelRegistry,
        input: &[u8],
        descriptor: &ImageDescriptor,
    ) -> Result<Vec<BenchmarkResult>> {
        match &self.pool {
            Some(pool) => pool.install(|| run_variants(registry.all(), input, descriptor)),
            None => run_variants(registry.all(), input, descriptor),
        }
    }
}

fn execute(
    variant: &KernelVariant,
    input: &[u8],
    descriptor: &ImageDescriptor,
) -> Result<PixelBuffer> {
    variant
        .run(input, descriptor)
        .map_err(|source| BenchError::KernelExecution {
            variant: variant.name().to_owned(),
            source,
        })
}

fn run_variants(
    variants: &[KernelVariant],
    input: &[u8],
    descriptor: &ImageDescriptor,
) -> Result<Vec<BenchmarkResult>> {
    let Some(first) = variants.first() else {
        return Ok(Vec::new());
    };
    debug!(variant = first.name(), "warm-up");
    execute(first, input, descriptor)?;

    let mut results = Vec::with_capacity(variants.len());
    for variant in variants {
        let cpu_start = ProcessTime::try_now()?;
        let start = Instant::now();
        let output = execute(variant, input, descriptor)?;
        let end = Instant::now();
        let cpu_end = ProcessTime::try_now()?;

        let elapsed = end
            .checked_duration_since(start)
            .ok_or_else(|| BenchError::ClockError(variant.name().to_owned()))?;
        let cpu = cpu_end.duration_since(cpu_start);
        info!(
            variant = variant.name(),
            elapsed = elapsed.as_secs_f64(),
            cpu = cpu.as_secs_f64(),
            "timed"
        );
        results.push(BenchmarkResult {
            variant_name: variant.name().to_owned(),
            elapsed_seconds: elapsed.as_secs_f64(),
            cpu_seconds: cpu.as_secs_f64(),
            output,
        });
    }
    Ok(results)
}
