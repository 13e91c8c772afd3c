use anyhow::Context;
use blurbench::{run_benchmark, Blur5Variant, FileImageStore, Harness, HarnessConfig, KernelRegistry};
use clap::Parser;
use std::{io, path::PathBuf};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Times the blur5 variants on one image and checks that they agree
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Image to blur
    input: PathBuf,
    /// Destination of the production variant's output
    output: PathBuf,
    /// Variant whose output the production output is checked against
    #[arg(long, value_enum, default_value_t = Blur5Variant::Serial)]
    compare_with: Blur5Variant,
    /// Run the variants on a dedicated pool of this many worker threads
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    threads: Option<u32>,
    /// Pin worker threads to these cores (comma separated)
    #[arg(long, value_delimiter = ',')]
    pin_cores: Option<Vec<usize>>,
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = try_main(cli) {
        eprintln!("{e:?}");
        std::process::exit(-1);
    }
}

/// Progress and warnings are shown unless `RUST_LOG` asks for less
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        input,
        output,
        compare_with,
        threads,
        pin_cores,
    } = cli;
    let config = HarnessConfig {
        threads: threads.map(|threads| threads as usize),
        pin_cores,
    };
    let harness = Harness::new(&config).context("failed to set up the harness")?;
    let registry = KernelRegistry::with_blur5_variants();

    run_benchmark(
        &FileImageStore,
        &registry,
        &harness,
        &compare_with.to_string(),
        &input,
        &output,
        io::stdout().lock(),
    )
    .with_context(|| format!("blur5 benchmark on {} failed", input.display()))?;
    Ok(())
}
