use anyhow::Context;
use clap::Parser;
use make_transcripts::observer::TracingObserver;
use make_transcripts::pipeline::make_transcripts;
use peak_alloc::PeakAlloc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
use cli::Cli;

#[global_allocator]
static PEAK_ALLOC: PeakAlloc = PeakAlloc;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // RUST_LOG, when set, takes precedence over -q/-v
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(args.log_level().into())
                .from_env_lossy(),
        )
        .init();

    let start = Instant::now();
    let options = args.assembly_options();
    let summary = make_transcripts(
        &args.input_fasta,
        &args.input_gff3,
        args.output.as_deref(),
        &options,
        &mut TracingObserver,
    )
    .with_context(|| {
        format!(
            "Could not build transcripts from {} and {}",
            args.input_fasta.display(),
            args.input_gff3.display()
        )
    })?;

    info!(
        "Wrote {} transcripts to {} in {:?} (peak memory {:.2} MB)",
        summary.n_written,
        summary.output.display(),
        start.elapsed(),
        PEAK_ALLOC.peak_usage_as_mb()
    );
    Ok(())
}
