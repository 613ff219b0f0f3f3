use clap::Parser;
use make_transcripts::options::{
    AssemblyOptions, OnError, DEFAULT_LINE_WIDTH, DEFAULT_TRANSCRIPT_SUFFIX,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// genome assembly in FASTA format (optionally gzipped)
    #[arg(short = 'f', long = "input-fasta", value_name = "FILE")]
    pub input_fasta: PathBuf,

    /// structural annotation in GFF3 format (optionally gzipped)
    #[arg(short = 'g', long = "input-gff3", value_name = "FILE")]
    pub input_gff3: PathBuf,

    /// output FASTA (default: the GFF3 path with its extension replaced by `_transcript.fna`)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// number of bases per sequence line
    #[arg(short = 'w', long, value_name = "N", default_value_t = NonZeroUsize::new(DEFAULT_LINE_WIDTH).unwrap_or(NonZeroUsize::MIN))]
    pub line_width: NonZeroUsize,

    /// suffix ignored when ordering gene identifiers
    #[arg(long, value_name = "SUFFIX", default_value = DEFAULT_TRANSCRIPT_SUFFIX)]
    pub transcript_suffix: String,

    /// leave out genes whose CDS annotation is inconsistent with the assembly instead of failing
    #[arg(long)]
    pub skip_invalid: bool,

    /// only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// report per-gene details
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions::default()
            .with_line_width(self.line_width)
            .with_transcript_suffix(&self.transcript_suffix)
            .with_on_error(if self.skip_invalid {
                OnError::Skip
            } else {
                OnError::Abort
            })
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::WARN
        } else if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }
}
