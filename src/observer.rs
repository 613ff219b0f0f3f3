//! Hooks through which the assembler reports progress.
//!
//! The assembler never logs on its own; whoever drives it passes an
//! [`AssemblyObserver`]. The binary uses [`TracingObserver`], tests record events.

use crate::assembler::{AssemblyReport, Transcript};
use crate::error::Error;
use tracing::{debug, info, warn};

/// Receives events while transcripts are assembled. Every method defaults to a no-op.
pub trait AssemblyObserver {
    /// A transcript was assembled.
    fn on_transcript(&mut self, _transcript: &Transcript) {}

    /// A gene failed validation and was left out under [`OnError::Skip`](crate::options::OnError::Skip).
    fn on_gene_skipped(&mut self, _gene_id: &str, _error: &Error) {}

    /// All genes have been processed.
    fn on_finish(&mut self, _report: &AssemblyReport) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl AssemblyObserver for NullObserver {}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl AssemblyObserver for TracingObserver {
    fn on_transcript(&mut self, transcript: &Transcript) {
        debug!(
            "assembled {} from {} CDS segment(s) on strand {} with phase {}: {} bp",
            transcript.gene_id,
            transcript.n_segments,
            transcript.strand,
            transcript.phase,
            transcript.sequence.len()
        );
        if transcript.sequence.is_empty() {
            warn!(
                "The transcript of {} is empty after phase trimming.",
                transcript.gene_id
            );
        }
    }

    fn on_gene_skipped(&mut self, gene_id: &str, error: &Error) {
        warn!("Skipped gene {}: {}", gene_id, error);
    }

    fn on_finish(&mut self, report: &AssemblyReport) {
        info!(
            "Assembled {} of {} transcripts.",
            report.n_assembled, report.n_genes
        );
        if !report.skipped.is_empty() {
            warn!(
                "{} genes were skipped because their CDS annotation is inconsistent with the assembly.",
                report.skipped.len()
            );
        }
    }
}
