//! make-transcripts rebuilds the coding sequence of every gene in a GFF3 annotation
//! from the genome assembly it annotates. The CDS rows of each gene are ordered,
//! their bases concatenated, minus-strand genes reverse complemented, and the
//! leading codon fragment given by the phase removed. The result is written as a
//! FASTA file with one record per gene.
//!
//! The pieces can be used on their own: [`SequenceStore`] and [`FeatureIndex`]
//! load the inputs, [`TranscriptAssembler`] builds the transcripts and
//! [`FastaWriter`] writes them. [`pipeline::make_transcripts`] runs all of it.

pub mod assembler;
pub mod error;
pub mod observer;
pub mod options;
pub mod pipeline;
pub mod reader;
pub mod sequence;
pub mod utils;
pub mod writer;

pub use assembler::{Assembly, AssemblyReport, Transcript, TranscriptAssembler};
pub use error::{Error, Result};
pub use options::{AssemblyOptions, OnError};
pub use reader::{FeatureIndex, SequenceStore};
pub use writer::FastaWriter;
