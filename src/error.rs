//! Error types for transcript assembly.

use std::path::PathBuf;

use thiserror::Error;

use crate::options::Strand;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading the inputs or assembling transcripts.
#[derive(Debug, Error)]
pub enum Error {
    /// A CDS row whose attribute column has no `Parent` key.
    #[error("line {line}: CDS row has no `Parent` attribute")]
    MissingAttribute { line: usize },

    /// A GFF3 row with too few columns or an unparseable field.
    #[error("line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A CDS refers to a scaffold that is absent from the FASTA file.
    #[error("gene {gene_id}: scaffold `{scaffold}` is not present in the FASTA file")]
    UndefinedSequenceReference { gene_id: String, scaffold: String },

    /// A CDS extends past the end of its scaffold.
    #[error("gene {gene_id}: CDS {start}-{end} exceeds the length of `{scaffold}` ({length} bp)")]
    SegmentOutOfBounds {
        gene_id: String,
        scaffold: String,
        start: usize,
        end: usize,
        length: usize,
    },

    /// The CDS segments of one gene lie on more than one scaffold.
    #[error("gene {gene_id}: CDS segments span several scaffolds ({first}, {other})")]
    InconsistentScaffold {
        gene_id: String,
        first: String,
        other: String,
    },

    /// The CDS segments of one gene disagree on strand.
    #[error("gene {gene_id}: CDS segments disagree on strand ({first} vs {other})")]
    InconsistentStrand {
        gene_id: String,
        first: Strand,
        other: Strand,
    },

    /// Sequence data appeared before the first FASTA header.
    #[error("line {line}: sequence data found before any FASTA header")]
    SequenceBeforeHeader { line: usize },

    /// A FASTA header that could not be interpreted.
    #[error("line {line}: {reason}")]
    MalformedFasta { line: usize, reason: String },

    /// An I/O error on an input or output path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn malformed_row<S: Into<String>>(line: usize, reason: S) -> Self {
        Error::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error concerns a single gene, as opposed to the inputs as a whole.
    ///
    /// Only gene-level errors may be skipped under [`OnError::Skip`](crate::options::OnError::Skip).
    pub fn is_gene_level(&self) -> bool {
        matches!(
            self,
            Error::UndefinedSequenceReference { .. }
                | Error::SegmentOutOfBounds { .. }
                | Error::InconsistentScaffold { .. }
                | Error::InconsistentStrand { .. }
        )
    }
}
