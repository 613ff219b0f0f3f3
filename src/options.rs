use std::fmt;
use std::num::NonZeroUsize;

/// Line width of the FASTA records written by [`FastaWriter`](crate::writer::FastaWriter).
pub const DEFAULT_LINE_WIDTH: usize = 60;

/// Suffix that marks the first transcript of a gene, e.g. `g12.t1`.
pub const DEFAULT_TRANSCRIPT_SUFFIX: &str = ".t1";

/// Strand of a CDS segment, as given in column 7 of a GFF3 row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Parses the GFF3 strand column. Only `+` and `-` are meaningful for a CDS,
    /// every other value returns `None`.
    pub fn from_symbol(s: &str) -> Option<Strand> {
        match s {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self, Strand::Reverse)
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// Reading-frame phase of a CDS segment (GFF3 column 8).
///
/// The phase is the number of leading bases of the segment that complete a codon
/// begun in the previous segment, so it is also the number of bases to drop from
/// the 5' end of an assembled transcript.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Zero,
    One,
    Two,
}

impl Phase {
    /// Parses the GFF3 phase column. `.` and anything outside `0..=2` return `None`.
    pub fn from_symbol(s: &str) -> Option<Phase> {
        match s.parse::<u8>().ok()? {
            0 => Some(Phase::Zero),
            1 => Some(Phase::One),
            2 => Some(Phase::Two),
            _ => None,
        }
    }

    /// Number of leading bases this phase trims.
    pub fn offset(&self) -> usize {
        match self {
            Phase::Zero => 0,
            Phase::One => 1,
            Phase::Two => 2,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.offset())
    }
}

/// What to do when a single gene cannot be assembled.
///
/// * `Abort` - stop at the first failing gene; nothing is written.
/// * `Skip` - leave the gene out of the output and list it in the
///   [`AssemblyReport`](crate::assembler::AssemblyReport).
///
/// Parse errors in the input files always abort, regardless of this setting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OnError {
    #[default]
    Abort,
    Skip,
}

/// Options controlling how transcripts are assembled and written.
///
/// # Fields
///
/// * `line_width`: the number of bases per sequence line in the output FASTA.
/// * `transcript_suffix`: a suffix removed from gene identifiers before they are
///   compared for output ordering. It only affects the order of the records.
/// * `on_error`: the [`OnError`] policy for genes that fail validation.
///
/// # Examples
///
/// ```rust
/// use make_transcripts::options::{AssemblyOptions, OnError};
///
/// let opts = AssemblyOptions::default().with_on_error(OnError::Skip);
/// assert_eq!(opts.line_width.get(), 60);
/// assert_eq!(opts.transcript_suffix, ".t1");
/// ```
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    pub line_width: NonZeroUsize,
    pub transcript_suffix: String,
    pub on_error: OnError,
}

impl Default for AssemblyOptions {
    fn default() -> AssemblyOptions {
        AssemblyOptions {
            line_width: NonZeroUsize::new(DEFAULT_LINE_WIDTH).unwrap_or(NonZeroUsize::MIN),
            transcript_suffix: DEFAULT_TRANSCRIPT_SUFFIX.to_string(),
            on_error: OnError::Abort,
        }
    }
}

impl AssemblyOptions {
    pub fn with_line_width(mut self, line_width: NonZeroUsize) -> AssemblyOptions {
        self.line_width = line_width;
        self
    }

    pub fn with_transcript_suffix<T: ToString>(mut self, suffix: T) -> AssemblyOptions {
        self.transcript_suffix = suffix.to_string();
        self
    }

    pub fn with_on_error(mut self, on_error: OnError) -> AssemblyOptions {
        self.on_error = on_error;
        self
    }

    /// The key a gene identifier is sorted by: the identifier with a trailing
    /// `transcript_suffix` removed.
    pub fn sort_key<'a>(&self, gene_id: &'a str) -> &'a str {
        if self.transcript_suffix.is_empty() {
            return gene_id;
        }
        gene_id
            .strip_suffix(self.transcript_suffix.as_str())
            .unwrap_or(gene_id)
    }
}
