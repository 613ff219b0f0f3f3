use crate::assembler::Transcript;
use noodles::fasta;
use noodles::fasta::record::{Definition, Sequence};
use std::io::Write;
use std::num::NonZeroUsize;

/// Writes `(identifier, sequence)` pairs as FASTA records, wrapping sequence
/// lines at a fixed width. Each call to [`write`](FastaWriter::write) appends
/// one record; an empty sequence produces a header line only.
pub struct FastaWriter<W: Write> {
    inner: fasta::Writer<W>,
    n_records: usize,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(out: W, line_width: NonZeroUsize) -> FastaWriter<W> {
        let inner = fasta::writer::Builder::default()
            .set_line_base_count(line_width.get())
            .build_with_writer(out);
        FastaWriter {
            inner,
            n_records: 0,
        }
    }

    /// Appends one record: a `>id` header followed by the wrapped sequence.
    pub fn write(&mut self, id: &str, sequence: &[u8]) -> std::io::Result<()> {
        let definition = Definition::new(id.to_string(), None);
        let sequence = Sequence::from_iter(sequence.iter().copied());
        self.inner
            .write_record(&fasta::Record::new(definition, sequence))?;
        self.n_records += 1;
        Ok(())
    }

    pub fn write_transcript(&mut self, transcript: &Transcript) -> std::io::Result<()> {
        self.write(&transcript.gene_id, &transcript.sequence)
    }

    /// Number of records written so far.
    pub fn n_records(&self) -> usize {
        self.n_records
    }
}
