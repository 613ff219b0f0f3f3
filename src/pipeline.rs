//! The end-to-end run: load both inputs, assemble, write the transcript FASTA.

use crate::assembler::{AssemblyReport, Transcript, TranscriptAssembler};
use crate::error::{Error, Result};
use crate::observer::AssemblyObserver;
use crate::options::AssemblyOptions;
use crate::reader::{FeatureIndex, SequenceStore};
use crate::utils::{default_output_path, staging_path};
use crate::writer::FastaWriter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the transcripts went and what happened to each gene.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub n_written: usize,
    pub report: AssemblyReport,
}

/// Builds the transcript FASTA for `gff3_path` against the genome in `fasta_path`.
///
/// The output goes to `output`, or to [`default_output_path`] of the GFF3 file when
/// `None`. Every transcript is assembled before anything is written, and the
/// records are staged in a `.tmp` file that is renamed into place only once it has
/// been written completely. If any step fails the output path is left untouched.
pub fn make_transcripts<P: AsRef<Path>, Q: AsRef<Path>>(
    fasta_path: P,
    gff3_path: Q,
    output: Option<&Path>,
    options: &AssemblyOptions,
    observer: &mut dyn AssemblyObserver,
) -> Result<RunSummary> {
    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(gff3_path.as_ref()));

    let features = FeatureIndex::from_path(gff3_path.as_ref())?;
    let sequences = SequenceStore::from_path(fasta_path.as_ref())?;

    let assembly = TranscriptAssembler::new(&sequences, &features, options).assemble_all(observer)?;

    let tmp_path = staging_path(&out_path);
    let n_written = match write_records(&tmp_path, &assembly.transcripts, options) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
    };
    if let Err(e) = fs::rename(&tmp_path, &out_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::io(&out_path, e));
    }
    info!("Wrote {} transcripts to {}", n_written, out_path.display());

    Ok(RunSummary {
        output: out_path,
        n_written,
        report: assembly.report,
    })
}

fn write_records(
    path: &Path,
    transcripts: &[Transcript],
    options: &AssemblyOptions,
) -> Result<usize> {
    debug!("Staging output in {}", path.display());
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut buf = BufWriter::with_capacity(4194304, file);
    let n_records = {
        let mut writer = FastaWriter::new(&mut buf, options.line_width);
        for transcript in transcripts {
            writer
                .write_transcript(transcript)
                .map_err(|e| Error::io(path, e))?;
        }
        writer.n_records()
    };
    buf.flush().map_err(|e| Error::io(path, e))?;
    let file = buf
        .into_inner()
        .map_err(|e| Error::io(path, e.into_error()))?;
    file.sync_all().map_err(|e| Error::io(path, e))?;
    Ok(n_records)
}
