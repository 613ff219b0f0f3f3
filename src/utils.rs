use crate::error::{Error, Result};
use flate2::bufread::MultiGzDecoder;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Suffix appended to the GFF3 file stem to name the transcript FASTA.
pub const TRANSCRIPT_FILE_SUFFIX: &str = "_transcript.fna";

/// Checks whether the reader starts with the gzip magic number, without consuming it.
///
/// Notes: implementation taken from
/// <https://github.com/zaeleus/noodles/blob/ba1b34ce22e72c2df277b20ce4c5c7b75d75a199/noodles-util/src/variant/reader/builder.rs#L131>
pub fn is_gzipped<T: BufRead>(reader: &mut T) -> std::io::Result<bool> {
    const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

    let src = reader.fill_buf()?;
    Ok(src.get(..2) == Some(&GZIP_MAGIC_NUMBER))
}

/// Opens a plain or gzip-compressed text file as a buffered reader.
pub fn open_text_reader<T: AsRef<Path>>(p: T) -> Result<Box<dyn BufRead>> {
    let path = p.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut inner_rdr = BufReader::new(file);
    if is_gzipped(&mut inner_rdr).map_err(|e| Error::io(path, e))? {
        trace!(
            "auto-detected gzipped file {} - reading via decompression",
            path.display()
        );
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(inner_rdr))))
    } else {
        Ok(Box::new(inner_rdr))
    }
}

/// Derives the transcript FASTA path from the GFF3 path by replacing its
/// last extension with `_transcript.fna`.
///
/// ```rust
/// use make_transcripts::utils::default_output_path;
/// use std::path::PathBuf;
///
/// assert_eq!(
///     default_output_path("run/braker.gff3"),
///     PathBuf::from("run/braker_transcript.fna")
/// );
/// ```
pub fn default_output_path<T: AsRef<Path>>(gff3_path: T) -> PathBuf {
    let stem = gff3_path.as_ref().with_extension("");
    let mut name: OsString = stem.into_os_string();
    name.push(TRANSCRIPT_FILE_SUFFIX);
    PathBuf::from(name)
}

/// Path of the scratch file the output is staged in before it is renamed into place.
pub fn staging_path<T: AsRef<Path>>(out_path: T) -> PathBuf {
    let mut name: OsString = out_path.as_ref().as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
