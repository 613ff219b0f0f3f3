use crate::error::{Error, Result};
use crate::utils::open_text_reader;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

/// In-memory genome assembly: every FASTA record keyed by its identifier.
///
/// The identifier of a record is the first whitespace-delimited token of its
/// header line, without the leading `>`. Sequence lines are right-trimmed and
/// concatenated verbatim; letter case is preserved and blank lines are ignored.
///
/// # Examples
///
/// ```rust
/// use make_transcripts::reader::SequenceStore;
///
/// let fa = b">scaf1 assembled by hand\nACGT\nacgt\n\n>scaf2\nNNNN\n";
/// let store = SequenceStore::from_reader(&fa[..])?;
/// assert_eq!(store.get("scaf1"), Some(&b"ACGTacgt"[..]));
/// assert_eq!(store.ids().collect::<Vec<_>>(), ["scaf1", "scaf2"]);
/// # Ok::<(), make_transcripts::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct SequenceStore {
    sequences: HashMap<String, Vec<u8>>,
    order: Vec<String>,
}

impl SequenceStore {
    /// Loads a plain or gzip-compressed FASTA file.
    pub fn from_path<T: AsRef<Path>>(file_path: T) -> Result<SequenceStore> {
        let path = file_path.as_ref();
        let rdr = open_text_reader(path)?;
        let store = SequenceStore::_from_reader(rdr, path)?;
        info!(
            "Loaded {} sequences ({} bp) from {}",
            store.len(),
            store.total_length(),
            path.display()
        );
        Ok(store)
    }

    /// Loads FASTA records from any buffered reader.
    pub fn from_reader<R: BufRead>(rdr: R) -> Result<SequenceStore> {
        SequenceStore::_from_reader(rdr, Path::new("<reader>"))
    }

    fn _from_reader<R: BufRead>(rdr: R, origin: &Path) -> Result<SequenceStore> {
        let mut store = SequenceStore::default();
        let mut current: Option<(String, Vec<u8>)> = None;

        for (idx, l) in rdr.lines().enumerate() {
            let line_num = idx + 1;
            let l = l.map_err(|e| Error::io(origin, e))?;
            let line = l.trim_end();
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix('>') {
                let id = header
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| Error::MalformedFasta {
                        line: line_num,
                        reason: String::from("FASTA header has no identifier"),
                    })?;
                if let Some((prev_id, prev_seq)) = current.take() {
                    store.insert(prev_id, prev_seq);
                }
                current = Some((id.to_string(), Vec::new()));
            } else if let Some((_, seq)) = current.as_mut() {
                seq.extend_from_slice(line.as_bytes());
            } else {
                return Err(Error::SequenceBeforeHeader { line: line_num });
            }
        }

        // the last record
        if let Some((id, seq)) = current {
            store.insert(id, seq);
        }

        Ok(store)
    }

    fn insert(&mut self, id: String, seq: Vec<u8>) {
        match self.sequences.entry(id) {
            Entry::Occupied(mut e) => {
                warn!(
                    "Found duplicated sequence identifier {}; the later record replaces the earlier one.",
                    e.key()
                );
                e.insert(seq);
            }
            Entry::Vacant(e) => {
                self.order.push(e.key().clone());
                e.insert(seq);
            }
        }
    }

    /// The sequence of a record, if present.
    pub fn get(&self, id: &str) -> Option<&[u8]> {
        self.sequences.get(id).map(|s| s.as_slice())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sequences.contains_key(id)
    }

    /// Record identifiers in the order they first appeared in the input.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Sum of the lengths of all records.
    pub fn total_length(&self) -> usize {
        self.sequences.values().map(|s| s.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiline_records() {
        let fasta_data = b">sq0 test\nACGT\n>sq1\nNNNN\nNNNN\nNN\n";
        let store = SequenceStore::from_reader(&fasta_data[..]).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("sq0").unwrap(), b"ACGT");
        assert_eq!(store.get("sq1").unwrap(), b"NNNNNNNNNN");
        assert!(store.get("sq0 test").is_none());
        assert_eq!(store.total_length(), 14);
    }

    #[test]
    fn test_whitespace_and_case() {
        let fasta_data = b"\n>chr1\tdescription here\r\nacGT  \r\n\n  NNnn\n";
        let store = SequenceStore::from_reader(&fasta_data[..]).unwrap();
        // trailing whitespace is trimmed, leading whitespace is kept verbatim
        assert_eq!(store.get("chr1").unwrap(), b"acGT  NNnn");
    }

    #[test]
    fn test_empty_record() {
        let fasta_data = b">empty\n>full\nAC\n";
        let store = SequenceStore::from_reader(&fasta_data[..]).unwrap();
        assert_eq!(store.get("empty").unwrap(), b"");
        assert_eq!(store.get("full").unwrap(), b"AC");
    }

    #[test]
    fn test_sequence_before_header() {
        let fasta_data = b"\nACGT\n>chr1\nACGT\n";
        let err = SequenceStore::from_reader(&fasta_data[..]).unwrap_err();
        assert!(matches!(err, Error::SequenceBeforeHeader { line: 2 }));
    }

    #[test]
    fn test_header_without_identifier() {
        let fasta_data = b">chr1\nACGT\n>   \nACGT\n";
        let err = SequenceStore::from_reader(&fasta_data[..]).unwrap_err();
        assert!(matches!(err, Error::MalformedFasta { line: 3, .. }));
    }

    #[test]
    fn test_duplicated_identifier_replaces() {
        let fasta_data = b">chr1\nAAAA\n>chr2\nCC\n>chr1\nGGGG\n";
        let store = SequenceStore::from_reader(&fasta_data[..]).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("chr1").unwrap(), b"GGGG");
        assert_eq!(store.ids().collect::<Vec<_>>(), ["chr1", "chr2"]);
    }
}
