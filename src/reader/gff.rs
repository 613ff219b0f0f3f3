use crate::error::{Error, Result};
use crate::options::{Phase, Strand};
use crate::utils::open_text_reader;
use noodles::core::Position;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

/// The only feature type the index keeps.
pub const CDS_FEATURE_TYPE: &str = "CDS";

/// The attribute that links a CDS row to the gene it belongs to.
pub const PARENT_ATTRIBUTE: &str = "Parent";

/// Directive that ends the annotation section of a GFF3 file.
const FASTA_DIRECTIVE: &str = "##FASTA";

/// Number of tab-separated columns of a GFF3 row.
const N_COLUMNS: usize = 9;

/// One CDS row of a GFF3 file.
///
/// # Fields
///
/// * `scaffold`: the sequence identifier in column 1.
/// * `start`, `end`: 1-based, inclusive coordinates (columns 4 and 5); `start <= end`.
/// * `strand`: column 7.
/// * `phase`: column 8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdsSegment {
    pub scaffold: String,
    pub start: Position,
    pub end: Position,
    pub strand: Strand,
    pub phase: Phase,
}

impl CdsSegment {
    /// Number of bases covered by the segment.
    pub fn length(&self) -> usize {
        self.end.get() - self.start.get() + 1
    }
}

/// Splits a GFF3 attribute column into `(key, value)` pairs.
///
/// Pairs are separated by `;` and keys from values by the first `=`. Whitespace
/// around a pair is ignored and empty pairs, such as the one left by a trailing
/// `;`, are skipped. A `.` column holds no attributes. A non-empty pair without
/// `=` is reported as a [`Error::MalformedRow`] on line `line`.
///
/// ```rust
/// use make_transcripts::reader::parse_attributes;
///
/// let attrs = parse_attributes("ID=cds1;Parent=g1.t1;", 1)?;
/// assert_eq!(attrs, [("ID", "cds1"), ("Parent", "g1.t1")]);
/// # Ok::<(), make_transcripts::Error>(())
/// ```
pub fn parse_attributes(column: &str, line: usize) -> Result<Vec<(&str, &str)>> {
    let column = column.trim();
    if column == "." {
        return Ok(Vec::new());
    }

    let mut attrs = Vec::new();
    for pair in column.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => attrs.push((key.trim(), value.trim())),
            None => {
                return Err(Error::malformed_row(
                    line,
                    format!("attribute `{}` is not a key=value pair", pair),
                ))
            }
        }
    }
    Ok(attrs)
}

/// CDS segments of a GFF3 file, grouped by the value of their `Parent` attribute.
///
/// Segments keep the order in which they appear in the file; ordering by
/// coordinate is left to the [`TranscriptAssembler`](crate::assembler::TranscriptAssembler).
/// Scaffold and strand agreement within a gene is not checked here either.
#[derive(Debug, Default, Clone)]
pub struct FeatureIndex {
    genes: HashMap<String, Vec<CdsSegment>>,
    order: Vec<String>,
}

impl FeatureIndex {
    /// Loads the CDS rows of a plain or gzip-compressed GFF3 file.
    pub fn from_path<T: AsRef<Path>>(file_path: T) -> Result<FeatureIndex> {
        let path = file_path.as_ref();
        let rdr = open_text_reader(path)?;
        let index = FeatureIndex::_from_reader(rdr, path)?;
        info!(
            "Indexed {} CDS segments of {} genes from {}",
            index.n_segments(),
            index.len(),
            path.display()
        );
        Ok(index)
    }

    /// Loads the CDS rows of GFF3 data from any buffered reader.
    pub fn from_reader<R: BufRead>(rdr: R) -> Result<FeatureIndex> {
        FeatureIndex::_from_reader(rdr, Path::new("<reader>"))
    }

    fn _from_reader<R: BufRead>(rdr: R, origin: &Path) -> Result<FeatureIndex> {
        let mut index = FeatureIndex::default();
        let mut n_comments = 0usize;
        let mut n_records = 0usize;

        for (idx, l) in rdr.lines().enumerate() {
            let line_num = idx + 1;
            let l = l.map_err(|e| Error::io(origin, e))?;
            let line = l.trim_end();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                if line.starts_with(FASTA_DIRECTIVE) {
                    debug!("Reached the ##FASTA section at line {}", line_num);
                    break;
                }
                n_comments += 1;
                continue;
            }

            n_records += 1;
            if let Some((gene_id, segment)) = parse_cds_row(line, line_num)? {
                index.push(gene_id, segment);
            }
        }

        debug!(
            "Finished parsing the input file. Found {} comments and {} records.",
            n_comments, n_records
        );
        Ok(index)
    }

    fn push(&mut self, gene_id: String, segment: CdsSegment) {
        if let Some(segments) = self.genes.get_mut(&gene_id) {
            segments.push(segment);
        } else {
            self.order.push(gene_id.clone());
            self.genes.insert(gene_id, vec![segment]);
        }
    }

    /// The CDS segments of a gene, in file order.
    pub fn get(&self, gene_id: &str) -> Option<&[CdsSegment]> {
        self.genes.get(gene_id).map(|v| v.as_slice())
    }

    /// Gene identifiers in the order they first appeared in the file.
    pub fn gene_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// `(gene_id, segments)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CdsSegment])> {
        self.order
            .iter()
            .filter_map(|id| self.genes.get(id).map(|s| (id.as_str(), s.as_slice())))
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Total number of CDS segments over all genes.
    pub fn n_segments(&self) -> usize {
        self.genes.values().map(|v| v.len()).sum()
    }
}

/// Parses one GFF3 record line. Returns `None` for rows that are not CDS.
fn parse_cds_row(line: &str, line_num: usize) -> Result<Option<(String, CdsSegment)>> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < N_COLUMNS {
        return Err(Error::malformed_row(
            line_num,
            format!(
                "expected {} tab-separated columns, found {}",
                N_COLUMNS,
                fields.len()
            ),
        ));
    }
    if fields[2] != CDS_FEATURE_TYPE {
        return Ok(None);
    }

    let start = parse_position(fields[3], "start", line_num)?;
    let end = parse_position(fields[4], "end", line_num)?;
    if start > end {
        return Err(Error::malformed_row(
            line_num,
            format!("start {} is greater than end {}", start.get(), end.get()),
        ));
    }
    let strand = Strand::from_symbol(fields[6]).ok_or_else(|| {
        Error::malformed_row(line_num, format!("invalid CDS strand `{}`", fields[6]))
    })?;
    let phase = Phase::from_symbol(fields[7]).ok_or_else(|| {
        Error::malformed_row(line_num, format!("invalid CDS phase `{}`", fields[7]))
    })?;

    let gene_id = parse_attributes(fields[8], line_num)?
        .into_iter()
        .find(|(key, value)| *key == PARENT_ATTRIBUTE && !value.is_empty())
        .map(|(_, value)| value.to_string())
        .ok_or(Error::MissingAttribute { line: line_num })?;

    Ok(Some((
        gene_id,
        CdsSegment {
            scaffold: fields[0].to_string(),
            start,
            end,
            strand,
            phase,
        },
    )))
}

fn parse_position(field: &str, name: &str, line_num: usize) -> Result<Position> {
    let value: usize = field.parse().map_err(|_| {
        Error::malformed_row(line_num, format!("{} `{}` is not an integer", name, field))
    })?;
    Position::new(value)
        .ok_or_else(|| Error::malformed_row(line_num, format!("{} must be at least 1", name)))
}
