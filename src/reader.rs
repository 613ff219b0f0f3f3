pub mod fasta;
pub mod gff;
pub use fasta::SequenceStore;
pub use gff::{parse_attributes, CdsSegment, FeatureIndex};
