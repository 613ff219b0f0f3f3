//! Assembly of coding transcripts from CDS segments.

use crate::error::{Error, Result};
use crate::observer::AssemblyObserver;
use crate::options::{AssemblyOptions, OnError, Phase, Strand};
use crate::reader::{CdsSegment, FeatureIndex, SequenceStore};
use crate::sequence::reverse_complement_in_place;

/// The coding sequence of one gene, 5' to 3', with the leading codon fragment removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub gene_id: String,
    pub sequence: Vec<u8>,
    /// Strand shared by all CDS segments of the gene.
    pub strand: Strand,
    /// Phase of the 5'-most CDS segment; this many bases were trimmed.
    pub phase: Phase,
    pub n_segments: usize,
}

/// A gene that was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGene {
    pub gene_id: String,
    pub reason: String,
}

/// Summary of an [`TranscriptAssembler::assemble_all`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub n_genes: usize,
    pub n_assembled: usize,
    pub skipped: Vec<SkippedGene>,
}

/// Transcripts in output order, together with the run report.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub transcripts: Vec<Transcript>,
    pub report: AssemblyReport,
}

/// Builds transcripts from a [`SequenceStore`] and a [`FeatureIndex`].
///
/// Both stores are only read, and each gene is assembled independently of the others.
///
/// # Examples
///
/// ```rust
/// use make_transcripts::assembler::TranscriptAssembler;
/// use make_transcripts::observer::NullObserver;
/// use make_transcripts::options::AssemblyOptions;
/// use make_transcripts::reader::{FeatureIndex, SequenceStore};
///
/// let store = SequenceStore::from_reader(&b">scaf1\nACGTACGTAC\n"[..])?;
/// let index = FeatureIndex::from_reader(
///     &b"scaf1\t.\tCDS\t3\t8\t.\t+\t0\tID=cds1;Parent=gene1\n"[..],
/// )?;
/// let options = AssemblyOptions::default();
/// let assembler = TranscriptAssembler::new(&store, &index, &options);
///
/// let assembly = assembler.assemble_all(&mut NullObserver)?;
/// assert_eq!(assembly.transcripts[0].gene_id, "gene1");
/// assert_eq!(assembly.transcripts[0].sequence, b"GTACGT");
/// # Ok::<(), make_transcripts::Error>(())
/// ```
pub struct TranscriptAssembler<'a> {
    sequences: &'a SequenceStore,
    features: &'a FeatureIndex,
    options: &'a AssemblyOptions,
}

impl<'a> TranscriptAssembler<'a> {
    pub fn new(
        sequences: &'a SequenceStore,
        features: &'a FeatureIndex,
        options: &'a AssemblyOptions,
    ) -> TranscriptAssembler<'a> {
        TranscriptAssembler {
            sequences,
            features,
            options,
        }
    }

    /// Gene identifiers in output order: lexicographic on the identifier with the
    /// first-transcript suffix removed, ties broken by the full identifier.
    pub fn gene_order(&self) -> Vec<&'a str> {
        let mut ids: Vec<&'a str> = self.features.gene_ids().collect();
        ids.sort_by(|a, b| {
            self.options
                .sort_key(a)
                .cmp(self.options.sort_key(b))
                .then_with(|| a.cmp(b))
        });
        ids
    }

    /// Assembles every gene of the index in [`gene_order`](Self::gene_order).
    ///
    /// Under [`OnError::Abort`] the first failing gene ends the run with its error.
    /// Under [`OnError::Skip`] genes with a gene-level error are reported to the
    /// observer and listed in the report instead.
    pub fn assemble_all(&self, observer: &mut dyn AssemblyObserver) -> Result<Assembly> {
        let order = self.gene_order();
        let mut assembly = Assembly {
            transcripts: Vec::with_capacity(order.len()),
            report: AssemblyReport {
                n_genes: order.len(),
                ..Default::default()
            },
        };

        for gene_id in order {
            let segments = self.features.get(gene_id).unwrap_or_default();
            match self.assemble_gene(gene_id, segments) {
                Ok(transcript) => {
                    observer.on_transcript(&transcript);
                    assembly.transcripts.push(transcript);
                }
                Err(e) if self.options.on_error == OnError::Skip && e.is_gene_level() => {
                    observer.on_gene_skipped(gene_id, &e);
                    assembly.report.skipped.push(SkippedGene {
                        gene_id: gene_id.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        assembly.report.n_assembled = assembly.transcripts.len();
        observer.on_finish(&assembly.report);
        Ok(assembly)
    }

    /// Assembles the transcript of a single gene.
    ///
    /// The segments are sorted by start, their bases concatenated, the result
    /// reverse complemented for `-` strand genes, and finally the 5' codon
    /// fragment given by the phase of the 5'-most segment is dropped.
    pub fn assemble_gene(&self, gene_id: &str, segments: &[CdsSegment]) -> Result<Transcript> {
        let (scaffold, strand) = gene_location(gene_id, segments)?;

        let mut sorted: Vec<&CdsSegment> = segments.iter().collect();
        // stable: equal starts keep their file order
        sorted.sort_by_key(|seg| seg.start);

        let mut sequence = Vec::with_capacity(sorted.iter().map(|seg| seg.length()).sum());
        if let Some(scaffold) = scaffold {
            let scaffold_seq =
                self.sequences
                    .get(scaffold)
                    .ok_or_else(|| Error::UndefinedSequenceReference {
                        gene_id: gene_id.to_string(),
                        scaffold: scaffold.to_string(),
                    })?;

            for seg in &sorted {
                // 1-based inclusive to 0-based half-open
                let bases = scaffold_seq
                    .get(seg.start.get() - 1..seg.end.get())
                    .ok_or_else(|| Error::SegmentOutOfBounds {
                        gene_id: gene_id.to_string(),
                        scaffold: scaffold.to_string(),
                        start: seg.start.get(),
                        end: seg.end.get(),
                        length: scaffold_seq.len(),
                    })?;
                sequence.extend_from_slice(bases);
            }
        }

        if strand.is_reverse() {
            reverse_complement_in_place(&mut sequence);
        }

        // the 5'-most segment is the lowest start on `+` and the highest start on `-`
        let five_prime = if strand.is_reverse() {
            sorted.last()
        } else {
            sorted.first()
        };
        let phase = five_prime.map(|seg| seg.phase).unwrap_or_default();
        let trim = phase.offset().min(sequence.len());
        sequence.drain(..trim);

        Ok(Transcript {
            gene_id: gene_id.to_string(),
            sequence,
            strand,
            phase,
            n_segments: segments.len(),
        })
    }
}

/// The scaffold and strand shared by all segments of a gene.
///
/// A gene without segments has no scaffold and is taken to be on the forward strand.
fn gene_location<'s>(
    gene_id: &str,
    segments: &'s [CdsSegment],
) -> Result<(Option<&'s str>, Strand)> {
    let Some(first) = segments.first() else {
        return Ok((None, Strand::Forward));
    };

    for seg in &segments[1..] {
        if seg.scaffold != first.scaffold {
            return Err(Error::InconsistentScaffold {
                gene_id: gene_id.to_string(),
                first: first.scaffold.clone(),
                other: seg.scaffold.clone(),
            });
        }
        if seg.strand != first.strand {
            return Err(Error::InconsistentStrand {
                gene_id: gene_id.to_string(),
                first: first.strand,
                other: seg.strand,
            });
        }
    }
    Ok((Some(first.scaffold.as_str()), first.strand))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;
    use crate::sequence::reverse_complement;

    #[derive(Default)]
    struct Recorder {
        assembled: Vec<String>,
        skipped: Vec<String>,
        finished: Option<AssemblyReport>,
    }

    impl AssemblyObserver for Recorder {
        fn on_transcript(&mut self, transcript: &Transcript) {
            self.assembled.push(transcript.gene_id.clone());
        }
        fn on_gene_skipped(&mut self, gene_id: &str, _error: &Error) {
            self.skipped.push(gene_id.to_string());
        }
        fn on_finish(&mut self, report: &AssemblyReport) {
            self.finished = Some(report.clone());
        }
    }

    // 40 bp scaffold with distinct 10 bp blocks
    const SCAFFOLD: &[u8] = b">scaf1\nAAAAACCCCCGGGGGTTTTTACGTACGTACGATCGATCGA\n>scaf2\nacgtnACGTN\n";

    fn assemble(gff: &str, options: &AssemblyOptions) -> Result<Assembly> {
        let store = SequenceStore::from_reader(SCAFFOLD)?;
        let index = FeatureIndex::from_reader(gff.as_bytes())?;
        TranscriptAssembler::new(&store, &index, options).assemble_all(&mut NullObserver)
    }

    fn single(gff: &str) -> Vec<u8> {
        let assembly = assemble(gff, &AssemblyOptions::default()).unwrap();
        assert_eq!(assembly.transcripts.len(), 1);
        assembly.transcripts[0].sequence.clone()
    }

    fn cds(start: usize, end: usize, strand: &str, phase: u8, parent: &str) -> String {
        format!(
            "scaf1\t.\tCDS\t{}\t{}\t.\t{}\t{}\tParent={}\n",
            start, end, strand, phase, parent
        )
    }

    #[test]
    fn test_end_to_end_examples() {
        let store = SequenceStore::from_reader(&b">scaf1\nACGTACGTAC\n"[..]).unwrap();
        let opts = AssemblyOptions::default();

        let index =
            FeatureIndex::from_reader(&b"scaf1\t.\tCDS\t3\t8\t.\t+\t0\tID=cds1;Parent=gene1\n"[..])
                .unwrap();
        let asm = TranscriptAssembler::new(&store, &index, &opts);
        let assembly = asm.assemble_all(&mut NullObserver).unwrap();
        assert_eq!(assembly.transcripts[0].gene_id, "gene1");
        assert_eq!(assembly.transcripts[0].sequence, b"GTACGT");

        let index =
            FeatureIndex::from_reader(&b"scaf1\t.\tCDS\t3\t8\t.\t+\t2\tID=cds1;Parent=gene1\n"[..])
                .unwrap();
        let asm = TranscriptAssembler::new(&store, &index, &opts);
        let assembly = asm.assemble_all(&mut NullObserver).unwrap();
        assert_eq!(assembly.transcripts[0].sequence, b"ACGT");
        assert_eq!(assembly.transcripts[0].phase, Phase::Two);

        let store = SequenceStore::from_reader(&b">scaf1\nAACCGG\n"[..]).unwrap();
        let index =
            FeatureIndex::from_reader(&b"scaf1\t.\tCDS\t1\t6\t.\t-\t0\tID=cds1;Parent=gene2\n"[..])
                .unwrap();
        let asm = TranscriptAssembler::new(&store, &index, &opts);
        let assembly = asm.assemble_all(&mut NullObserver).unwrap();
        let t = &assembly.transcripts[0];
        assert_eq!(t.gene_id, "gene2");
        assert_eq!(t.sequence, b"CCGGTT");
        assert_eq!(t.strand, Strand::Reverse);
    }

    #[test]
    fn test_single_exon_is_exact_substring() {
        assert_eq!(single(&cds(6, 15, "+", 0, "g1")), b"CCCCCGGGGG");
        assert_eq!(single(&cds(1, 40, "+", 0, "g1")), &SCAFFOLD[7..47]);
    }

    #[test]
    fn test_multi_exon_forward_is_order_invariant() {
        let rows = [cds(21, 24, "+", 0, "g1"), cds(1, 3, "+", 0, "g1"), cds(11, 15, "+", 0, "g1")];
        let expected = b"AAAGGGGGACGT".to_vec();

        let permutations = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for p in permutations {
            let gff: String = p.iter().map(|&i| rows[i].as_str()).collect();
            assert_eq!(single(&gff), expected, "permutation {:?}", p);
        }
    }

    #[test]
    fn test_reverse_strand_is_reverse_complement_of_concatenation() {
        let gff = cds(11, 15, "-", 0, "g1") + &cds(1, 3, "-", 0, "g1");
        assert_eq!(single(&gff), reverse_complement(b"AAAGGGGG"));
        assert_eq!(single(&gff), b"CCCCCTTT");
    }

    #[test]
    fn test_phase_uses_five_prime_segment() {
        // forward: the lowest start carries the phase that counts
        let gff = cds(1, 3, "+", 1, "g1") + &cds(11, 15, "+", 2, "g1");
        assert_eq!(single(&gff), b"AAGGGGG");

        // reverse: the highest start is the 5' end after reversal
        let gff = cds(1, 3, "-", 1, "g1") + &cds(11, 15, "-", 2, "g1");
        assert_eq!(single(&gff), b"CCCTTT");

        let gff = cds(1, 3, "-", 0, "g1") + &cds(11, 15, "-", 0, "g1");
        assert_eq!(single(&gff), b"CCCCCTTT");
    }

    #[test]
    fn test_phase_longer_than_transcript() {
        let t = single(&cds(1, 1, "+", 2, "g1"));
        assert!(t.is_empty());
    }

    #[test]
    fn test_case_is_preserved() {
        let gff = "scaf2\t.\tCDS\t1\t5\t.\t-\t0\tParent=g1\n";
        assert_eq!(single(gff), b"nacgt");
    }

    #[test]
    fn test_gene_order() {
        let gff = cds(1, 3, "+", 0, "g10.t1")
            + &cds(1, 3, "+", 0, "g2.t1")
            + &cds(1, 3, "+", 0, "g1.t2")
            + &cds(1, 3, "+", 0, "g1.t1");
        let store = SequenceStore::from_reader(SCAFFOLD).unwrap();
        let index = FeatureIndex::from_reader(gff.as_bytes()).unwrap();
        let opts = AssemblyOptions::default();
        let asm = TranscriptAssembler::new(&store, &index, &opts);
        assert_eq!(asm.gene_order(), ["g1.t1", "g1.t2", "g10.t1", "g2.t1"]);
    }

    #[test]
    fn test_gene_order_ties_use_full_id() {
        let gff = cds(1, 3, "+", 0, "g1.t1") + &cds(11, 15, "+", 0, "g1");
        let store = SequenceStore::from_reader(SCAFFOLD).unwrap();
        let index = FeatureIndex::from_reader(gff.as_bytes()).unwrap();
        let opts = AssemblyOptions::default();
        let asm = TranscriptAssembler::new(&store, &index, &opts);
        assert_eq!(asm.gene_order(), ["g1", "g1.t1"]);
    }

    #[test]
    fn test_equal_starts_keep_file_order() {
        // 11..20 is GGGGGTTTTT, 11..15 is GGGGG
        let gff = cds(11, 20, "-", 1, "g1") + &cds(11, 15, "-", 2, "g1");
        assert_eq!(single(&gff), b"CCCAAAAACCCCC");

        let gff = cds(11, 15, "-", 2, "g1") + &cds(11, 20, "-", 1, "g1");
        assert_eq!(single(&gff), b"AAAACCCCCCCCCC");
    }

    #[test]
    fn test_inconsistent_genes_are_rejected() {
        let opts = AssemblyOptions::default();

        let gff = cds(1, 3, "+", 0, "g1") + "scaf2\t.\tCDS\t1\t3\t.\t+\t0\tParent=g1\n";
        let err = assemble(&gff, &opts).unwrap_err();
        assert!(matches!(err, Error::InconsistentScaffold { .. }));

        let gff = cds(1, 3, "+", 0, "g1") + &cds(11, 15, "-", 0, "g1");
        let err = assemble(&gff, &opts).unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentStrand {
                first: Strand::Forward,
                other: Strand::Reverse,
                ..
            }
        ));
    }

    #[test]
    fn test_strand_is_not_carried_between_genes() {
        // g1 sorts before g2; g2 must not inherit g1's reverse strand
        let gff = cds(1, 3, "-", 0, "g1") + &cds(1, 3, "+", 0, "g2");
        let assembly = assemble(&gff, &AssemblyOptions::default()).unwrap();
        assert_eq!(assembly.transcripts[0].sequence, b"TTT");
        assert_eq!(assembly.transcripts[1].sequence, b"AAA");
    }

    #[test]
    fn test_reference_errors() {
        let opts = AssemblyOptions::default();

        let gff = "chrX\t.\tCDS\t1\t3\t.\t+\t0\tParent=g1\n";
        let err = assemble(gff, &opts).unwrap_err();
        assert!(matches!(err, Error::UndefinedSequenceReference { ref scaffold, .. } if scaffold == "chrX"));

        let gff = cds(35, 41, "+", 0, "g1");
        let err = assemble(&gff, &opts).unwrap_err();
        assert!(matches!(err, Error::SegmentOutOfBounds { length: 40, .. }));
    }

    #[test]
    fn test_skip_invalid_genes() {
        let opts = AssemblyOptions::default().with_on_error(OnError::Skip);
        let gff = cds(1, 3, "+", 0, "g1")
            + &cds(1, 3, "+", 0, "g2")
            + &cds(11, 15, "-", 0, "g2")
            + "chrX\t.\tCDS\t1\t3\t.\t+\t0\tParent=g3\n"
            + &cds(11, 15, "+", 0, "g4");

        let store = SequenceStore::from_reader(SCAFFOLD).unwrap();
        let index = FeatureIndex::from_reader(gff.as_bytes()).unwrap();
        let mut recorder = Recorder::default();
        let assembly = TranscriptAssembler::new(&store, &index, &opts)
            .assemble_all(&mut recorder)
            .unwrap();

        let ids: Vec<&str> = assembly.transcripts.iter().map(|t| t.gene_id.as_str()).collect();
        assert_eq!(ids, ["g1", "g4"]);
        assert_eq!(recorder.assembled, ["g1", "g4"]);
        assert_eq!(recorder.skipped, ["g2", "g3"]);

        let report = recorder.finished.unwrap();
        assert_eq!(report, assembly.report);
        assert_eq!(report.n_genes, 4);
        assert_eq!(report.n_assembled, 2);
        assert_eq!(report.skipped[0].gene_id, "g2");
    }

    #[test]
    fn test_empty_segment_list() {
        let store = SequenceStore::default();
        let index = FeatureIndex::default();
        let opts = AssemblyOptions::default();
        let t = TranscriptAssembler::new(&store, &index, &opts)
            .assemble_gene("g1", &[])
            .unwrap();
        assert!(t.sequence.is_empty());
        assert_eq!(t.n_segments, 0);
    }
}
