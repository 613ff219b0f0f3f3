//! Nucleotide helpers.

/// Complement of every byte value. IUPAC nucleotide codes of either case map to
/// their complement in the same case; all other bytes map to themselves.
const COMPLEMENT: [u8; 256] = build_complement_table();

const fn build_complement_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }

    const PAIRS: [(u8, u8); 12] = [
        (b'A', b'T'),
        (b'T', b'A'),
        (b'C', b'G'),
        (b'G', b'C'),
        (b'R', b'Y'),
        (b'Y', b'R'),
        (b'K', b'M'),
        (b'M', b'K'),
        (b'B', b'V'),
        (b'V', b'B'),
        (b'D', b'H'),
        (b'H', b'D'),
    ];

    let mut j = 0;
    while j < PAIRS.len() {
        let (base, comp) = PAIRS[j];
        table[base as usize] = comp;
        table[base.to_ascii_lowercase() as usize] = comp.to_ascii_lowercase();
        j += 1;
    }
    // S, W and N are their own complement and already map to themselves.
    table
}

/// Complement of a single nucleotide.
#[inline]
pub fn complement(base: u8) -> u8 {
    COMPLEMENT[base as usize]
}

/// Reverse complement of a nucleotide sequence, case preserved.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// Reverse complements a sequence in place.
pub fn reverse_complement_in_place(seq: &mut [u8]) {
    seq.reverse();
    for b in seq.iter_mut() {
        *b = complement(*b);
    }
}
