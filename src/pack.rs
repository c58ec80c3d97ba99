// Streams the gap sequence of an input bitvector and greedily packs it into
// S18 words, recording an L1 boundary every b words as it goes.
//
// The gap sequence is never materialized: G[0] = pos(first one) + 1,
// G[i] = pos(i) - pos(i-1), each gap computed on the fly from
// BitVector::iter_ones and fed straight into a PendingWord.

use crate::bitvector::BitVector;
use crate::error::Result;
use crate::intvector::IntVector32;
use crate::word::{validate_gap, PendingWord};

// Cumulative (bit count, one count) recorded after every b-word block of
// sealed words.
pub(crate) struct PackResult {
    pub(crate) words: IntVector32,
    pub(crate) l1_bits: Vec<u64>,
    pub(crate) l1_ones: Vec<u64>,
    pub(crate) total_bits: u64,
    pub(crate) total_ones: u64,
}

pub(crate) fn pack(bits: &BitVector, b: usize) -> Result<PackResult> {
    assert!(b > 0, "pack: block size must be nonzero");

    let mut words = IntVector32::new();
    let mut l1_bits = Vec::new();
    let mut l1_ones = Vec::new();
    let mut cur = PendingWord::new();
    let mut prev_pos: Option<u64> = None;
    let mut ones_seen: u64 = 0;
    let mut words_in_block = 0usize;

    for pos in bits.iter_ones() {
        let pos = pos as u64;
        let gap = match prev_pos {
            None => pos + 1,
            Some(p) => pos - p,
        };
        let gap = validate_gap(gap)?;

        if !cur.try_append(gap) {
            let sealed = std::mem::replace(&mut cur, PendingWord::new()).pack();
            words.push(sealed);
            words_in_block += 1;
            if words_in_block == b {
                l1_bits.push(prev_pos.expect("a sealed word implies a prior one-bit") + 1);
                l1_ones.push(ones_seen);
                words_in_block = 0;
            }
            let ok = cur.try_append(gap);
            debug_assert!(ok, "a single validated gap must always fit a fresh word");
        }

        ones_seen += 1;
        prev_pos = Some(pos);
    }

    if cur.has_content() {
        let sealed = cur.pack();
        words.push(sealed);
    }

    Ok(PackResult {
        words,
        l1_bits,
        l1_ones,
        total_bits: bits.len() as u64,
        total_ones: ones_seen,
    })
}
