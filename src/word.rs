// The S18 word codec. Packs a run of gaps into one 32-bit codeword and
// decodes a sealed codeword back into its case layout and fields.
//
// A word is either a PendingWord (an append-only sink gaps are greedily
// packed into) or a sealed u32 whose case tag (the high 4 or 5 bits)
// selects one of the layouts in WordShape. Decoding never branches past
// a single tag comparison: the shift/mask pair for each field is a
// compile-time constant table.
//
// 17 cases share only 8 distinct (width, field-count) layouts: the
// "plain" and "28-ones-prepended" variants of cases 1-7/8-14 have an
// identical field layout and differ only in whether an implicit run
// precedes the explicit fields, so FieldLayout only needs 8 variants
// plus the Case 16 pure-run layout.

use crate::error::{Error, Result, MAX_GAP, MAX_RUN};
use crate::unchecked::UncheckedArray;

// One of the 8 distinct (width, field-count) layouts used by the 17 S18
// cases. Case 16 (the pure run of ones) carries no fields and is handled
// separately as WordShape::Run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FieldLayout {
    W28,
    W14,
    W9,
    W7,
    W4,
    W3,
    W2,
    W5,
}

const fn build_shifts(width: u32, count: usize) -> [u32; 14] {
    let mut out = [0u32; 14];
    let mut i = 0;
    while i < count {
        out[i] = width * (count as u32 - 1 - i as u32);
        i += 1;
    }
    out
}

const fn build_masks(width: u32, shifts: [u32; 14], count: usize) -> [u32; 14] {
    let field_mask: u32 = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
    let mut out = [0u32; 14];
    let mut i = 0;
    while i < count {
        out[i] = field_mask << shifts[i];
        i += 1;
    }
    out
}

macro_rules! layout_tables {
    ($($name:ident => ($width:expr, $count:expr)),+ $(,)?) => {
        $(
            mod $name {
                use super::UncheckedArray;
                const SHIFT_RAW: [u32; 14] = super::build_shifts($width, $count);
                pub(super) const SHIFT: UncheckedArray<u32, 14> = UncheckedArray::from_array(SHIFT_RAW);
                pub(super) const MASK: UncheckedArray<u32, 14> =
                    UncheckedArray::from_array(super::build_masks($width, SHIFT_RAW, $count));
            }
        )+
    };
}

layout_tables! {
    w28 => (28, 1),
    w14 => (14, 2),
    w9  => (9, 3),
    w7  => (7, 4),
    w4  => (4, 7),
    w3  => (3, 9),
    w2  => (2, 14),
    w5  => (5, 5),
}

impl FieldLayout {
    pub(crate) const fn width(self) -> u32 {
        match self {
            FieldLayout::W28 => 28,
            FieldLayout::W14 => 14,
            FieldLayout::W9 => 9,
            FieldLayout::W7 => 7,
            FieldLayout::W4 => 4,
            FieldLayout::W3 => 3,
            FieldLayout::W2 => 2,
            FieldLayout::W5 => 5,
        }
    }

    pub(crate) const fn count(self) -> usize {
        match self {
            FieldLayout::W28 => 1,
            FieldLayout::W14 => 2,
            FieldLayout::W9 => 3,
            FieldLayout::W7 => 4,
            FieldLayout::W4 => 7,
            FieldLayout::W3 => 9,
            FieldLayout::W2 => 14,
            FieldLayout::W5 => 5,
        }
    }

    #[inline(always)]
    fn shift(self, i: usize) -> u32 {
        match self {
            FieldLayout::W28 => w28::SHIFT[i],
            FieldLayout::W14 => w14::SHIFT[i],
            FieldLayout::W9 => w9::SHIFT[i],
            FieldLayout::W7 => w7::SHIFT[i],
            FieldLayout::W4 => w4::SHIFT[i],
            FieldLayout::W3 => w3::SHIFT[i],
            FieldLayout::W2 => w2::SHIFT[i],
            FieldLayout::W5 => w5::SHIFT[i],
        }
    }

    #[inline(always)]
    fn mask(self, i: usize) -> u32 {
        match self {
            FieldLayout::W28 => w28::MASK[i],
            FieldLayout::W14 => w14::MASK[i],
            FieldLayout::W9 => w9::MASK[i],
            FieldLayout::W7 => w7::MASK[i],
            FieldLayout::W4 => w4::MASK[i],
            FieldLayout::W3 => w3::MASK[i],
            FieldLayout::W2 => w2::MASK[i],
            FieldLayout::W5 => w5::MASK[i],
        }
    }

    // Extract field i (0 = most significant) from a sealed word's 28-bit
    // payload with no branch beyond the layout dispatch itself.
    #[inline(always)]
    pub(crate) fn field(self, value: u32, i: usize) -> u32 {
        (value & self.mask(i)) >> self.shift(i)
    }
}

// Case tag occupying the high 4 bits, one per case_index 0..=14 (cases
// 1-15). The Case16/Case17 tags need the high 5 bits instead.
const CASE16_TAG: u32 = 0xF000_0000;
const CASE17_TAG: u32 = 0xF800_0000;
const CASE_TAG_MASK4: u32 = 0xF000_0000;
const CASE_TAG_MASK5: u32 = 0xF800_0000;
const CASE16_RUN_MASK: u32 = 0x07FF_FFFF;

const CASE_LAYOUT: [FieldLayout; 15] = [
    FieldLayout::W28,
    FieldLayout::W14,
    FieldLayout::W9,
    FieldLayout::W7,
    FieldLayout::W4,
    FieldLayout::W3,
    FieldLayout::W2,
    FieldLayout::W28,
    FieldLayout::W14,
    FieldLayout::W9,
    FieldLayout::W7,
    FieldLayout::W4,
    FieldLayout::W3,
    FieldLayout::W2,
    FieldLayout::W5,
];
const CASE_PREPEND: [bool; 15] = [
    false, false, false, false, false, false, false, true, true, true, true, true, true, true,
    true,
];

// The decoded shape of a sealed S18 word: either a pure run of one-gaps
// (Case 16), or an implicit run (0 or 28 one-gaps) followed by up to 14
// explicit fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum WordShape {
    Run { ones: u32 },
    Fields { implicit: u32, layout: FieldLayout },
}

// Decode the case tag of a sealed word. Panics on a tag outside the 17
// defined cases: a malformed word is a contract violation, never a
// recoverable error.
#[inline]
pub(crate) fn decode_shape(value: u32) -> WordShape {
    let top4 = value & CASE_TAG_MASK4;
    if top4 != CASE16_TAG {
        let case_index = (top4 >> 28) as usize;
        let layout = CASE_LAYOUT[case_index];
        let implicit = if CASE_PREPEND[case_index] { 28 } else { 0 };
        WordShape::Fields { implicit, layout }
    } else {
        let top5 = value & CASE_TAG_MASK5;
        if top5 == CASE16_TAG {
            WordShape::Run { ones: value & CASE16_RUN_MASK }
        } else if top5 == CASE17_TAG {
            WordShape::Fields { implicit: 0, layout: FieldLayout::W5 }
        } else {
            unreachable!("word::decode_shape: invalid S18 case tag {:#010x}", value)
        }
    }
}

// Field width lookup table, indexed by the 1-based bit-length of a gap
// (32 - gap.leading_zeros()), giving the minimum field width that can
// hold it.
const BIT_PAD: [u32; 33] = [
    1, 1, 2, 3, 4, 5, 7, 7, 9, 9, 14, 14, 14, 14, 14, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    28, 28, 28, 28, 28, 28, 28,
];

#[inline]
fn width_for_gap(gap: u32) -> u32 {
    debug_assert!(gap >= 1);
    let bitlen = 32 - gap.leading_zeros();
    BIT_PAD[bitlen as usize]
}

fn chunks_for_width(width: u32) -> u32 {
    match width {
        28 => 1,
        14 => 2,
        9 => 3,
        7 => 4,
        4 => 7,
        3 => 9,
        2 => 14,
        5 => 5,
        _ => unreachable!("word::chunks_for_width: invalid chunk width {}", width),
    }
}

fn case_tag_for(width: u32, prepend: bool) -> u32 {
    if width == 5 {
        return if prepend { (14u32) << 28 } else { CASE17_TAG };
    }
    let base_index = match width {
        28 => 0,
        14 => 1,
        9 => 2,
        7 => 3,
        4 => 4,
        3 => 5,
        2 => 6,
        _ => unreachable!("word::case_tag_for: invalid chunk width {}", width),
    };
    let case_index = if prepend { base_index + 7 } else { base_index };
    (case_index as u32) << 28
}

// An append-only sink for gaps being greedily packed into one S18 word.
//
// Tracks three pieces of state: a "leading ones" run length while every
// gap so far equals 1, the list of pending explicit gaps once that
// phase ends, and the minimum field width needed to hold everything
// pending.
pub(crate) struct PendingWord {
    in_leading_phase: bool,
    leading_ones: u32,
    pending: Vec<u32>,
    width: u32,
}

impl PendingWord {
    pub(crate) fn new() -> Self {
        PendingWord { in_leading_phase: true, leading_ones: 0, pending: Vec::with_capacity(14), width: 1 }
    }

    pub(crate) fn has_content(&self) -> bool {
        self.leading_ones > 0 || !self.pending.is_empty()
    }

    // Attempt to add gap (already validated to be in 1..=MAX_GAP). Returns
    // false if the word is full as it stands: the caller must seal it via
    // pack(), start a fresh PendingWord, and retry the same gap there.
    pub(crate) fn try_append(&mut self, gap: u32) -> bool {
        assert!(gap >= 1, "PendingWord::try_append: gap must be >= 1, a zero gap is a contract violation");

        self.in_leading_phase = self.in_leading_phase && gap == 1;
        if self.in_leading_phase {
            if self.leading_ones < MAX_RUN as u32 {
                self.leading_ones += 1;
            }
            return self.leading_ones < MAX_RUN as u32;
        }

        if self.leading_ones < 28 {
            while self.leading_ones > 0 {
                self.pending.push(1);
                self.leading_ones -= 1;
            }
        } else if self.leading_ones > 28 {
            return false;
        }

        let new_len = self.pending.len() + 1;
        let gap_width = width_for_gap(gap);
        let new_width = self.width.max(gap_width);
        if new_len * new_width as usize > 28 {
            return false;
        }

        self.pending.push(gap);
        self.width = new_width;
        true
    }

    // Seal the word, choosing the case tag deterministically from the
    // final (width, leading_ones) state.
    pub(crate) fn pack(self) -> u32 {
        if self.width == 1 && self.leading_ones > 0 {
            return CASE16_TAG | self.leading_ones;
        }
        if self.width == 1 && !self.pending.is_empty() {
            return CASE16_TAG | self.pending.len() as u32;
        }

        let capacity = chunks_for_width(self.width);
        let mut value: u32 = 0;
        for &gap in &self.pending {
            value <<= self.width;
            value |= gap;
        }
        value <<= self.width * (capacity - self.pending.len() as u32);

        debug_assert!(
            self.leading_ones == 0 || self.leading_ones == 28,
            "PendingWord::pack: leading_ones must be 0 or 28 here, got {}",
            self.leading_ones
        );
        let prepend = self.leading_ones == 28;
        value | case_tag_for(self.width, prepend)
    }
}

// Validate a gap against the codec's hard limits, returning the
// data-dependent Error the constructor should propagate rather than
// panic on: input too sparse for this codec is a construction failure,
// not a contract violation.
#[inline]
pub(crate) fn validate_gap(gap: u64) -> Result<u32> {
    if gap == 0 {
        // Can only happen if the caller passed a non-strictly-increasing
        // position sequence; a real bitvector cannot produce this.
        panic!("validate_gap: gap must be >= 1 (duplicate one-position in input)");
    }
    if gap > MAX_GAP {
        return Err(Error::GapTooLarge { gap });
    }
    Ok(gap as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_gaps(gaps: &[u32]) -> Vec<u32> {
        let mut words = Vec::new();
        let mut cur = PendingWord::new();
        for &g in gaps {
            if !cur.try_append(g) {
                words.push(std::mem::replace(&mut cur, PendingWord::new()).pack());
                let ok = cur.try_append(g);
                assert!(ok, "a single gap must always fit in a fresh word");
            }
        }
        if cur.has_content() {
            words.push(cur.pack());
        }
        words
    }

    fn decode_all(words: &[u32]) -> Vec<u32> {
        let mut out = Vec::new();
        for &w in words {
            match decode_shape(w) {
                WordShape::Run { ones } => {
                    for _ in 0..ones {
                        out.push(1);
                    }
                }
                WordShape::Fields { implicit, layout } => {
                    for _ in 0..implicit {
                        out.push(1);
                    }
                    for i in 0..layout.count() {
                        let v = layout.field(w, i);
                        if v == 0 {
                            break;
                        }
                        out.push(v);
                    }
                }
            }
        }
        out
    }

    #[test]
    fn single_small_gaps_pack_into_case16_run() {
        let gaps = vec![1u32; 10];
        let words = pack_gaps(&gaps);
        assert_eq!(words.len(), 1);
        assert_eq!(decode_all(&words), gaps);
        match decode_shape(words[0]) {
            WordShape::Run { ones } => assert_eq!(ones, 10),
            other => panic!("expected Run, got {:?}", other),
        }
    }

    #[test]
    fn dense_all_ones_spans_multiple_case16_words() {
        let gaps = vec![1u32; 100];
        let words = pack_gaps(&gaps);
        assert_eq!(decode_all(&words), gaps);
    }

    #[test]
    fn mixed_small_gaps_use_wide_fields() {
        // Needs width 7 (BIT_PAD for bit-length 6/7), 4 fields per word.
        let gaps = vec![43u32, 100, 5, 90, 12, 60];
        let words = pack_gaps(&gaps);
        assert_eq!(decode_all(&words), gaps);
    }

    #[test]
    fn leading_run_of_28_then_explicit_field() {
        let mut gaps = vec![1u32; 28];
        gaps.push(5);
        let words = pack_gaps(&gaps);
        assert_eq!(words.len(), 1);
        match decode_shape(words[0]) {
            WordShape::Fields { implicit, layout } => {
                assert_eq!(implicit, 28);
                assert_eq!(layout, FieldLayout::W7);
            }
            other => panic!("expected Fields, got {:?}", other),
        }
        assert_eq!(decode_all(&words), gaps);
    }

    #[test]
    fn leading_run_of_29_splits_into_two_words() {
        let mut gaps = vec![1u32; 29];
        gaps.push(5);
        let words = pack_gaps(&gaps);
        assert_eq!(words.len(), 2);
        assert_eq!(decode_all(&words), gaps);
    }

    #[test]
    fn single_large_gap_uses_28_bit_field() {
        let gaps = vec![(1u32 << 28) - 1];
        let words = pack_gaps(&gaps);
        assert_eq!(words.len(), 1);
        match decode_shape(words[0]) {
            WordShape::Fields { implicit: 0, layout: FieldLayout::W28 } => {}
            other => panic!("expected plain W28, got {:?}", other),
        }
        assert_eq!(decode_all(&words), gaps);
    }

    #[test]
    fn five_bit_fields_case17_and_case15() {
        let gaps = vec![20u32, 25, 16, 30, 17];
        let words = pack_gaps(&gaps);
        assert_eq!(words.len(), 1);
        match decode_shape(words[0]) {
            WordShape::Fields { implicit: 0, layout: FieldLayout::W5 } => {}
            other => panic!("expected plain W5 (case17), got {:?}", other),
        }
        assert_eq!(decode_all(&words), gaps);

        let mut gaps2 = vec![1u32; 28];
        gaps2.extend_from_slice(&[20, 25, 16, 30, 17]);
        let words2 = pack_gaps(&gaps2);
        assert_eq!(words2.len(), 1);
        match decode_shape(words2[0]) {
            WordShape::Fields { implicit: 28, layout: FieldLayout::W5 } => {}
            other => panic!("expected prepended W5 (case15), got {:?}", other),
        }
        assert_eq!(decode_all(&words2), gaps2);
    }

    #[test]
    fn greedy_pack_reconstruction_geometric() {
        // Deterministic pseudo-geometric gap generator (no external RNG dep).
        let mut state: u64 = 0x243F6A8885A308D3;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        let gaps: Vec<u32> = (0..500)
            .map(|_| 1 + (next() % 40) as u32)
            .collect();
        let words = pack_gaps(&gaps);
        assert_eq!(decode_all(&words), gaps);
    }

    #[test]
    fn word_round_trip_is_deterministic() {
        let gaps = vec![7u32, 7, 7, 7];
        let words_a = pack_gaps(&gaps);
        let words_b = pack_gaps(&gaps);
        assert_eq!(words_a, words_b);
    }
}
