// The shared block-sweep primitive and the three query operations built on
// top of it: access, rank1, select1.
//
// Every query starts with an O(1) Index lookup to find which b-word block
// the answer lives in, then sweeps that block's words. A sweep does not
// decode one gap at a time: a run of implicit or Case-16 one-gaps is a
// single contiguous block of one-bits, so the sweep consumes a whole run
// with one arithmetic comparison instead of walking it bit by bit. That
// is what keeps a Case-16 run (up to 2^27-1 gaps) off the query's time
// budget. Explicit fields are still visited one at a time, since each one
// is an independent gap.

use crate::index::Index;
use crate::word::{decode_shape, WordShape};
use nightly_quirks::branch_pred::{likely, unlikely};

// One contiguous piece of a block sweep: either a run of `len` consecutive
// one-bits (no zero-bits between them), or a single one-bit reached by
// advancing `gap` positions from the previous one.
enum Segment {
    Run(u32),
    Gap(u32),
}

enum Cursor {
    Run(u32),
    Fields { layout: crate::word::FieldLayout, field_idx: usize },
}

// Lazily decodes a block's words into Segments, most-significant field
// first, in one-position order.
struct BlockSweep<'a> {
    words: &'a [u32],
    word_idx: usize,
    cursor: Option<Cursor>,
    implicit_pending: u32,
}

impl<'a> BlockSweep<'a> {
    fn new(words: &'a [u32], word_idx: usize) -> Self {
        BlockSweep { words, word_idx, cursor: None, implicit_pending: 0 }
    }
}

impl<'a> Iterator for BlockSweep<'a> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        loop {
            if self.implicit_pending != 0 {
                let run = self.implicit_pending;
                self.implicit_pending = 0;
                return Some(Segment::Run(run));
            }
            if self.cursor.is_none() {
                if unlikely(self.word_idx >= self.words.len()) {
                    return None;
                }
                self.cursor = Some(match decode_shape(self.words[self.word_idx]) {
                    WordShape::Run { ones } => Cursor::Run(ones),
                    WordShape::Fields { implicit, layout } => {
                        self.implicit_pending = implicit;
                        Cursor::Fields { layout, field_idx: 0 }
                    }
                });
                // Loop back around so a nonzero `implicit_pending` is drained
                // before this word's explicit fields (or its Run) is read.
                continue;
            }

            match self.cursor.as_mut().unwrap() {
                Cursor::Run(ones) => {
                    let run = *ones;
                    self.word_idx += 1;
                    self.cursor = None;
                    if likely(run > 0) {
                        return Some(Segment::Run(run));
                    }
                }
                Cursor::Fields { layout, field_idx } => {
                    if *field_idx < layout.count() {
                        let gap = layout.field(self.words[self.word_idx], *field_idx);
                        if unlikely(gap == 0) {
                            // Word sealed before full: remaining fields are padding.
                            self.word_idx += 1;
                            self.cursor = None;
                            continue;
                        }
                        *field_idx += 1;
                        return Some(Segment::Gap(gap));
                    }
                    self.word_idx += 1;
                    self.cursor = None;
                }
            }
        }
    }
}

fn sweep_from(words: &[u32], b: usize, block: usize) -> BlockSweep<'_> {
    BlockSweep::new(words, block * b)
}

pub(crate) fn access(words: &[u32], index: &Index, b: usize, total_bits: u64, i: u64) -> bool {
    assert!(i < total_bits, "access: index {} out of range (len {})", i, total_bits);
    let (block, bits_before, _) = index.block_for_bit(i);
    let i = i as i64;
    let mut accum = bits_before as i64 - 1;
    for seg in sweep_from(words, b, block) {
        match seg {
            Segment::Run(len) => {
                let last = accum + len as i64;
                if i <= last {
                    return i > accum;
                }
                accum = last;
            }
            Segment::Gap(gap) => {
                accum += gap as i64;
                if accum == i {
                    return true;
                }
                if accum > i {
                    return false;
                }
            }
        }
    }
    false
}

pub(crate) fn rank1(words: &[u32], index: &Index, b: usize, total_bits: u64, i: u64) -> u64 {
    assert!(i <= total_bits, "rank1: index {} out of range (len {})", i, total_bits);
    let (block, bits_before, ones_before) = index.block_for_bit(i);
    let i = i as i64;
    let mut accum = bits_before as i64 - 1;
    let mut rank = ones_before;
    for seg in sweep_from(words, b, block) {
        match seg {
            Segment::Run(len) => {
                let last = accum + len as i64;
                if i <= accum + 1 {
                    return rank;
                }
                if i > last {
                    rank += len as u64;
                    accum = last;
                } else {
                    // target falls inside the run: i - accum - 1 ones precede it.
                    rank += (i - accum - 1) as u64;
                    return rank;
                }
            }
            Segment::Gap(gap) => {
                accum += gap as i64;
                if likely(accum < i) {
                    rank += 1;
                } else {
                    return rank;
                }
            }
        }
    }
    rank
}

pub(crate) fn select1(words: &[u32], index: &Index, b: usize, total_ones: u64, k: u64) -> u64 {
    assert!(k >= 1 && k <= total_ones, "select1: rank {} out of range (1..={})", k, total_ones);
    let (block, bits_before, ones_before) = index.block_for_one(k - 1);
    let mut accum = bits_before as i64 - 1;
    let mut remaining = k - ones_before;
    for seg in sweep_from(words, b, block) {
        match seg {
            Segment::Run(len) => {
                if remaining <= len as u64 {
                    return (accum + remaining as i64) as u64;
                }
                remaining -= len as u64;
                accum += len as i64;
            }
            Segment::Gap(gap) => {
                accum += gap as i64;
                remaining -= 1;
                if remaining == 0 {
                    return accum as u64;
                }
            }
        }
    }
    unreachable!("select1: rank {} not found even though k <= total_ones ({})", k, total_ones);
}
