// The public S18Vector type: a succinct compressed bitvector answering
// access/rank1/select1 in time proportional to one B-word block sweep
// plus an O(1) index lookup.

use crate::bitvector::BitVector;
use crate::error::Result;
use crate::index::Index;
use crate::intvector::IntVector32;
use crate::pack;
use crate::query;
use static_assertions::const_assert;
use std::io::{Read, Write};

// Default block size, in S18 words, between consecutive L1 index entries.
// Reasonable space/time tradeoff for most inputs; override B to tune it.
pub const DEFAULT_BLOCK_WORDS: usize = 256;

// A breakdown of where a vector's bytes go, for diagnostics and tuning
// the block size B.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SizeBreakdown {
    pub words_bytes: usize,
    pub index_bytes: usize,
    pub total_bytes: usize,
}

// A succinct bitvector built once from a plain BitVector and queried
// read-only afterward via access/rank1/rank0/select1.
//
// B is the number of S18 words between consecutive L1 index entries; it
// must be one of 8, 16, 32, 64, 128, 256, 512, 1024. Larger blocks shrink
// the index at the cost of a longer per-query sweep.
pub struct S18Vector<const B: usize = DEFAULT_BLOCK_WORDS> {
    words: IntVector32,
    index: Index,
    total_bits: u64,
    total_ones: u64,
}

impl<const B: usize> S18Vector<B> {
    const_assert!(B == 8 || B == 16 || B == 32 || B == 64 || B == 128 || B == 256 || B == 512 || B == 1024);

    // Build a compressed vector from bits, streaming its gap sequence once
    // and packing it greedily into S18 words. Fails if any gap (or the
    // leading run of ones) exceeds what an S18 field can represent; that
    // is a property of how sparse the input is, not a programming error,
    // so it comes back as an Error rather than a panic.
    pub fn new(bits: &BitVector) -> Result<Self> {
        let packed = pack::pack(bits, B)?;
        let index = Index::build(&packed.l1_bits, &packed.l1_ones, packed.total_bits, packed.total_ones);
        Ok(S18Vector {
            words: packed.words,
            index,
            total_bits: packed.total_bits,
            total_ones: packed.total_ones,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.total_bits as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total_bits == 0
    }

    #[inline]
    pub fn count_ones(&self) -> u64 {
        self.total_ones
    }

    // The bit at position i. Panics if i >= self.len().
    #[inline]
    pub fn access(&self, i: u64) -> bool {
        query::access(self.words.as_slice(), &self.index, B, self.total_bits, i)
    }

    // The number of one-bits in [0, i). Panics if i > self.len().
    #[inline]
    pub fn rank1(&self, i: u64) -> u64 {
        query::rank1(self.words.as_slice(), &self.index, B, self.total_bits, i)
    }

    // The number of zero-bits in [0, i). Panics if i > self.len().
    #[inline]
    pub fn rank0(&self, i: u64) -> u64 {
        assert!(i <= self.total_bits, "rank0: index {} out of range (len {})", i, self.total_bits);
        i - self.rank1(i)
    }

    // The position of the k-th one-bit, 1-indexed. Panics if k is 0 or
    // exceeds count_ones().
    #[inline]
    pub fn select1(&self, k: u64) -> u64 {
        query::select1(self.words.as_slice(), &self.index, B, self.total_ones, k)
    }

    pub fn size_in_bytes(&self) -> usize {
        self.words.size_in_bytes() + self.index.size_in_bytes() + 16
    }

    pub fn size_breakdown(&self) -> SizeBreakdown {
        let words_bytes = self.words.size_in_bytes();
        let index_bytes = self.index.size_in_bytes();
        SizeBreakdown { words_bytes, index_bytes, total_bytes: words_bytes + index_bytes + 16 }
    }

    pub fn serialize(&self, out: &mut impl Write) -> Result<()> {
        out.write_all(&(B as u64).to_le_bytes())?;
        out.write_all(&self.total_bits.to_le_bytes())?;
        out.write_all(&self.total_ones.to_le_bytes())?;
        self.words.write(out)?;
        self.index.write(out)?;
        Ok(())
    }

    pub fn deserialize(input: &mut impl Read) -> Result<Self> {
        let stored_b = crate::intvector::read_u64(input, "S18Vector.block_size")?;
        assert_eq!(
            stored_b, B as u64,
            "S18Vector::deserialize: serialized block size {} does not match requested B={}",
            stored_b, B
        );
        let total_bits = crate::intvector::read_u64(input, "S18Vector.total_bits")?;
        let total_ones = crate::intvector::read_u64(input, "S18Vector.total_ones")?;
        let words = IntVector32::read(input)?;
        let index = Index::read(input)?;
        Ok(S18Vector { words, index, total_bits, total_ones })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force_vector(bits: &[bool]) -> S18Vector<8> {
        S18Vector::<8>::new(&BitVector::from_bits(bits.iter().copied())).unwrap()
    }

    #[test]
    fn empty_vector_has_zero_length_and_ones() {
        let v = S18Vector::<16>::new(&BitVector::new()).unwrap();
        assert_eq!(v.len(), 0);
        assert_eq!(v.count_ones(), 0);
        assert!(v.is_empty());
    }

    #[test]
    fn all_zero_vector_answers_queries_without_words() {
        let v = S18Vector::<16>::new(&BitVector::with_len(500)).unwrap();
        assert_eq!(v.len(), 500);
        assert_eq!(v.count_ones(), 0);
        assert!(!v.access(0));
        assert!(!v.access(499));
        assert_eq!(v.rank1(500), 0);
        assert_eq!(v.rank0(500), 500);
    }

    #[test]
    fn alternating_bits_scenario() {
        let bv = BitVector::from_bits([true, false, true, false, true, false, true, false]);
        let v = S18Vector::<8>::new(&bv).unwrap();
        let expected_rank1: [u64; 8] = [0, 1, 1, 2, 2, 3, 3, 4];
        for (i, &r) in expected_rank1.iter().enumerate() {
            assert_eq!(v.rank1(i as u64), r, "rank1 i={}", i);
        }
        let expected_select1: [u64; 4] = [0, 2, 4, 6];
        for (idx, &pos) in expected_select1.iter().enumerate() {
            assert_eq!(v.select1(idx as u64 + 1), pos, "select1 k={}", idx + 1);
        }
    }

    #[test]
    fn single_bit_vector() {
        let mut bv = BitVector::with_len(1);
        bv.set(0, true);
        let v = S18Vector::<8>::new(&bv).unwrap();
        assert!(v.access(0));
        assert_eq!(v.rank1(0), 0);
        assert_eq!(v.rank1(1), 1);
        assert_eq!(v.select1(1), 0);
    }

    #[test]
    fn mixed_density_matches_brute_force() {
        let n = 10_000usize;
        let bits: Vec<bool> = (0..n)
            .map(|i| ((i as u64).wrapping_mul(2654435761)) % 7 == 0)
            .collect();
        let v = brute_force_vector(&bits);
        assert_eq!(v.len(), n);

        let ones: Vec<u64> = bits.iter().enumerate().filter(|&(_, &b)| b).map(|(i, _)| i as u64).collect();
        assert_eq!(v.count_ones(), ones.len() as u64);

        let mut rank = 0u64;
        for i in 0..n {
            assert_eq!(v.access(i as u64), bits[i], "access i={}", i);
            assert_eq!(v.rank1(i as u64), rank, "rank1 i={}", i);
            if bits[i] {
                rank += 1;
            }
        }
        assert_eq!(v.rank1(n as u64), rank);

        for (idx, &pos) in ones.iter().enumerate() {
            assert_eq!(v.select1(idx as u64 + 1), pos, "select1 k={}", idx + 1);
        }
    }

    #[test]
    fn serialize_roundtrip_preserves_query_answers() {
        let mut bv = BitVector::with_len(3000);
        for i in (1..3000).step_by(31) {
            bv.set(i, true);
        }
        let v = S18Vector::<32>::new(&bv).unwrap();
        let mut buf = Vec::new();
        v.serialize(&mut buf).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let v2 = S18Vector::<32>::deserialize(&mut cursor).unwrap();

        assert_eq!(v.len(), v2.len());
        assert_eq!(v.count_ones(), v2.count_ones());
        for i in (0..3000u64).step_by(7) {
            assert_eq!(v.access(i), v2.access(i));
            assert_eq!(v.rank1(i), v2.rank1(i));
        }
    }

    #[test]
    fn rejects_input_too_sparse_for_the_codec() {
        let mut bv = BitVector::with_len(1 << 29);
        bv.set(0, true);
        bv.set((1 << 29) - 1, true);
        let err = S18Vector::<8>::new(&bv).unwrap_err();
        match err {
            crate::error::Error::GapTooLarge { .. } => {}
            other => panic!("expected GapTooLarge, got {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn select1_of_zero_panics() {
        let mut bv = BitVector::with_len(10);
        bv.set(0, true);
        let v = S18Vector::<8>::new(&bv).unwrap();
        v.select1(0);
    }
}
