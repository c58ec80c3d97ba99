// Two-level index over the L1 block boundaries recorded during packing.
//
// L1 is one (cumulative bits, cumulative ones) pair per b-word block.
// Scanning it linearly to answer "which block holds bit i" is already
// sublinear in the input size, but L2 removes even that: a uniform-stride
// directory samples the bit domain (respectively the one domain) every
// d_bits (d_ones) units and records which L1 block each sample falls in,
// so a query jumps straight to a block close to the answer and only
// scans the handful of L1 entries between consecutive samples.

use crate::error::Result;
use crate::intvector::{read_u64, IntVector};
use std::io::{Read, Write};

pub(crate) struct Index {
    l1_bits: IntVector,
    l1_ones: IntVector,
    l2_bits: IntVector,
    l2_ones: IntVector,
    d_bits: u64,
    d_ones: u64,
}

impl Index {
    pub(crate) fn build(l1_bits: &[u64], l1_ones: &[u64], total_bits: u64, total_ones: u64) -> Self {
        debug_assert_eq!(l1_bits.len(), l1_ones.len());
        let l = l1_bits.len();
        let s = l.max(1);
        let d_bits = div_ceil(total_bits.max(1), s as u64);
        let d_ones = div_ceil(total_ones + 1, s as u64);

        let sample_block_of_bit = sample_directory(l1_bits, s, d_bits);
        let sample_block_of_one = sample_directory(l1_ones, s, d_ones);

        Index {
            l1_bits: IntVector::from_values(l1_bits),
            l1_ones: IntVector::from_values(l1_ones),
            l2_bits: IntVector::from_values(&sample_block_of_bit),
            l2_ones: IntVector::from_values(&sample_block_of_one),
            d_bits,
            d_ones,
        }
    }

    #[inline]
    fn l1_len(&self) -> usize {
        self.l1_bits.len()
    }

    #[inline]
    fn boundary(&self, j: usize) -> (u64, u64) {
        (self.l1_bits.get(j), self.l1_ones.get(j))
    }

    // Returns (block, bits_before, ones_before): block is the L1 block
    // index whose word range a sweep for bit i should start at, and
    // bits_before/ones_before are the totals already accumulated by every
    // earlier block.
    pub(crate) fn block_for_bit(&self, i: u64) -> (usize, u64, u64) {
        self.locate(i, self.d_bits, &self.l2_bits, |j| self.l1_bits.get(j))
    }

    // Same lookup keyed by a 0-based one-rank instead of a bit position:
    // finds the block containing the (k+1)-th one.
    pub(crate) fn block_for_one(&self, k: u64) -> (usize, u64, u64) {
        self.locate(k, self.d_ones, &self.l2_ones, |j| self.l1_ones.get(j))
    }

    fn locate(
        &self,
        target: u64,
        divisor: u64,
        directory: &IntVector,
        boundary_at: impl Fn(usize) -> u64,
    ) -> (usize, u64, u64) {
        let l = self.l1_len();
        if l == 0 {
            return (0, 0, 0);
        }
        let sample = ((target / divisor) as usize).min(directory.len() - 1);
        let mut j = directory.get(sample) as usize;
        while j < l && boundary_at(j) <= target {
            j += 1;
        }
        if j == 0 {
            (0, 0, 0)
        } else {
            let (bits, ones) = self.boundary(j - 1);
            (j, bits, ones)
        }
    }

    pub(crate) fn size_in_bytes(&self) -> usize {
        self.l1_bits.size_in_bytes()
            + self.l1_ones.size_in_bytes()
            + self.l2_bits.size_in_bytes()
            + self.l2_ones.size_in_bytes()
    }

    pub(crate) fn write(&self, out: &mut impl Write) -> Result<()> {
        self.l1_bits.write(out)?;
        self.l1_ones.write(out)?;
        self.l2_bits.write(out)?;
        self.l2_ones.write(out)?;
        out.write_all(&self.d_bits.to_le_bytes())?;
        out.write_all(&self.d_ones.to_le_bytes())?;
        Ok(())
    }

    pub(crate) fn read(input: &mut impl Read) -> Result<Self> {
        let l1_bits = IntVector::read(input)?;
        let l1_ones = IntVector::read(input)?;
        let l2_bits = IntVector::read(input)?;
        let l2_ones = IntVector::read(input)?;
        let d_bits = read_u64(input, "Index.d_bits")?;
        let d_ones = read_u64(input, "Index.d_ones")?;
        Ok(Index { l1_bits, l1_ones, l2_bits, l2_ones, d_bits, d_ones })
    }
}

fn sample_directory(prefix: &[u64], samples: usize, divisor: u64) -> Vec<u64> {
    let mut directory = vec![0u64; samples];
    let mut j = 0usize;
    for (sample, slot) in directory.iter_mut().enumerate() {
        let target = sample as u64 * divisor;
        while j < prefix.len() && prefix[j] <= target {
            j += 1;
        }
        *slot = j as u64;
    }
    directory
}

fn div_ceil(a: u64, b: u64) -> u64 {
    (a + b - 1) / b
}
