// A succinct compressed bitvector using the S18 gap-packing codec.
// Build a S18Vector once from a BitVector, then answer access/rank1/
// rank0/select1 queries against the compressed form; the original bits
// are never kept around.

#[macro_use]
extern crate static_assertions;

pub mod error;

mod bitvector;
mod index;
mod intvector;
mod pack;
mod query;
mod unchecked;
mod vector;
mod word;

pub use bitvector::BitVector;
pub use error::{Error, Result};
pub use intvector::{IntVector, IntVector32};
pub use vector::{S18Vector, SizeBreakdown, DEFAULT_BLOCK_WORDS};
