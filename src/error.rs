// Error taxonomy for the S18 vector: data-dependent construction failures
// and I/O propagation. Contract violations (bad query indices, a zero
// gap) are not Errors, they panic, since they indicate a programming bug
// rather than a condition the caller can sensibly recover from.

use std::fmt;

// Maximum gap value representable by any S18 field (2^28 - 1).
pub const MAX_GAP: u64 = (1 << 28) - 1;

// Maximum run length representable by a Case 16 word (2^27 - 1).
pub const MAX_RUN: u64 = (1 << 27) - 1;

#[derive(Debug)]
pub enum Error {
    // A gap between consecutive one-bits exceeded what any S18 field can
    // hold. The input is too sparse for this codec.
    GapTooLarge { gap: u64 },
    // A run of leading one-gaps exceeded the Case 16 run-length field.
    LeadingOnesOverflow { count: u64 },
    // Deserialization ran out of bytes before the declared structure was
    // fully read.
    Truncated { context: &'static str },
    // Propagated I/O failure during serialize/deserialize.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::GapTooLarge { gap } => {
                write!(f, "gap {} exceeds the maximum encodable gap {}", gap, MAX_GAP)
            }
            Error::LeadingOnesOverflow { count } => write!(
                f,
                "leading-ones run {} exceeds the maximum Case 16 run length {}",
                count, MAX_RUN
            ),
            Error::Truncated { context } => {
                write!(f, "truncated input while reading {}", context)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
