//! Coordinate structure used to reference specific locations within the byte stream
//! flowing through a transport.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A [Coords] represents a single location within the (logical) transport input. The absolute
/// position is a byte offset from the very first byte ever delivered, and never moves backwards.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coords {
    /// The absolute byte position
    pub absolute: usize,
    /// The row position
    pub line: usize,
    /// The column position (in bytes)
    pub column: usize,
}

impl Coords {
    /// Compute the coordinates reached after moving over a run of bytes starting at these
    /// coordinates
    pub fn advance(&self, bytes: &[u8]) -> Coords {
        let mut newlines = memchr::memchr_iter(b'\n', bytes);
        match newlines.next_back() {
            Some(last) => Coords {
                absolute: self.absolute + bytes.len(),
                line: self.line + 1 + newlines.count(),
                column: bytes.len() - last - 1,
            },
            None => Coords {
                absolute: self.absolute + bytes.len(),
                line: self.line,
                column: self.column + bytes.len(),
            },
        }
    }
}

impl Display for Coords {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[abs: {}, line: {}, column: {}]",
            self.absolute, self.line, self.column
        )
    }
}

impl Default for Coords {
    /// The default set of coordinates are positioned at the start of the first row
    fn default() -> Self {
        Coords {
            absolute: 0,
            line: 0,
            column: 0,
        }
    }
}

impl Eq for Coords {}

impl PartialOrd<Self> for Coords {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coords {
    fn cmp(&self, other: &Self) -> Ordering {
        self.absolute.cmp(&other.absolute)
    }
}
