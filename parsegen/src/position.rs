use std::fmt::{self, Display};

/// A human readable position within source text. Lines and columns start at 1;
/// columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Locate a byte offset within `source`. Offsets past the end are clamped
    /// to the end of the source.
    pub fn of(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        let column = before[line_start..].chars().count() + 1;
        Location {
            offset,
            line,
            column,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_of_offset() {
        let tests = vec![
            ("", 0, (1, 1)),
            ("hello", 0, (1, 1)),
            ("hello", 4, (1, 5)),
            ("a = b\r\nc = d", 7, (2, 1)),
            ("a = b\nc = d", 9, (2, 4)),
            ("ab", 10, (1, 3)),
        ];
        for test in tests {
            let loc = Location::of(test.0, test.1);
            assert_eq!((loc.line, loc.column), test.2, "test case: {:?}", test);
        }
    }

    #[test]
    fn location_counts_chars() {
        let loc = Location::of("é = x", 3);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.to_string(), "1:3");
    }
}
