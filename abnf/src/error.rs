use parsegen::Location;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

/// Input the lexer cannot split into tokens at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("{location}: unterminated quoted string")]
    UnterminatedString { location: Location },
    #[error("{location}: unterminated prose value")]
    UnterminatedProse { location: Location },
}

impl LexError {
    pub fn location(&self) -> Location {
        match self {
            LexError::UnterminatedString { location } | LexError::UnterminatedProse { location } => {
                *location
            }
        }
    }
}

/// Grammar source that does not follow the ABNF syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: expected {}, found {found}", describe(.expected))]
pub struct ParseError {
    pub location: Location,
    /// Everything that would have been accepted at `location`.
    pub expected: Vec<String>,
    pub found: String,
}

fn describe(expected: &[String]) -> String {
    match expected {
        [] => "nothing".to_owned(),
        [one] => one.clone(),
        many => format!("one of {}", many.join(", ")),
    }
}

/// Syntactically valid rules that do not form a usable grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("{location}: rule `{name}` is extended with `=/` before it is defined")]
    IncrementalWithoutBase { name: String, location: Location },
    #[error("{location}: rule `{name}` is already defined at {previous}")]
    Redefined {
        name: String,
        location: Location,
        previous: Location,
    },
    /// `location` is where `rule` was first defined. References carry no
    /// position of their own.
    #[error("{location}: rule `{rule}` references undefined rule `{name}`")]
    Undefined {
        rule: String,
        name: String,
        location: Location,
    },
    #[error("{location}: rule `{rule}` repeats {min}*{max}, minimum exceeds maximum")]
    InvertedRepeat {
        rule: String,
        min: u32,
        max: u32,
        location: Location,
    },
    #[error("rule `{rule}` is left recursive: {}", .cycle.join(" -> "))]
    LeftRecursion { rule: String, cycle: Vec<String> },
    #[error("rule `{rule}` contains prose value <{text}>, which cannot be matched")]
    UnsupportedProse { rule: String, text: String },
}

/// A numeric range that cannot be enumerated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeExpansionError {
    #[error("rule `{rule}` has range {lo:#X}-{hi:#X} with its start after its end")]
    Inverted { rule: String, lo: u32, hi: u32 },
    #[error("rule `{rule}` has a range of {len} values, limit is {limit}")]
    TooLarge { rule: String, len: u64, limit: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Range(#[from] RangeExpansionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_message() {
        let err = ParseError {
            location: Location {
                offset: 4,
                line: 1,
                column: 5,
            },
            expected: vec!["rulename".into(), "\"(\"".into()],
            found: "`)`".into(),
        };
        assert_eq!(
            err.to_string(),
            "1:5: expected one of rulename, \"(\", found `)`"
        );
    }

    #[test]
    fn range_error_message() {
        let err = RangeExpansionError::Inverted {
            rule: "r".into(),
            lo: 0x39,
            hi: 0x30,
        };
        assert_eq!(
            err.to_string(),
            "rule `r` has range 0x39-0x30 with its start after its end"
        );
    }
}
