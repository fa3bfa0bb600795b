//! Expansion of numeric values into the terminals they stand for.

use crate::ast::NumValue;
use crate::error::RangeExpansionError;

/// The terminals a numeric value denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// Exactly one unit.
    Unit(u32),
    /// Units that must follow each other, in order.
    Sequence(Vec<u32>),
    /// Any one unit from `lo` to `hi` inclusive, tried in ascending order.
    Choice { lo: u32, hi: u32 },
}

impl Expansion {
    /// Every unit the expansion mentions, in the order it is tried.
    pub fn units(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            Expansion::Unit(unit) => Box::new(std::iter::once(*unit)),
            Expansion::Sequence(units) => Box::new(units.iter().copied()),
            Expansion::Choice { lo, hi } => Box::new(*lo..=*hi),
        }
    }
}

/// Number of values in an inclusive range.
pub fn range_len(lo: u32, hi: u32) -> u64 {
    u64::from(hi) - u64::from(lo) + 1
}

/// Expand `value`, which appears in `rule`. Ranges wider than `limit` are
/// rejected.
pub fn expand(
    rule: &str,
    value: &NumValue,
    limit: Option<u32>,
) -> Result<Expansion, RangeExpansionError> {
    match value {
        NumValue::Sequence(units) => match units.as_slice() {
            [unit] => Ok(Expansion::Unit(*unit)),
            _ => Ok(Expansion::Sequence(units.clone())),
        },
        NumValue::Range(lo, hi) => {
            if hi < lo {
                return Err(RangeExpansionError::Inverted {
                    rule: rule.to_owned(),
                    lo: *lo,
                    hi: *hi,
                });
            }
            let len = range_len(*lo, *hi);
            if let Some(limit) = limit {
                if len > u64::from(limit) {
                    return Err(RangeExpansionError::TooLarge {
                        rule: rule.to_owned(),
                        len,
                        limit,
                    });
                }
            }
            if lo == hi {
                Ok(Expansion::Unit(*lo))
            } else {
                Ok(Expansion::Choice { lo: *lo, hi: *hi })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_values() {
        let tests = vec![
            (NumValue::Sequence(vec![0x41]), Expansion::Unit(0x41)),
            (
                NumValue::Sequence(vec![13, 10]),
                Expansion::Sequence(vec![13, 10]),
            ),
            (NumValue::Range(7, 7), Expansion::Unit(7)),
            (
                NumValue::Range(0x30, 0x39),
                Expansion::Choice { lo: 0x30, hi: 0x39 },
            ),
        ];
        for (value, expected) in tests {
            assert_eq!(expand("r", &value, None).unwrap(), expected);
        }
    }

    #[test]
    fn full_byte_range() {
        let expansion = expand("octet", &NumValue::Range(0x00, 0xFF), None).unwrap();
        let units: Vec<u32> = expansion.units().collect();
        assert_eq!(units.len(), 256);
        assert_eq!(units.first(), Some(&0));
        assert_eq!(units.last(), Some(&0xFF));
        assert!(units.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn range_len_does_not_overflow() {
        assert_eq!(range_len(0, u32::MAX), 1 << 32);
    }

    #[test]
    fn expand_errors() {
        assert_eq!(
            expand("r", &NumValue::Range(0x39, 0x30), None),
            Err(RangeExpansionError::Inverted {
                rule: "r".into(),
                lo: 0x39,
                hi: 0x30
            })
        );
        assert_eq!(
            expand("r", &NumValue::Range(0, 0xFF), Some(128)),
            Err(RangeExpansionError::TooLarge {
                rule: "r".into(),
                len: 256,
                limit: 128
            })
        );
        assert!(expand("r", &NumValue::Range(0, 0xFF), Some(256)).is_ok());
    }
}
