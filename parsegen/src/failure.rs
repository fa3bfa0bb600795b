use std::borrow::Cow;
use std::fmt::{self, Display};

/// Something a matcher was looking for when it failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expected {
    /// An exact sequence of units.
    Literal(Vec<u32>),
    /// A named construct, e.g. a rule or token class.
    Named(Cow<'static, str>),
    EndOfInput,
}

impl Expected {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Expected::Named(name.into())
    }
}

impl Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expected::Literal(units) => {
                let printable = units
                    .iter()
                    .all(|&u| (0x20..=0x7e).contains(&u) && u != u32::from(b'"'));
                if printable {
                    let text: String = units.iter().filter_map(|&u| char::from_u32(u)).collect();
                    write!(f, "\"{}\"", text)
                } else {
                    write!(f, "%x")?;
                    for (idx, unit) in units.iter().enumerate() {
                        if idx > 0 {
                            write!(f, ".")?;
                        }
                        write!(f, "{:02X}", unit)?;
                    }
                    Ok(())
                }
            }
            Expected::Named(name) => write!(f, "{}", name),
            Expected::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// The furthest point a parse reached before failing, and everything that
/// would have been accepted there.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("expected {} at position {position}", describe(.expected))]
pub struct Failure {
    pub position: usize,
    pub expected: Vec<Expected>,
}

impl Failure {
    pub fn new(position: usize) -> Self {
        Failure {
            position,
            expected: Vec::new(),
        }
    }

    /// Record that `expected` was not found at `position`. Expectations
    /// behind the current furthest position are dropped.
    pub fn record(&mut self, position: usize, expected: Expected) {
        if position > self.position {
            self.position = position;
            self.expected.clear();
        }
        if position == self.position && !self.expected.contains(&expected) {
            self.expected.push(expected);
        }
    }

    pub fn merge(&mut self, other: Failure) {
        for expected in other.expected {
            self.record(other.position, expected);
        }
    }
}

fn describe(expected: &[Expected]) -> String {
    match expected {
        [] => "nothing".to_owned(),
        [one] => one.to_string(),
        many => {
            let parts: Vec<String> = many.iter().map(ToString::to_string).collect();
            format!("one of {}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_furthest_expectations() {
        let mut failure = Failure::default();
        failure.record(0, Expected::named("a"));
        failure.record(2, Expected::named("b"));
        failure.record(1, Expected::named("c"));
        failure.record(2, Expected::named("d"));
        failure.record(2, Expected::named("b"));
        assert_eq!(failure.position, 2);
        assert_eq!(
            failure.expected,
            vec![Expected::named("b"), Expected::named("d")]
        );
    }

    #[test]
    fn merge_prefers_further_failure() {
        let mut a = Failure::default();
        a.record(1, Expected::EndOfInput);
        let mut b = Failure::default();
        b.record(3, Expected::Literal(vec![0x61]));
        a.merge(b);
        assert_eq!(a.position, 3);
        assert_eq!(a.expected, vec![Expected::Literal(vec![0x61])]);
    }

    #[test]
    fn display() {
        let tests = vec![
            (Expected::Literal(vec![0x61, 0x62]), "\"ab\""),
            (Expected::Literal(vec![0x0d, 0x0a]), "%x0D.0A"),
            (Expected::Literal(vec![0x22]), "%x22"),
            (Expected::named("rulename"), "rulename"),
            (Expected::EndOfInput, "end of input"),
        ];
        for (expected, s) in tests {
            assert_eq!(expected.to_string(), s);
        }

        let mut failure = Failure::new(4);
        failure.record(4, Expected::named("\"=\""));
        failure.record(4, Expected::named("\"=/\""));
        assert_eq!(
            failure.to_string(),
            "expected one of \"=\", \"=/\" at position 4"
        );
    }
}
