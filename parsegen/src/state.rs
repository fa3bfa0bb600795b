use crate::{Expected, Failure, Input, Span};

/// Outcome of a match attempt. On failure the returned state is positioned
/// where the attempt started, so no partial consumption is observable.
pub type Parsed<'a, I, T> = Result<(State<'a, I>, T), State<'a, I>>;

/// One branch of an ordered choice.
pub type Alternative<'f, 'a, I, T> = &'f dyn Fn(State<'a, I>) -> Parsed<'a, I, T>;

/// How literal units are compared against input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    Sensitive,
    /// ASCII letters compare without regard to case. Every other unit is
    /// compared exactly.
    Insensitive,
}

impl Case {
    pub fn matches(self, expected: u32, actual: u32) -> bool {
        match self {
            Case::Sensitive => expected == actual,
            Case::Insensitive => fold_ascii(expected) == fold_ascii(actual),
        }
    }
}

fn fold_ascii(unit: u32) -> u32 {
    if (u32::from(b'A')..=u32::from(b'Z')).contains(&unit) {
        unit + 0x20
    } else {
        unit
    }
}

/// Parser state: a cursor into the input plus the furthest failure seen.
#[derive(Debug)]
pub struct State<'a, I: ?Sized> {
    input: &'a I,
    idx: usize,
    furthest: Failure,
}

impl<'a, I: Input + ?Sized> State<'a, I> {
    pub fn new(input: &'a I) -> Self {
        State {
            input,
            idx: 0,
            furthest: Failure::default(),
        }
    }

    pub fn input(&self) -> &'a I {
        self.input
    }

    pub fn position(&self) -> usize {
        self.idx
    }

    pub fn is_at_end(&self) -> bool {
        self.idx >= self.input.len()
    }

    pub fn failure(&self) -> &Failure {
        &self.furthest
    }

    pub fn into_failure(self) -> Failure {
        self.furthest
    }

    /// Record that `expected` was not found at the current position.
    pub fn record(&mut self, expected: Expected) {
        self.furthest.record(self.idx, expected);
    }

    /// Match a single unit. `f` decides whether the unit is acceptable and
    /// what it produces.
    pub fn match_unit<T, F>(mut self, expected: Expected, f: F) -> Parsed<'a, I, T>
    where
        F: FnOnce(I::Unit) -> Option<T>,
    {
        match self.input.unit_at(self.idx).and_then(f) {
            Some(value) => {
                self.idx += 1;
                Ok((self, value))
            }
            None => {
                self.record(expected);
                Err(self)
            }
        }
    }

    /// Always succeeds without consuming anything.
    pub fn match_empty(self) -> Parsed<'a, I, Span> {
        let span = Span::new(self.idx, self.idx);
        Ok((self, span))
    }

    /// Succeeds only when no input remains.
    pub fn match_end(mut self) -> Parsed<'a, I, ()> {
        if self.is_at_end() {
            Ok((self, ()))
        } else {
            self.record(Expected::EndOfInput);
            Err(self)
        }
    }

    /// Run `f` as one atomic step. If any part of it fails, the cursor is
    /// restored to where the sequence started.
    pub fn match_sequence<T, F>(self, f: F) -> Parsed<'a, I, T>
    where
        F: FnOnce(Self) -> Parsed<'a, I, T>,
    {
        let start = self.idx;
        f(self).map_err(|mut state| {
            state.idx = start;
            state
        })
    }

    /// Ordered choice: try each alternative from the same starting position
    /// and return the first success.
    pub fn match_choice<T>(self, alternatives: &[Alternative<'_, 'a, I, T>]) -> Parsed<'a, I, T> {
        self.match_choice_by(alternatives.len(), |state, idx| (alternatives[idx])(state))
    }

    /// Ordered choice over `count` alternatives chosen by index.
    pub fn match_choice_by<T, F>(self, count: usize, f: F) -> Parsed<'a, I, T>
    where
        F: Fn(Self, usize) -> Parsed<'a, I, T>,
    {
        let start = self.idx;
        let mut state = self;
        for idx in 0..count {
            match f(state, idx) {
                Ok(matched) => return Ok(matched),
                Err(mut next) => {
                    next.idx = start;
                    state = next;
                }
            }
        }
        Err(state)
    }

    /// Greedily match `f` up to `max` times (unbounded when `None`). Fails,
    /// consuming nothing, if fewer than `min` matches were found.
    ///
    /// An iteration that consumes nothing ends the loop once `min` has been
    /// reached. Without this, a nullable element would repeat forever.
    pub fn match_repetition<T, F>(self, min: usize, max: Option<usize>, f: F) -> Parsed<'a, I, Vec<T>>
    where
        F: Fn(Self) -> Parsed<'a, I, T>,
    {
        let start = self.idx;
        let mut state = self;
        let mut items = Vec::new();
        while max.map_or(true, |max| items.len() < max) {
            let before = state.idx;
            match f(state) {
                Ok((next, item)) => {
                    state = next;
                    items.push(item);
                    if state.idx == before && items.len() >= min {
                        break;
                    }
                }
                Err(mut next) => {
                    next.idx = before;
                    state = next;
                    break;
                }
            }
        }

        if items.len() >= min {
            Ok((state, items))
        } else {
            state.idx = start;
            Err(state)
        }
    }

    /// Match `f` zero or one times.
    pub fn match_optional<T, F>(self, f: F) -> Parsed<'a, I, Option<T>>
    where
        F: FnOnce(Self) -> Parsed<'a, I, T>,
    {
        let start = self.idx;
        match f(self) {
            Ok((state, value)) => Ok((state, Some(value))),
            Err(mut state) => {
                state.idx = start;
                Ok((state, None))
            }
        }
    }
}

impl<'a, I> State<'a, I>
where
    I: Input + ?Sized,
    I::Unit: Into<u32>,
{
    /// Match an exact run of units.
    pub fn match_literal(mut self, units: &[u32], case: Case) -> Parsed<'a, I, Span> {
        let input = self.input;
        let start = self.idx;
        let matched = units.iter().enumerate().all(|(offset, &expected)| {
            input
                .unit_at(start + offset)
                .map_or(false, |actual| case.matches(expected, actual.into()))
        });

        if matched {
            self.idx = start + units.len();
            let span = Span::new(start, self.idx);
            Ok((self, span))
        } else {
            self.record(Expected::Literal(units.to_vec()));
            Err(self)
        }
    }

    /// Match a string exactly. Each `char` is one unit.
    pub fn match_str(self, s: &str) -> Parsed<'a, I, Span> {
        let units: Vec<u32> = s.chars().map(u32::from).collect();
        self.match_literal(&units, Case::Sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit<'a>(state: State<'a, str>, s: &str) -> Parsed<'a, str, Span> {
        state.match_str(s)
    }

    #[test]
    fn literal_advances_only_on_match() {
        let tests = vec![
            ("", 0, "", true),
            ("hello", 0, "world", false),
            ("hello", 0, "hello", true),
            ("hello", 0, "hell", true),
            ("hell", 0, "hello", false),
        ];
        for test in tests {
            let state = State::new(test.0);
            let res = lit(state, test.2);
            assert_eq!(res.is_ok(), test.3, "test case: {:?}", test);
            match res {
                Ok((state, span)) => {
                    assert_eq!(state.position(), test.2.len());
                    assert_eq!(span, Span::new(0, test.2.len()));
                }
                Err(state) => assert_eq!(state.position(), test.1),
            }
        }
    }

    #[test]
    fn literal_case_folding() {
        let (state, _) = State::new("HeLLo")
            .match_literal(&[0x68, 0x65, 0x6c, 0x6c, 0x6f], Case::Insensitive)
            .unwrap();
        assert_eq!(state.position(), 5);

        assert!(State::new("HeLLo")
            .match_literal(&[0x68, 0x65, 0x6c, 0x6c, 0x6f], Case::Sensitive)
            .is_err());
        // only ASCII letters fold
        assert!(State::new("[")
            .match_literal(&[u32::from(b'{')], Case::Insensitive)
            .is_err());
    }

    #[test]
    fn ordered_choice_prefers_first() {
        let state = State::new("ab");
        let (state, span) = state
            .match_choice(&[&|s| lit(s, "ab"), &|s| lit(s, "a")])
            .unwrap();
        assert_eq!(span, Span::new(0, 2));
        assert_eq!(state.position(), 2);

        let state = State::new("ab");
        let (state, span) = state
            .match_choice(&[&|s| lit(s, "a"), &|s| lit(s, "ab")])
            .unwrap();
        assert_eq!(span, Span::new(0, 1));
        assert_eq!(state.position(), 1);
    }

    #[test]
    fn choice_alternatives_start_from_same_position() {
        let state = State::new("ac");
        let res = state.match_choice(&[
            &|s| {
                s.match_sequence(|s| {
                    let (s, _) = lit(s, "a")?;
                    lit(s, "b")
                })
            },
            &|s| lit(s, "ac"),
        ]);
        let (state, span) = res.unwrap();
        assert_eq!(span, Span::new(0, 2));
        assert_eq!(state.position(), 2);
    }

    #[test]
    fn failed_sequence_restores_cursor() {
        let state = State::new("ac");
        let state = state
            .match_sequence(|s| {
                let (s, _) = lit(s, "a")?;
                lit(s, "b")
            })
            .unwrap_err();
        assert_eq!(state.position(), 0);
        assert_eq!(state.failure().position, 1);
        assert_eq!(
            state.failure().expected,
            vec![Expected::Literal(vec![u32::from(b'b')])]
        );
    }

    #[test]
    fn repetition_bounds() {
        let tests = vec![
            ("x", None),
            ("xx", Some(2)),
            ("xxx", Some(3)),
            ("xxxx", Some(3)),
        ];
        for (input, expected) in tests {
            let res = State::new(input).match_repetition(2, Some(3), |s| lit(s, "x"));
            match (res, expected) {
                (Ok((state, items)), Some(n)) => {
                    assert_eq!(items.len(), n, "input: {}", input);
                    assert_eq!(state.position(), n, "input: {}", input);
                }
                (Err(state), None) => assert_eq!(state.position(), 0),
                (res, _) => panic!("input: {}, unexpected result: {:?}", input, res.is_ok()),
            }
        }
    }

    #[test]
    fn repetition_stops_on_zero_width_match() {
        let (state, items) = State::new("abc")
            .match_repetition(0, None, |s| s.match_empty())
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(state.position(), 0);

        // Mandatory iterations still run so `min` can be met.
        let (_, items) = State::new("")
            .match_repetition(3, None, |s| s.match_empty())
            .unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn optional_never_fails() {
        let (state, value) = State::new("b").match_optional(|s| lit(s, "a")).unwrap();
        assert!(value.is_none());
        assert_eq!(state.position(), 0);

        let (state, value) = State::new("a").match_optional(|s| lit(s, "a")).unwrap();
        assert_eq!(value, Some(Span::new(0, 1)));
        assert_eq!(state.position(), 1);
    }

    #[test]
    fn end_of_input() {
        assert!(State::new("").match_end().is_ok());
        let state = State::new("x").match_end().unwrap_err();
        assert_eq!(state.into_failure().expected, vec![Expected::EndOfInput]);
    }

    #[test]
    fn match_unit_with_predicate() {
        let digits: Vec<char> = "7a".chars().collect();
        let state = State::new(digits.as_slice());
        let (state, d) = state
            .match_unit(Expected::named("digit"), |c| c.to_digit(10))
            .unwrap();
        assert_eq!(d, 7);
        let state = state
            .match_unit(Expected::named("digit"), |c| c.to_digit(10))
            .unwrap_err();
        assert_eq!(state.position(), 1);
        assert_eq!(state.into_failure().to_string(), "expected digit at position 1");
    }
}
