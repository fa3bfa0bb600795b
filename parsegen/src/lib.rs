//! Matching engine for ordered-choice (PEG style) parsers.
//!
//! Generated parsers and the ABNF parser itself are written against the
//! primitives on [`State`]: literals, sequences, ordered choice and bounded
//! repetition. A match attempt either succeeds with a new state and a value,
//! or fails with the state positioned exactly where the attempt started. The
//! furthest failure seen so far travels with the state so a caller can report
//! "expected X at position Y" once the whole parse has failed.

use std::fmt::Debug;

mod failure;
mod input;
mod position;
mod span;
mod state;

pub use failure::{Expected, Failure};
pub use input::Input;
pub use position::Location;
pub use span::Span;
pub use state::{Alternative, Case, Parsed, State};

pub trait ParserRule: Copy + Debug + Eq {}

impl<T: Copy + Debug + Eq> ParserRule for T {}

/// A parser that can recognize input starting from any of its rules.
pub trait Parser<R: ParserRule> {
    /// Match `rule` against the start of `input`, returning the number of
    /// bytes consumed.
    fn recognize(rule: R, input: &str) -> Result<usize, Failure>;
}

/// A node type that knows how to match itself.
pub trait Parse<I: Input + ?Sized>: Sized {
    fn parse_state<'a>(state: State<'a, I>) -> Parsed<'a, I, Self>;
}

/// Match `T` against a prefix of `input`. Returns the node and the number of
/// units consumed.
pub fn parse<T, I>(input: &I) -> Result<(T, usize), Failure>
where
    T: Parse<I>,
    I: Input + ?Sized,
{
    match T::parse_state(State::new(input)) {
        Ok((state, node)) => Ok((node, state.position())),
        Err(state) => Err(state.into_failure()),
    }
}

/// Match `T` against the whole of `input`.
pub fn parse_complete<T, I>(input: &I) -> Result<T, Failure>
where
    T: Parse<I>,
    I: Input + ?Sized,
{
    let (state, node) = T::parse_state(State::new(input)).map_err(State::into_failure)?;
    let (_, ()) = state.match_end().map_err(State::into_failure)?;
    Ok(node)
}
