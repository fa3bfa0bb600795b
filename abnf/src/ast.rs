//! The grammar document as written: rules, alternations, concatenations,
//! repetitions and elements, before any resolution or canonicalization.

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use itertools::Itertools;
use parsegen::{Case, Location};

use crate::error::CompileError;

/// A rule name. Names compare case-insensitively but keep their spelling.
#[derive(Debug, Clone, Eq)]
pub struct RuleName(pub String);

impl RuleName {
    /// The lookup key for this name.
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for RuleName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Hash for RuleName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// `=` or `=/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinedAs {
    Replace,
    Incremental,
}

impl Display for DefinedAs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DefinedAs::Replace => write!(f, "="),
            DefinedAs::Incremental => write!(f, "=/"),
        }
    }
}

/// Ordered choice between concatenations. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternation(pub Vec<Concatenation>);

/// A sequence of repetitions. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concatenation(pub Vec<Repetition>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repetition {
    /// Absent means exactly once.
    pub repeat: Option<Repeat>,
    pub element: Element,
}

/// Repetition bounds. `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Repeat {
    pub min: u32,
    pub max: Option<u32>,
}

impl Repeat {
    pub fn exactly(n: u32) -> Self {
        Repeat {
            min: n,
            max: Some(n),
        }
    }

    pub fn is_once(&self) -> bool {
        self.min == 1 && self.max == Some(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    RuleRef(RuleName),
    Group(Alternation),
    /// `[ ... ]`, i.e. zero or one of the inner alternation.
    Option(Alternation),
    CharVal(CharVal),
    NumVal(NumVal),
    /// Free text between angle brackets.
    ProseVal(String),
}

/// A quoted string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharVal {
    pub text: String,
    /// Set by the `%s` and `%i` prefixes. `None` follows the compile options.
    pub case: Option<Case>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Radix {
    Bin,
    Dec,
    Hex,
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Bin => 2,
            Radix::Dec => 10,
            Radix::Hex => 16,
        }
    }

    fn prefix(self) -> char {
        match self {
            Radix::Bin => 'b',
            Radix::Dec => 'd',
            Radix::Hex => 'x',
        }
    }

    fn write_value(self, f: &mut fmt::Formatter, value: u32) -> fmt::Result {
        match self {
            Radix::Bin => write!(f, "{:b}", value),
            Radix::Dec => write!(f, "{}", value),
            Radix::Hex => write!(f, "{:X}", value),
        }
    }
}

/// A numeric terminal, keeping the radix it was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumVal {
    pub radix: Radix,
    pub value: NumValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumValue {
    /// One value, or several joined with `.`.
    Sequence(Vec<u32>),
    /// Inclusive `lo-hi`.
    Range(u32, u32),
}

/// One `=` or `=/` definition, as it appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    pub name: RuleName,
    pub mode: DefinedAs,
    pub body: Alternation,
    pub location: Location,
}

/// All definitions of a grammar in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarDocument {
    pub rules: Vec<RuleDefinition>,
}

impl Alternation {
    /// Calls `f` for every rule referenced anywhere in this alternation.
    pub fn visit_rule_refs<'a>(&'a self, f: &mut impl FnMut(&'a RuleName)) {
        self.visit_repetitions(&mut |repetition| {
            if let Element::RuleRef(name) = &repetition.element {
                f(name)
            }
        });
    }

    /// Calls `f` for every repetition, outermost first.
    pub fn visit_repetitions<'a>(&'a self, f: &mut impl FnMut(&'a Repetition)) {
        for concatenation in &self.0 {
            for repetition in &concatenation.0 {
                f(repetition);
                match &repetition.element {
                    Element::Group(inner) | Element::Option(inner) => inner.visit_repetitions(f),
                    _ => {}
                }
            }
        }
    }
}

impl Display for Alternation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(" / "))
    }
}

impl Display for Concatenation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(" "))
    }
}

impl Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.max == Some(self.min) {
            return write!(f, "{}", self.min);
        }
        if self.min > 0 {
            write!(f, "{}", self.min)?;
        }
        write!(f, "*")?;
        if let Some(max) = self.max {
            write!(f, "{}", max)?;
        }
        Ok(())
    }
}

impl Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(repeat) = &self.repeat {
            write!(f, "{}", repeat)?;
        }
        write!(f, "{}", self.element)
    }
}

impl Display for CharVal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.case {
            Some(Case::Sensitive) => write!(f, "%s")?,
            Some(Case::Insensitive) => write!(f, "%i")?,
            None => {}
        }
        write!(f, "\"{}\"", self.text)
    }
}

impl Display for NumVal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%{}", self.radix.prefix())?;
        match &self.value {
            NumValue::Sequence(values) => {
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ".")?;
                    }
                    self.radix.write_value(f, *value)?;
                }
                Ok(())
            }
            NumValue::Range(lo, hi) => {
                self.radix.write_value(f, *lo)?;
                write!(f, "-")?;
                self.radix.write_value(f, *hi)
            }
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Element::RuleRef(name) => write!(f, "{}", name),
            Element::Group(inner) => write!(f, "( {} )", inner),
            Element::Option(inner) => write!(f, "[ {} ]", inner),
            Element::CharVal(val) => write!(f, "{}", val),
            Element::NumVal(val) => write!(f, "{}", val),
            Element::ProseVal(text) => write!(f, "<{}>", text),
        }
    }
}

impl Display for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.mode, self.body)
    }
}

impl Display for GrammarDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

impl FromStr for GrammarDocument {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(s)
    }
}
