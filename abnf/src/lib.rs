//! ABNF (RFC 5234) grammar compiler.
//!
//! Source text goes through a fixed pipeline:
//!
//! 1. [`lexer`] splits it into tokens.
//! 2. [`parser`] builds a [`GrammarDocument`], using the `parsegen` engine.
//! 3. [`Grammar::resolve`] merges `=/` definitions, supplies core rules and
//!    checks references.
//! 4. [`CanonicalGrammar::build`] expands numeric ranges and interns every
//!    anonymous sub-expression, so equal sub-expressions share one node.
//! 5. [`TypeModel::build`] gives every rule and node a data shape: sum,
//!    product, container or leaf.
//!
//! The result can drive a matcher directly ([`Compiled::parse`]) or be
//! rendered into Rust types by the derive crate.

use parsegen::{Failure, Input, State};
use tracing::debug;

pub mod analysis;
pub mod ast;
pub mod canon;
mod core_rules;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod matcher;
pub mod names;
mod options;
pub mod parser;
mod pool;
pub mod range;
pub mod types;

pub use ast::GrammarDocument;
pub use canon::{CanonicalGrammar, Literal, Node, NodeId, NodeRef};
pub use core_rules::CORE_RULES;
pub use error::{CompileError, DefinitionError, LexError, ParseError, RangeExpansionError};
pub use grammar::{Grammar, RuleId};
pub use matcher::{Tree, Value};
pub use options::{CompileOptions, ProsePolicy};
pub use parsegen::Case;
pub use types::{Container, ContainerKind, Field, Leaf, Shape, TypeDef, TypeModel, Variant};

/// Compile with default options.
pub fn compile(source: &str) -> error::Result<Compiled> {
    compile_with(source, &CompileOptions::default())
}

pub fn compile_with(source: &str, options: &CompileOptions) -> error::Result<Compiled> {
    let document = parser::parse(source)?;
    compile_document(&document, options)
}

/// Compile an already parsed document.
pub fn compile_document(
    document: &GrammarDocument,
    options: &CompileOptions,
) -> error::Result<Compiled> {
    let grammar = Grammar::resolve(document, options)?;
    debug!(rules = grammar.len(), "resolved grammar");

    let canonical = CanonicalGrammar::build(&grammar, options)?;
    debug!(nodes = canonical.nodes().len(), "canonicalized grammar");

    if options.reject_left_recursion {
        analysis::check_left_recursion(&canonical)?;
    }

    let model = TypeModel::build(&canonical);
    debug!(types = model.len(), "built type model");

    Ok(Compiled {
        grammar,
        canonical,
        model,
        options: options.clone(),
    })
}

/// A compiled grammar. Immutable, and safe to share between threads that
/// match different inputs.
#[derive(Debug, Clone)]
pub struct Compiled {
    grammar: Grammar,
    canonical: CanonicalGrammar,
    model: TypeModel,
    options: CompileOptions,
}

impl Compiled {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn canonical(&self) -> &CanonicalGrammar {
        &self.canonical
    }

    pub fn model(&self) -> &TypeModel {
        &self.model
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Find a rule by name, ignoring case.
    pub fn rule(&self, name: &str) -> Option<RuleId> {
        self.model.rule(name)
    }

    /// Match `rule` against a prefix of `input`. The tree's span tells how
    /// much was consumed.
    ///
    /// With `reject_left_recursion` disabled, a left recursive rule
    /// recurses until the stack overflows.
    pub fn parse<I>(&self, rule: RuleId, input: &I) -> Result<Tree, Failure>
    where
        I: Input + ?Sized,
        I::Unit: Into<u32>,
    {
        let matcher = matcher::Matcher::new(&self.model);
        match matcher.match_type(State::new(input), NodeRef::Rule(rule)) {
            Ok((_, tree)) => Ok(tree),
            Err(state) => Err(state.into_failure()),
        }
    }

    /// Match `rule` against the whole of `input`.
    pub fn parse_complete<I>(&self, rule: RuleId, input: &I) -> Result<Tree, Failure>
    where
        I: Input + ?Sized,
        I::Unit: Into<u32>,
    {
        let matcher = matcher::Matcher::new(&self.model);
        let (state, tree) = matcher
            .match_type(State::new(input), NodeRef::Rule(rule))
            .map_err(State::into_failure)?;
        let (_, ()) = state.match_end().map_err(State::into_failure)?;
        Ok(tree)
    }
}
