//! ABNF grammars as parsers.
//!
//! Grammars can be compiled at runtime with [`compile`] or [`compile_file`]
//! and matched through [`Compiled::parse`], or turned into Rust types at
//! build time with `#[derive(Parser)]`:
//!
//! ```ignore
//! use abnfgen::Parser;
//!
//! #[derive(Parser)]
//! #[abnf_file = "grammars/config.abnf"]
//! pub struct ConfigParser;
//! ```
//!
//! Generated code names the `parsegen` crate directly, so crates using the
//! derive depend on it as well.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

pub use abnf::{
    compile, compile_with, CompileError, CompileOptions, Compiled, NodeRef, ProsePolicy, RuleId,
    Tree, Value,
};
pub use abnf_derive::Parser;
pub use parsegen::{self, Case, Failure, Parse, Parser, Span};

/// Read and compile the grammar at `path`.
pub fn compile_file(path: impl AsRef<Path>, options: &CompileOptions) -> anyhow::Result<Compiled> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read grammar {}", path.display()))?;
    let compiled = compile_with(&source, options)
        .with_context(|| format!("failed to compile grammar {}", path.display()))?;
    debug!(path = %path.display(), types = compiled.model().len(), "compiled grammar file");
    Ok(compiled)
}
