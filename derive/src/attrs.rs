//! Reading the grammar and its options from derive attributes.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use abnf::{Case, CompileOptions, Compiled, ProsePolicy};
use syn::{DeriveInput, Lit, Meta, MetaNameValue};

use crate::error::{DeriveError, Result};

pub const ABNF_FILE_ATTR: &str = "abnf_file";
pub const ABNF_INLINE_ATTR: &str = "abnf_inline";
pub const ABNF_CASE_ATTR: &str = "abnf_case";
pub const ABNF_PROSE_ATTR: &str = "abnf_prose";

/// Where the grammar text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Inline,
    File(PathBuf),
}

/// A compiled grammar plus where it was read from.
#[derive(Debug)]
pub struct Loaded {
    pub compiled: Compiled,
    pub source: Source,
}

fn name_values(ast: &DeriveInput) -> Result<Vec<MetaNameValue>> {
    let known = [ABNF_FILE_ATTR, ABNF_INLINE_ATTR, ABNF_CASE_ATTR, ABNF_PROSE_ATTR];
    let mut values = Vec::new();
    for attr in &ast.attrs {
        if !known.iter().any(|name| attr.path.is_ident(name)) {
            continue;
        }
        match attr.parse_meta()? {
            Meta::NameValue(val) => values.push(val),
            other => {
                return Err(syn::Error::new_spanned(other, "expected `name = \"value\"`").into())
            }
        }
    }
    Ok(values)
}

fn string_value(val: &MetaNameValue) -> Result<String> {
    match &val.lit {
        Lit::Str(s) => Ok(s.value()),
        _ => Err(DeriveError::NotAString(path_name(val))),
    }
}

fn path_name(val: &MetaNameValue) -> String {
    val.path
        .get_ident()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Options given through `abnf_case` and `abnf_prose`.
pub fn options_from_ast(ast: &DeriveInput) -> Result<CompileOptions> {
    let mut options = CompileOptions::default();
    for val in name_values(ast)? {
        if val.path.is_ident(ABNF_CASE_ATTR) {
            let case = match string_value(&val)?.as_str() {
                "sensitive" => Case::Sensitive,
                "insensitive" => Case::Insensitive,
                other => return Err(invalid(ABNF_CASE_ATTR, other, "`sensitive`, `insensitive`")),
            };
            options = options.char_val_case(case);
        } else if val.path.is_ident(ABNF_PROSE_ATTR) {
            let prose = match string_value(&val)?.as_str() {
                "reject" => ProsePolicy::Reject,
                "match" => ProsePolicy::AlwaysMatch,
                other => return Err(invalid(ABNF_PROSE_ATTR, other, "`reject`, `match`")),
            };
            options = options.prose(prose);
        }
    }
    Ok(options)
}

fn invalid(attr: &str, value: &str, expected: &'static str) -> DeriveError {
    DeriveError::InvalidOption {
        attr: attr.to_owned(),
        value: value.to_owned(),
        expected,
    }
}

/// Load and compile the grammar named by the derive attributes.
///
/// There must be exactly one source attribute. File paths are relative to
/// the crate being compiled.
pub fn grammar_from_ast(ast: &DeriveInput) -> Result<Loaded> {
    let sources: Vec<MetaNameValue> = name_values(ast)?
        .into_iter()
        .filter(|val| val.path.is_ident(ABNF_FILE_ATTR) || val.path.is_ident(ABNF_INLINE_ATTR))
        .collect();

    let source_attr = match sources.as_slice() {
        [] => return Err(DeriveError::MissingGrammarSource),
        [one] => one,
        _ => return Err(DeriveError::MultipleGrammarSources),
    };

    let value = string_value(source_attr)?;
    let (text, source) = if source_attr.path.is_ident(ABNF_FILE_ATTR) {
        let root = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
        let path = Path::new(&root).join(&value);
        let text = fs::read_to_string(&path).map_err(|e| DeriveError::ReadFile {
            path: path.to_string_lossy().into_owned(),
            message: e.to_string(),
        })?;
        (text, Source::File(path))
    } else {
        (value, Source::Inline)
    };

    let options = options_from_ast(ast)?;
    let compiled = abnf::compile_with(&text, &options)?;
    Ok(Loaded { compiled, source })
}
