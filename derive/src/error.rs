use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeriveError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeriveError {
    #[error("no grammar source provided, add `#[abnf_inline = \"...\"]` or `#[abnf_file = \"...\"]`")]
    MissingGrammarSource,
    #[error("at most one grammar source can be provided")]
    MultipleGrammarSources,
    #[error("attribute `{0}` must be a string literal")]
    NotAString(String),
    #[error("invalid value `{value}` for `{attr}`, expected one of {expected}")]
    InvalidOption {
        attr: String,
        value: String,
        expected: &'static str,
    },
    #[error("read grammar file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("compile grammar: {0}")]
    Compile(#[from] abnf::CompileError),
    #[error("{0}")]
    Syn(String),
}

impl From<syn::Error> for DeriveError {
    fn from(e: syn::Error) -> DeriveError {
        DeriveError::Syn(e.to_string())
    }
}
