//! Derive parsers from ABNF grammars.
//!
//! ```ignore
//! #[derive(Parser)]
//! #[abnf_inline = "greeting = \"hello\" SP name\nname = 1*ALPHA\n"]
//! struct Greeter;
//! ```
//!
//! expands to one type per rule and per anonymous sub-expression of the
//! grammar, each implementing `parsegen::Parse`, plus a `Rules` enum and an
//! implementation of `parsegen::Parser<Rules>` for `Greeter`. The generated
//! code refers to the `parsegen` crate, which must be a dependency of the
//! crate using the derive.

use syn::{parse_macro_input, DeriveInput};

mod attrs;
mod error;
mod generate;
mod naming;

#[proc_macro_derive(Parser, attributes(abnf_file, abnf_inline, abnf_case, abnf_prose))]
pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match generate::generate(&ast) {
        Ok(expanded) => expanded.into(),
        Err(err) => syn::Error::new_spanned(&ast.ident, err)
            .to_compile_error()
            .into(),
    }
}
