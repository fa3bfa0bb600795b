//! Turning grammar names into Rust identifiers.

use std::collections::HashSet;

use proc_macro2::Span;
use syn::Ident;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

fn words(name: &str) -> impl Iterator<Item = &str> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
}

/// `char-val` becomes `CharVal`, `DIGIT` becomes `Digit` and `0` becomes
/// `V0`.
pub fn type_name(name: &str) -> String {
    let mut out = String::new();
    for word in words(name) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars.map(|c| c.to_ascii_lowercase()));
        }
    }
    match out.chars().next() {
        None => "Empty".to_owned(),
        Some(c) if c.is_ascii_digit() => format!("V{}", out),
        Some(_) => out,
    }
}

/// `char-val` becomes `char_val`, `type` becomes `type_` and `0` becomes
/// `_0`.
pub fn field_name(name: &str) -> String {
    let out = words(name)
        .map(|word| word.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_");
    match out.chars().next() {
        None => "field".to_owned(),
        Some(c) if c.is_ascii_digit() => format!("_{}", out),
        Some(_) if KEYWORDS.contains(&out.as_str()) => format!("{}_", out),
        Some(_) => out,
    }
}

/// Hands out identifiers that are unique within one scope.
#[derive(Debug, Default)]
pub struct Scope {
    used: HashSet<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as taken without producing an identifier for it.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_owned());
    }

    /// An identifier for `name`, numbered if `name` is already taken.
    /// `separator` goes between the name and the number.
    pub fn ident(&mut self, name: String, separator: &str) -> Ident {
        let mut candidate = name.clone();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{}{}{}", name, separator, n);
            n += 1;
        }
        self.used.insert(candidate.clone());
        Ident::new(&candidate, Span::call_site())
    }

    pub fn type_ident(&mut self, name: &str) -> Ident {
        self.ident(type_name(name), "")
    }

    pub fn field_ident(&mut self, name: &str) -> Ident {
        self.ident(field_name(name), "_")
    }
}
