//! Rendering a compiled grammar as Rust types and `parsegen::Parse`
//! implementations.
//!
//! Every entry of the type model becomes one type. Rules are boxed where
//! they are embedded in another type, which keeps recursive grammars finite.

use std::collections::HashMap;

use abnf::{Compiled, Container, ContainerKind, Leaf, NodeRef, Shape, TypeDef};
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use syn::{DeriveInput, Generics, Ident, LitStr};

use crate::attrs::{grammar_from_ast, Source};
use crate::error::Result;
use crate::naming::Scope;

pub fn generate(ast: &DeriveInput) -> Result<TokenStream> {
    let loaded = grammar_from_ast(ast)?;
    let generator = Generator::new(&loaded.compiled, &ast.ident);

    let types = generator.generate_types();
    let rules = generator.generate_rule_enum();
    let parser = generator.generate_parser_impl(&ast.ident, &ast.generics);
    // Rebuild when the grammar file changes.
    let tracked = match &loaded.source {
        Source::File(path) => {
            let path = LitStr::new(&path.to_string_lossy(), proc_macro2::Span::call_site());
            quote! { const _: &str = include_str!(#path); }
        }
        Source::Inline => quote! {},
    };

    Ok(quote! {
        #tracked
        #types
        #rules
        #parser
    })
}

struct Generator<'c> {
    compiled: &'c Compiled,
    idents: HashMap<NodeRef, Ident>,
}

impl<'c> Generator<'c> {
    fn new(compiled: &'c Compiled, parser: &Ident) -> Self {
        let mut scope = Scope::new();
        for reserved in ["Rules", "Self", "I"] {
            scope.reserve(reserved);
        }
        scope.reserve(&parser.to_string());
        let idents = compiled
            .model()
            .iter()
            .map(|(ty, def)| (ty, scope.type_ident(&def.name)))
            .collect();
        Generator { compiled, idents }
    }

    fn ident(&self, ty: NodeRef) -> &Ident {
        &self.idents[&ty]
    }

    /// The type used to embed `ty` in another type.
    fn embedded(&self, ty: NodeRef) -> TokenStream {
        let ident = self.ident(ty);
        match ty {
            NodeRef::Rule(_) => quote! { ::std::boxed::Box<#ident> },
            NodeRef::Inner(_) => quote! { #ident },
        }
    }

    /// Wrap a parsed `value` of type `ty` for embedding.
    fn embed(&self, ty: NodeRef, value: TokenStream) -> TokenStream {
        match ty {
            NodeRef::Rule(_) => quote! { ::std::boxed::Box::new(#value) },
            NodeRef::Inner(_) => value,
        }
    }

    fn parse_call(&self, ty: NodeRef) -> TokenStream {
        let ident = self.ident(ty);
        quote! { <#ident as parsegen::Parse<I>>::parse_state(s) }
    }

    fn generate_types(&self) -> TokenStream {
        let types = self
            .compiled
            .model()
            .iter()
            .map(|(ty, def)| self.generate_type(ty, def));
        quote! { #( #types )* }
    }

    fn doc(&self, ty: NodeRef, def: &TypeDef) -> String {
        match ty {
            NodeRef::Rule(id) => {
                let rule = self.compiled.grammar().rule(id);
                format!(" `{} = {}`", rule.name, rule.body)
            }
            NodeRef::Inner(_) => format!(" `{}`", def.name),
        }
    }

    fn generate_type(&self, ty: NodeRef, def: &TypeDef) -> TokenStream {
        let ident = self.ident(ty);
        let doc = self.doc(ty, def);
        let (decl, body) = match &def.shape {
            Shape::Sum(variants) => {
                let mut scope = Scope::new();
                scope.reserve("Self");
                let names: Vec<Ident> = variants.iter().map(|v| scope.type_ident(&v.name)).collect();
                let decls = variants.iter().zip(&names).map(|(variant, name)| {
                    let embedded = self.embedded(variant.ty);
                    quote! { #name(#embedded) }
                });
                let arms = variants.iter().zip(&names).enumerate().map(|(idx, (variant, name))| {
                    let call = self.parse_call(variant.ty);
                    let value = self.embed(variant.ty, quote! { v });
                    quote! { #idx => #call.map(|(s, v)| (s, Self::#name(#value))), }
                });
                let count = variants.len();
                (
                    quote! { pub enum #ident { #( #decls ),* } },
                    quote! {
                        state.match_choice_by(#count, |s, idx| match idx {
                            #( #arms )*
                            _ => ::std::result::Result::Err(s),
                        })
                    },
                )
            }
            Shape::Product(fields) => {
                let mut scope = Scope::new();
                let names: Vec<Ident> = fields.iter().map(|f| scope.field_ident(&f.name)).collect();
                let bindings: Vec<Ident> = (0..fields.len()).map(|i| format_ident!("field_{}", i)).collect();
                let decls = fields.iter().zip(&names).map(|(field, name)| {
                    let embedded = self.embedded(field.ty);
                    quote! { pub #name: #embedded }
                });
                let steps = fields.iter().zip(&bindings).map(|(field, binding)| {
                    let call = self.parse_call(field.ty);
                    quote! { let (s, #binding) = #call?; }
                });
                let inits = fields.iter().zip(&names).zip(&bindings).map(|((field, name), binding)| {
                    let value = self.embed(field.ty, quote! { #binding });
                    quote! { #name: #value }
                });
                (
                    quote! { pub struct #ident { #( #decls ),* } },
                    quote! {
                        state.match_sequence(|s| {
                            #( #steps )*
                            ::std::result::Result::Ok((s, Self { #( #inits ),* }))
                        })
                    },
                )
            }
            Shape::Container(container) => self.generate_container(ident, container),
            Shape::Leaf(Leaf::Literal(literal)) => {
                let units = literal.units.iter().map(|&unit| Literal::u32_suffixed(unit));
                let case = match literal.case {
                    abnf::Case::Sensitive => quote! { parsegen::Case::Sensitive },
                    abnf::Case::Insensitive => quote! { parsegen::Case::Insensitive },
                };
                (
                    quote! { pub struct #ident { pub span: parsegen::Span } },
                    quote! {
                        state
                            .match_literal(&[#( #units ),*], #case)
                            .map(|(s, span)| (s, Self { span }))
                    },
                )
            }
            Shape::Leaf(Leaf::Prose(_)) => (
                quote! { pub struct #ident { pub span: parsegen::Span } },
                quote! { state.match_empty().map(|(s, span)| (s, Self { span })) },
            ),
            Shape::Alias(target) => {
                let embedded = self.embedded(*target);
                let call = self.parse_call(*target);
                let value = self.embed(*target, quote! { v });
                (
                    quote! { pub struct #ident(pub #embedded); },
                    quote! {
                        let s = state;
                        #call.map(|(s, v)| (s, Self(#value)))
                    },
                )
            }
        };

        quote! {
            #[doc = #doc]
            #[derive(Debug, Clone, PartialEq, Eq)]
            #decl

            impl<I> parsegen::Parse<I> for #ident
            where
                I: parsegen::Input + ?::core::marker::Sized,
                I::Unit: ::std::convert::Into<u32>,
            {
                fn parse_state<'a>(state: parsegen::State<'a, I>) -> parsegen::Parsed<'a, I, Self> {
                    #body
                }
            }
        }
    }

    fn generate_container(&self, ident: &Ident, container: &Container) -> (TokenStream, TokenStream) {
        let call = self.parse_call(container.element);
        match container.kind() {
            ContainerKind::Optional => {
                let embedded = self.embedded(container.element);
                let value = match container.element {
                    NodeRef::Rule(_) => quote! { v.map(::std::boxed::Box::new) },
                    NodeRef::Inner(_) => quote! { v },
                };
                (
                    quote! { pub struct #ident(pub ::std::option::Option<#embedded>); },
                    quote! {
                        state
                            .match_optional(|s| #call)
                            .map(|(s, v)| (s, Self(#value)))
                    },
                )
            }
            _ => {
                let element = self.ident(container.element);
                let min = container.min as usize;
                let max = match container.max {
                    Some(max) => {
                        let max = max as usize;
                        quote! { ::std::option::Option::Some(#max) }
                    }
                    None => quote! { ::std::option::Option::None },
                };
                (
                    quote! { pub struct #ident(pub ::std::vec::Vec<#element>); },
                    quote! {
                        state
                            .match_repetition(#min, #max, |s| #call)
                            .map(|(s, v)| (s, Self(v)))
                    },
                )
            }
        }
    }

    /// One variant per rule, in grammar order.
    fn generate_rule_enum(&self) -> TokenStream {
        let rules = self.rule_idents();
        quote! {
            #[derive(Copy, Debug, Eq, Clone, PartialEq)]
            pub enum Rules {
                #( #rules ),*
            }
        }
    }

    fn rule_idents(&self) -> Vec<&Ident> {
        self.compiled
            .grammar()
            .rules()
            .indices()
            .map(|id| self.ident(NodeRef::Rule(id)))
            .collect()
    }

    fn generate_parser_impl(&self, name: &Ident, generics: &Generics) -> TokenStream {
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        let arms = self.rule_idents().into_iter().map(|rule| {
            quote! {
                Rules::#rule => parsegen::parse::<#rule, str>(input).map(|(_, consumed)| consumed)
            }
        });

        quote! {
            impl #impl_generics parsegen::Parser<Rules> for #name #ty_generics #where_clause {
                fn recognize(rule: Rules, input: &str) -> ::std::result::Result<usize, parsegen::Failure> {
                    match rule {
                        #( #arms ),*
                    }
                }
            }
        }
    }
}
