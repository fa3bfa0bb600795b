//! Runs a type model directly against input using the engine primitives.

use parsegen::{Input, Parsed, Span, State};

use crate::canon::NodeRef;
use crate::types::{Leaf, Shape, TypeModel};

/// A matched instance of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub ty: NodeRef,
    pub span: Span,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// The index of the variant that matched first.
    Sum { variant: usize, value: Box<Tree> },
    Product(Vec<Tree>),
    Container(Vec<Tree>),
    Leaf,
    Alias(Box<Tree>),
}

impl Tree {
    /// The text this tree matched, for `str` input.
    pub fn as_str<'a>(&self, input: &'a str) -> &'a str {
        self.span.as_str(input)
    }

    /// Depth-first search for the first subtree of type `ty`.
    pub fn find(&self, ty: NodeRef) -> Option<&Tree> {
        if self.ty == ty {
            return Some(self);
        }
        match &self.value {
            Value::Sum { value, .. } | Value::Alias(value) => value.find(ty),
            Value::Product(items) | Value::Container(items) => {
                items.iter().find_map(|item| item.find(ty))
            }
            Value::Leaf => None,
        }
    }
}

pub struct Matcher<'m> {
    model: &'m TypeModel,
}

impl<'m> Matcher<'m> {
    pub fn new(model: &'m TypeModel) -> Self {
        Matcher { model }
    }

    pub fn match_type<'a, I>(&self, state: State<'a, I>, ty: NodeRef) -> Parsed<'a, I, Tree>
    where
        I: Input + ?Sized,
        I::Unit: Into<u32>,
    {
        let start = state.position();
        let (state, value) = match &self.model.get(ty).shape {
            Shape::Sum(variants) => state.match_choice_by(variants.len(), |s, idx| {
                let (s, tree) = self.match_type(s, variants[idx].ty)?;
                Ok((
                    s,
                    Value::Sum {
                        variant: idx,
                        value: Box::new(tree),
                    },
                ))
            })?,
            Shape::Product(fields) => state.match_sequence(|mut s| {
                let mut items = Vec::with_capacity(fields.len());
                for field in fields {
                    let (next, tree) = self.match_type(s, field.ty)?;
                    s = next;
                    items.push(tree);
                }
                Ok((s, Value::Product(items)))
            })?,
            Shape::Container(container) => {
                let min = container.min as usize;
                let max = container.max.map(|max| max as usize);
                let (s, items) =
                    state.match_repetition(min, max, |s| self.match_type(s, container.element))?;
                (s, Value::Container(items))
            }
            Shape::Leaf(Leaf::Literal(literal)) => {
                let (s, _) = state.match_literal(&literal.units, literal.case)?;
                (s, Value::Leaf)
            }
            Shape::Leaf(Leaf::Prose(_)) => {
                let (s, _) = state.match_empty()?;
                (s, Value::Leaf)
            }
            Shape::Alias(target) => {
                let (s, tree) = self.match_type(state, *target)?;
                (s, Value::Alias(Box::new(tree)))
            }
        };
        let span = Span::new(start, state.position());
        Ok((state, Tree { ty, span, value }))
    }
}
