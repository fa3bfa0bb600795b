//! The type model: one data shape per rule and per anonymous node.

use std::collections::HashMap;

use index_vec::{IndexSlice, IndexVec};

use crate::canon::{CanonicalGrammar, Literal, Node, NodeId, NodeRef, RuleBody};
use crate::grammar::RuleId;
use crate::names;

/// A named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Ordered choice between variants.
    Sum(Vec<Variant>),
    /// Fields matched in order.
    Product(Vec<Field>),
    Container(Container),
    Leaf(Leaf),
    /// A rule whose body is another rule, as in `a = b`.
    Alias(NodeRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub ty: NodeRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: NodeRef,
}

/// Between `min` and `max` elements. `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub element: NodeRef,
    pub min: u32,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// `[x]` or `*1x`.
    Optional,
    Fixed(u32),
    Bounded { min: u32, max: u32 },
    Unbounded { min: u32 },
}

impl Container {
    pub fn kind(&self) -> ContainerKind {
        match (self.min, self.max) {
            (0, Some(1)) => ContainerKind::Optional,
            (min, Some(max)) if min == max => ContainerKind::Fixed(min),
            (min, Some(max)) => ContainerKind::Bounded { min, max },
            (min, None) => ContainerKind::Unbounded { min },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    Literal(Literal),
    /// Matches without consuming input. The text is documentation only.
    Prose(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeModel {
    rules: IndexVec<RuleId, TypeDef>,
    inners: IndexVec<NodeId, TypeDef>,
    lookup: HashMap<String, RuleId>,
}

impl TypeModel {
    /// Derive one type per canonical node. Anonymous nodes come first so
    /// every type is built after the types it refers to.
    pub fn build(grammar: &CanonicalGrammar) -> Self {
        let inners: IndexVec<NodeId, TypeDef> = grammar
            .nodes()
            .iter_enumerated()
            .map(|(id, node)| TypeDef {
                name: names::inner_name(id, node),
                shape: shape(grammar, node),
            })
            .collect();
        let rules: IndexVec<RuleId, TypeDef> = grammar
            .rules()
            .iter()
            .map(|rule| TypeDef {
                name: rule.name.clone(),
                shape: match &rule.body {
                    RuleBody::Node(node) => shape(grammar, node),
                    RuleBody::Alias(node_ref) => Shape::Alias(*node_ref),
                },
            })
            .collect();
        let lookup = rules
            .iter_enumerated()
            .map(|(id, def)| (def.name.to_ascii_lowercase(), id))
            .collect();
        TypeModel {
            rules,
            inners,
            lookup,
        }
    }

    pub fn get(&self, ty: NodeRef) -> &TypeDef {
        match ty {
            NodeRef::Rule(id) => &self.rules[id],
            NodeRef::Inner(id) => &self.inners[id],
        }
    }

    /// Find a rule by name, ignoring case.
    pub fn rule(&self, name: &str) -> Option<RuleId> {
        self.lookup.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn rules(&self) -> &IndexSlice<RuleId, [TypeDef]> {
        &self.rules
    }

    pub fn inners(&self) -> &IndexSlice<NodeId, [TypeDef]> {
        &self.inners
    }

    /// Every type, rules first.
    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &TypeDef)> {
        let rules = self
            .rules
            .iter_enumerated()
            .map(|(id, def)| (NodeRef::Rule(id), def));
        let inners = self
            .inners
            .iter_enumerated()
            .map(|(id, def)| (NodeRef::Inner(id), def));
        rules.chain(inners)
    }

    pub fn len(&self) -> usize {
        self.rules.len() + self.inners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn shape(grammar: &CanonicalGrammar, node: &Node) -> Shape {
    match node {
        Node::Alternation(members) => Shape::Sum(
            names::member_labels(grammar, members)
                .into_iter()
                .zip(members)
                .map(|(name, &ty)| Variant { name, ty })
                .collect(),
        ),
        Node::Concatenation(members) => Shape::Product(
            names::member_labels(grammar, members)
                .into_iter()
                .zip(members)
                .map(|(name, &ty)| Field { name, ty })
                .collect(),
        ),
        Node::Repetition { min, max, element } => Shape::Container(Container {
            element: *element,
            min: *min,
            max: *max,
        }),
        Node::Literal(literal) => Shape::Leaf(Leaf::Literal(literal.clone())),
        Node::Prose(text) => Shape::Leaf(Leaf::Prose(text.clone())),
    }
}
