//! Canonical form of a resolved grammar.
//!
//! Every rule body is lowered into [`Node`]s: groups disappear, options
//! become `{0,1}` repetitions, numeric ranges are expanded into
//! alternations of single units, and single-member alternations,
//! concatenations and `{1,1}` repetitions collapse into their member.
//! Anonymous nodes are interned, so structurally equal sub-expressions
//! anywhere in the grammar share one [`NodeId`]. Rule bodies are never
//! interned: a rule is identified by its name.

use index_vec::{IndexSlice, IndexVec};
use parsegen::Case;
use tracing::trace;

use crate::ast::{Alternation, CharVal, Concatenation, Element, NumVal, Repetition};
use crate::error::{CompileError, DefinitionError};
use crate::grammar::{Grammar, RuleId};
use crate::options::{CompileOptions, ProsePolicy};
use crate::pool::Pool;
use crate::range::{self, Expansion};

index_vec::define_index_type! { pub struct NodeId = usize; }

/// A reference to either a named rule or an anonymous node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRef {
    Rule(RuleId),
    Inner(NodeId),
}

/// A literal run of units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub units: Vec<u32>,
    pub case: Case,
}

impl Literal {
    /// A single unit compared exactly.
    pub fn unit(unit: u32) -> Self {
        Literal {
            units: vec![unit],
            case: Case::Sensitive,
        }
    }

    /// Case folding only affects ASCII letters, so a literal without any
    /// is stored as case-sensitive. `"0"` and `%x30` become the same node.
    pub fn text(text: &str, case: Case) -> Self {
        let has_letters = text.chars().any(|c| c.is_ascii_alphabetic());
        Literal {
            units: text.chars().map(u32::from).collect(),
            case: if has_letters { case } else { Case::Sensitive },
        }
    }

    /// The literal as text, if every unit is a `char`.
    pub fn as_string(&self) -> Option<String> {
        self.units.iter().map(|&u| char::from_u32(u)).collect()
    }
}

/// A canonical node. Children are canonical references, so a node is its
/// own structural key: equal nodes have equal shapes all the way down.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// Ordered choice, at least two members.
    Alternation(Vec<NodeRef>),
    /// Sequence, at least two members.
    Concatenation(Vec<NodeRef>),
    Repetition {
        min: u32,
        max: Option<u32>,
        element: NodeRef,
    },
    Literal(Literal),
    /// Free text that matches without consuming input.
    Prose(String),
}

impl Node {
    /// Short name of the node's shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Alternation(_) => "alternation",
            Node::Concatenation(_) => "concatenation",
            Node::Repetition { .. } => "repetition",
            Node::Literal(_) => "literal",
            Node::Prose(_) => "prose",
        }
    }

    /// Direct children, in order.
    pub fn children(&self) -> &[NodeRef] {
        match self {
            Node::Alternation(members) | Node::Concatenation(members) => members,
            Node::Repetition { element, .. } => std::slice::from_ref(element),
            Node::Literal(_) | Node::Prose(_) => &[],
        }
    }
}

/// A rule body either has its own node or is just another reference, as
/// in `a = b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleBody {
    Node(Node),
    Alias(NodeRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRule {
    pub name: String,
    pub body: RuleBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalGrammar {
    rules: IndexVec<RuleId, CanonicalRule>,
    nodes: IndexVec<NodeId, Node>,
}

impl CanonicalGrammar {
    /// Lower every rule of `grammar`, in rule order. Node ids are assigned
    /// children first, so the result only depends on the grammar text.
    pub fn build(grammar: &Grammar, options: &CompileOptions) -> Result<Self, CompileError> {
        let mut lowerer = Lowerer {
            grammar,
            options,
            rule: "",
            pool: Pool::new(),
        };
        let mut rules = IndexVec::with_capacity(grammar.len());
        for rule in grammar.rules() {
            lowerer.rule = rule.name.as_str();
            let body = match lowerer.alternation(&rule.body)? {
                Lowered::Node(node) => RuleBody::Node(node),
                Lowered::Ref(node_ref) => RuleBody::Alias(node_ref),
            };
            rules.push(CanonicalRule {
                name: rule.name.to_string(),
                body,
            });
        }
        Ok(CanonicalGrammar {
            rules,
            nodes: lowerer.pool.into_vec(),
        })
    }

    pub fn rules(&self) -> &IndexSlice<RuleId, [CanonicalRule]> {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &CanonicalRule {
        &self.rules[id]
    }

    pub fn nodes(&self) -> &IndexSlice<NodeId, [Node]> {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// The node behind a reference, following rule aliases. `None` only for
    /// a cycle of aliases such as `a = b` and `b = a`.
    pub fn resolve(&self, node_ref: NodeRef) -> Option<&Node> {
        let mut current = node_ref;
        for _ in 0..=self.rules.len() {
            match current {
                NodeRef::Inner(id) => return Some(&self.nodes[id]),
                NodeRef::Rule(id) => match &self.rules[id].body {
                    RuleBody::Node(node) => return Some(node),
                    RuleBody::Alias(next) => current = *next,
                },
            }
        }
        None
    }
}

enum Lowered {
    Node(Node),
    Ref(NodeRef),
}

struct Lowerer<'g> {
    grammar: &'g Grammar,
    options: &'g CompileOptions,
    /// Name of the rule being lowered, for diagnostics.
    rule: &'g str,
    pool: Pool<NodeId, Node>,
}

impl<'g> Lowerer<'g> {
    fn intern(&mut self, lowered: Lowered) -> NodeRef {
        match lowered {
            Lowered::Ref(node_ref) => node_ref,
            Lowered::Node(node) => NodeRef::Inner(self.intern_node(node)),
        }
    }

    fn intern_node(&mut self, node: Node) -> NodeId {
        let kind = node.kind();
        let (id, new) = self.pool.intern(node);
        if new {
            trace!(id = id.index(), kind, rule = self.rule, "interned node");
        }
        id
    }

    fn alternation(&mut self, alternation: &Alternation) -> Result<Lowered, CompileError> {
        let mut members = alternation
            .0
            .iter()
            .map(|concatenation| self.concatenation(concatenation))
            .collect::<Result<Vec<_>, _>>()?;
        if members.len() == 1 {
            return Ok(members.remove(0));
        }
        let members = members.into_iter().map(|m| self.intern(m)).collect();
        Ok(Lowered::Node(Node::Alternation(members)))
    }

    fn concatenation(&mut self, concatenation: &Concatenation) -> Result<Lowered, CompileError> {
        let mut members = concatenation
            .0
            .iter()
            .map(|repetition| self.repetition(repetition))
            .collect::<Result<Vec<_>, _>>()?;
        if members.len() == 1 {
            return Ok(members.remove(0));
        }
        let members = members.into_iter().map(|m| self.intern(m)).collect();
        Ok(Lowered::Node(Node::Concatenation(members)))
    }

    fn repetition(&mut self, repetition: &Repetition) -> Result<Lowered, CompileError> {
        let element = self.element(&repetition.element)?;
        match repetition.repeat {
            Some(repeat) if !repeat.is_once() => {
                let element = self.intern(element);
                Ok(Lowered::Node(Node::Repetition {
                    min: repeat.min,
                    max: repeat.max,
                    element,
                }))
            }
            _ => Ok(element),
        }
    }

    fn element(&mut self, element: &Element) -> Result<Lowered, CompileError> {
        match element {
            Element::RuleRef(name) => match self.grammar.lookup(name.as_str()) {
                Some(id) => Ok(Lowered::Ref(NodeRef::Rule(id))),
                None => unreachable!("reference to `{}` survived resolution", name),
            },
            Element::Group(inner) => self.alternation(inner),
            Element::Option(inner) => {
                let inner = self.alternation(inner)?;
                let element = self.intern(inner);
                Ok(Lowered::Node(Node::Repetition {
                    min: 0,
                    max: Some(1),
                    element,
                }))
            }
            Element::CharVal(val) => Ok(Lowered::Node(Node::Literal(self.char_val(val)))),
            Element::NumVal(val) => self.num_val(val),
            Element::ProseVal(text) => match self.options.prose {
                ProsePolicy::AlwaysMatch => Ok(Lowered::Node(Node::Prose(text.clone()))),
                ProsePolicy::Reject => Err(DefinitionError::UnsupportedProse {
                    rule: self.rule.to_owned(),
                    text: text.clone(),
                }
                .into()),
            },
        }
    }

    fn char_val(&self, val: &CharVal) -> Literal {
        Literal::text(&val.text, val.case.unwrap_or(self.options.char_val_case))
    }

    fn num_val(&mut self, val: &NumVal) -> Result<Lowered, CompileError> {
        let expansion = range::expand(self.rule, &val.value, self.options.max_range_len)?;
        let node = match expansion {
            Expansion::Unit(unit) => Node::Literal(Literal::unit(unit)),
            Expansion::Sequence(units) => {
                Node::Concatenation(units.into_iter().map(|unit| self.unit(unit)).collect())
            }
            Expansion::Choice { lo, hi } => {
                Node::Alternation((lo..=hi).map(|unit| self.unit(unit)).collect())
            }
        };
        Ok(Lowered::Node(node))
    }

    fn unit(&mut self, unit: u32) -> NodeRef {
        NodeRef::Inner(self.intern_node(Node::Literal(Literal::unit(unit))))
    }
}
