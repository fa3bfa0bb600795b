//! Nullability and left recursion over the canonical grammar.

use index_vec::IndexVec;
use itertools::Itertools;

use crate::canon::{CanonicalGrammar, Node, NodeId, NodeRef, RuleBody};
use crate::error::DefinitionError;
use crate::grammar::RuleId;

/// Which rules and nodes can match without consuming input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nullable {
    rules: IndexVec<RuleId, bool>,
    nodes: IndexVec<NodeId, bool>,
}

impl Nullable {
    pub fn compute(grammar: &CanonicalGrammar) -> Self {
        let mut nullable = Nullable {
            rules: IndexVec::from_vec(vec![false; grammar.rules().len()]),
            nodes: IndexVec::from_vec(vec![false; grammar.nodes().len()]),
        };
        // Children always have lower ids than their parents, so one pass
        // over the nodes per round is enough. Rules iterate to a fixpoint.
        loop {
            for (id, node) in grammar.nodes().iter_enumerated() {
                nullable.nodes[id] = nullable.node(node);
            }
            let mut changed = false;
            for (id, rule) in grammar.rules().iter_enumerated() {
                let value = match &rule.body {
                    RuleBody::Node(node) => nullable.node(node),
                    RuleBody::Alias(node_ref) => nullable.get(*node_ref),
                };
                if value != nullable.rules[id] {
                    nullable.rules[id] = value;
                    changed = true;
                }
            }
            if !changed {
                return nullable;
            }
        }
    }

    pub fn get(&self, node_ref: NodeRef) -> bool {
        match node_ref {
            NodeRef::Rule(id) => self.rules[id],
            NodeRef::Inner(id) => self.nodes[id],
        }
    }

    fn node(&self, node: &Node) -> bool {
        match node {
            Node::Alternation(members) => members.iter().any(|&m| self.get(m)),
            Node::Concatenation(members) => members.iter().all(|&m| self.get(m)),
            Node::Repetition { min, element, .. } => *min == 0 || self.get(*element),
            Node::Literal(literal) => literal.units.is_empty(),
            Node::Prose(_) => true,
        }
    }
}

/// Rules that `node_ref` may enter before consuming any input.
fn leftmost_rules(
    grammar: &CanonicalGrammar,
    nullable: &Nullable,
    node_ref: NodeRef,
    out: &mut Vec<RuleId>,
) {
    match node_ref {
        NodeRef::Rule(id) => {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        NodeRef::Inner(id) => leftmost_in_node(grammar, nullable, grammar.node(id), out),
    }
}

fn leftmost_in_node(
    grammar: &CanonicalGrammar,
    nullable: &Nullable,
    node: &Node,
    out: &mut Vec<RuleId>,
) {
    match node {
        Node::Alternation(members) => {
            for &member in members {
                leftmost_rules(grammar, nullable, member, out);
            }
        }
        Node::Concatenation(members) => {
            for &member in members {
                leftmost_rules(grammar, nullable, member, out);
                if !nullable.get(member) {
                    break;
                }
            }
        }
        Node::Repetition { max: Some(0), .. } => {}
        Node::Repetition { element, .. } => leftmost_rules(grammar, nullable, *element, out),
        Node::Literal(_) | Node::Prose(_) => {}
    }
}

/// Fail if some rule can reach itself without consuming input. An
/// ordered-choice matcher would recurse forever on such a rule.
pub fn check_left_recursion(grammar: &CanonicalGrammar) -> Result<(), DefinitionError> {
    let nullable = Nullable::compute(grammar);
    let edges: IndexVec<RuleId, Vec<RuleId>> = grammar
        .rules()
        .iter()
        .map(|rule| {
            let mut out = Vec::new();
            match &rule.body {
                RuleBody::Node(node) => leftmost_in_node(grammar, &nullable, node, &mut out),
                RuleBody::Alias(node_ref) => leftmost_rules(grammar, &nullable, *node_ref, &mut out),
            }
            out
        })
        .collect();

    let mut visited = IndexVec::from_vec(vec![Visit::New; edges.len()]);
    let mut path = Vec::new();
    for start in edges.indices() {
        if let Some(cycle) = find_cycle(&edges, start, &mut visited, &mut path) {
            let names = cycle
                .iter()
                .map(|&id| grammar.rule(id).name.clone())
                .collect_vec();
            return Err(DefinitionError::LeftRecursion {
                rule: names[0].clone(),
                cycle: names,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

fn find_cycle(
    edges: &IndexVec<RuleId, Vec<RuleId>>,
    id: RuleId,
    visited: &mut IndexVec<RuleId, Visit>,
    path: &mut Vec<RuleId>,
) -> Option<Vec<RuleId>> {
    match visited[id] {
        Visit::Done => return None,
        Visit::Active => {
            let start = path.iter().position(|&p| p == id).unwrap_or(0);
            let mut cycle = path[start..].to_vec();
            cycle.push(id);
            return Some(cycle);
        }
        Visit::New => {}
    }
    visited[id] = Visit::Active;
    path.push(id);
    for &next in &edges[id] {
        if let Some(cycle) = find_cycle(edges, next, visited, path) {
            return Some(cycle);
        }
    }
    path.pop();
    visited[id] = Visit::Done;
    None
}
