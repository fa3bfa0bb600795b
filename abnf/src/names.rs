//! Stable names for every node and for the members of sums and products.

use std::collections::HashMap;

use crate::canon::{CanonicalGrammar, Literal, Node, NodeId, NodeRef};

/// Name of an anonymous node, derived from its shape and id.
pub fn inner_name(id: NodeId, node: &Node) -> String {
    format!("{}-{}", node.kind(), id.index())
}

/// How a member of a sum or product is labelled. Rules go by their name,
/// literals by their text when it is alphanumeric (`"0"`, `"if"`) and by
/// hex code otherwise (`x2D`). Labels are unique within one list.
pub fn member_labels(grammar: &CanonicalGrammar, members: &[NodeRef]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    members
        .iter()
        .map(|&member| {
            let label = label(grammar, member);
            let count = seen.entry(label.to_ascii_lowercase()).or_insert(0);
            *count += 1;
            if *count == 1 {
                label
            } else {
                format!("{}-{}", label, count)
            }
        })
        .collect()
}

fn label(grammar: &CanonicalGrammar, member: NodeRef) -> String {
    match member {
        NodeRef::Rule(id) => grammar.rule(id).name.clone(),
        NodeRef::Inner(id) => match grammar.node(id) {
            Node::Literal(literal) => literal_label(literal),
            node => inner_name(id, node),
        },
    }
}

fn literal_label(literal: &Literal) -> String {
    match literal.as_string() {
        Some(text) if text.is_empty() => "empty".to_owned(),
        Some(text) if text.chars().all(|c| c.is_ascii_alphanumeric()) => text,
        _ => literal
            .units
            .iter()
            .map(|unit| format!("x{:02X}", unit))
            .collect::<Vec<_>>()
            .join("-"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::GrammarDocument;
    use crate::canon::RuleBody;
    use crate::grammar::{Grammar, RuleId};
    use crate::options::CompileOptions;

    fn labels(source: &str) -> Vec<String> {
        let options = CompileOptions::default();
        let document: GrammarDocument = source.parse().unwrap();
        let grammar = Grammar::resolve(&document, &options).unwrap();
        let canonical = CanonicalGrammar::build(&grammar, &options).unwrap();
        match &canonical.rule(RuleId::new(0)).body {
            RuleBody::Node(node) => member_labels(&canonical, node.children()),
            RuleBody::Alias(_) => panic!("alias"),
        }
    }

    #[test]
    fn label_members() {
        let tests = vec![
            ("a = %x30-32\n", vec!["0", "1", "2"]),
            ("a = \"if\" / \"-\" / %d13.10 / b\nb = \"\"\n", vec!["if", "x2D", "concatenation-4", "b"]),
            ("a = \"x\" \"X\" \"x\"\n", vec!["x", "X-2", "x-3"]),
            ("a = DIGIT DIGIT\n", vec!["DIGIT", "DIGIT-2"]),
            ("a = \"\" \"q\"\n", vec!["empty", "q"]),
        ];
        for (source, expected) in tests {
            assert_eq!(labels(source), expected, "source: {}", source);
        }
    }
}
