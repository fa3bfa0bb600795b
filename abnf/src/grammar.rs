//! Resolution of a parsed document into one definition per rule.

use std::collections::HashMap;

use index_vec::{IndexSlice, IndexVec};
use parsegen::Location;
use tracing::trace;

use crate::ast::{Alternation, DefinedAs, GrammarDocument, RuleDefinition, RuleName};
use crate::core_rules::CORE_RULES;
use crate::error::DefinitionError;
use crate::options::CompileOptions;

index_vec::define_index_type! { pub struct RuleId = usize; }

/// A rule with all of its `=/` extensions merged into the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: RuleName,
    pub body: Alternation,
    /// Where the rule was first defined.
    pub location: Location,
    /// Supplied from the core rules rather than the grammar source.
    pub core: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: IndexVec<RuleId, Rule>,
    index: HashMap<String, RuleId>,
}

impl Grammar {
    /// Merge incremental definitions, add referenced core rules and check
    /// that every reference and repeat is valid.
    ///
    /// Rules keep the order of their first definition. Core rules follow,
    /// in the order they are first referenced.
    pub fn resolve(
        document: &GrammarDocument,
        options: &CompileOptions,
    ) -> Result<Grammar, DefinitionError> {
        let mut grammar = Grammar {
            rules: IndexVec::new(),
            index: HashMap::new(),
        };
        for definition in &document.rules {
            grammar.define(definition, false)?;
        }

        let core = if options.core_rules {
            core_definitions()
        } else {
            HashMap::new()
        };

        // The loop bound grows as core rules are appended, so their own
        // references are resolved too.
        let mut id = RuleId::new(0);
        while id < grammar.rules.len_idx() {
            let mut missing = Vec::new();
            grammar.rules[id].body.visit_rule_refs(&mut |name| {
                if !grammar.index.contains_key(&name.key()) && !missing.contains(name) {
                    missing.push(name.clone());
                }
            });
            for name in missing {
                match core.get(&name.key()) {
                    Some(definition) => {
                        trace!(rule = %definition.name, "including core rule");
                        grammar.define(definition, true)?;
                    }
                    None => {
                        let rule = &grammar.rules[id];
                        return Err(DefinitionError::Undefined {
                            rule: rule.name.to_string(),
                            name: name.to_string(),
                            location: rule.location,
                        });
                    }
                }
            }
            id += 1;
        }

        for rule in &grammar.rules {
            check_repeats(rule)?;
        }

        Ok(grammar)
    }

    fn define(&mut self, definition: &RuleDefinition, core: bool) -> Result<(), DefinitionError> {
        let key = definition.name.key();
        match (definition.mode, self.index.get(&key)) {
            (DefinedAs::Replace, None) => {
                let id = self.rules.push(Rule {
                    name: definition.name.clone(),
                    body: definition.body.clone(),
                    location: definition.location,
                    core,
                });
                self.index.insert(key, id);
                Ok(())
            }
            (DefinedAs::Replace, Some(&id)) => Err(DefinitionError::Redefined {
                name: definition.name.to_string(),
                location: definition.location,
                previous: self.rules[id].location,
            }),
            (DefinedAs::Incremental, Some(&id)) => {
                self.rules[id]
                    .body
                    .0
                    .extend(definition.body.0.iter().cloned());
                Ok(())
            }
            (DefinedAs::Incremental, None) => Err(DefinitionError::IncrementalWithoutBase {
                name: definition.name.to_string(),
                location: definition.location,
            }),
        }
    }

    pub fn rules(&self) -> &IndexSlice<RuleId, [Rule]> {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    /// Find a rule by name, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<RuleId> {
        self.index.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn core_definitions() -> HashMap<String, RuleDefinition> {
    let document = match crate::parser::parse(CORE_RULES) {
        Ok(document) => document,
        Err(err) => unreachable!("core rules failed to parse: {}", err),
    };
    document
        .rules
        .into_iter()
        .map(|rule| (rule.name.key(), rule))
        .collect()
}

fn check_repeats(rule: &Rule) -> Result<(), DefinitionError> {
    let mut result = Ok(());
    rule.body.visit_repetitions(&mut |repetition| match repetition.repeat {
        Some(repeat) if result.is_ok() => {
            if let Some(max) = repeat.max {
                if repeat.min > max {
                    result = Err(DefinitionError::InvertedRepeat {
                        rule: rule.name.to_string(),
                        min: repeat.min,
                        max,
                        location: rule.location,
                    });
                }
            }
        }
        _ => {}
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(source: &str) -> Result<Grammar, DefinitionError> {
        let document: GrammarDocument = source.parse().unwrap();
        Grammar::resolve(&document, &CompileOptions::default())
    }

    #[test]
    fn incremental_definitions_append() {
        let grammar = resolve("a = \"x\"\nb = \"y\"\nA =/ \"z\" / b\n").unwrap();
        assert_eq!(grammar.len(), 2);
        let a = grammar.rule(grammar.lookup("a").unwrap());
        assert_eq!(a.body.to_string(), "\"x\" / \"z\" / b");
        assert_eq!(a.name.as_str(), "a");
    }

    #[test]
    fn definition_errors() {
        assert!(matches!(
            resolve("a =/ \"x\"\n"),
            Err(DefinitionError::IncrementalWithoutBase { .. })
        ));
        assert!(matches!(
            resolve("a = \"x\"\nA = \"y\"\n"),
            Err(DefinitionError::Redefined { ref name, .. }) if name == "A"
        ));
        assert!(matches!(
            resolve("a = b\n"),
            Err(DefinitionError::Undefined { ref rule, ref name, .. }) if rule == "a" && name == "b"
        ));
        assert!(matches!(
            resolve("a = 3*2\"x\"\n"),
            Err(DefinitionError::InvertedRepeat { min: 3, max: 2, .. })
        ));
    }

    #[test]
    fn undefined_reference_points_at_first_definition() {
        let tests = vec![
            ("a = \"x\"\nbb = c\n", (2, 1)),
            ("a = \"x\"\n    / c\n", (1, 1)),
            ("a = \"x\"\nb = \"y\"\na =/ c\n", (1, 1)),
        ];
        for (source, expected) in tests {
            match resolve(source) {
                Err(DefinitionError::Undefined { name, location, .. }) => {
                    assert_eq!(name, "c", "source: {:?}", source);
                    assert_eq!((location.line, location.column), expected, "source: {:?}", source);
                }
                res => panic!("source: {:?}, unexpected result: {:?}", source, res),
            }
        }
    }

    #[test]
    fn core_rules_included_on_demand() {
        let grammar = resolve("number = 1*DIGIT [ hex ]\nhex = \"x\" 1*HEXDIG\n").unwrap();
        let names: Vec<_> = grammar.rules().iter().map(|r| r.name.to_string()).collect();
        assert_eq!(names, vec!["number", "hex", "DIGIT", "HEXDIG"]);
        assert!(grammar.rule(grammar.lookup("digit").unwrap()).core);
        assert!(!grammar.rule(grammar.lookup("hex").unwrap()).core);
    }

    #[test]
    fn core_rules_resolve_transitively() {
        let grammar = resolve("ws = LWSP\n").unwrap();
        let names: Vec<_> = grammar.rules().iter().map(|r| r.name.to_string()).collect();
        assert_eq!(names, vec!["ws", "LWSP", "WSP", "CRLF", "SP", "HTAB", "CR", "LF"]);
    }

    #[test]
    fn user_definition_overrides_core() {
        let grammar = resolve("a = DIGIT\nDIGIT = \"0\" / \"1\"\n").unwrap();
        assert_eq!(grammar.len(), 2);
        assert!(!grammar.rule(grammar.lookup("DIGIT").unwrap()).core);
    }

    #[test]
    fn core_rules_can_be_disabled() {
        let document: GrammarDocument = "a = DIGIT\n".parse().unwrap();
        let options = CompileOptions::default().core_rules(false);
        assert!(matches!(
            Grammar::resolve(&document, &options),
            Err(DefinitionError::Undefined { .. })
        ));
    }
}
