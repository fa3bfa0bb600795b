use abnf::{compile, GrammarDocument, NodeRef, Shape};
use anyhow::{Context, Result};

const RFC5234: &str = include_str!("data/rfc5234.abnf");

#[test]
fn compile_abnf_grammar() {
    let compiled = compile(RFC5234).unwrap();
    for name in ["rulelist", "c-wsp", "prose-val", "ALPHA", "HEXDIG", "CRLF"] {
        assert!(compiled.rule(name).is_some(), "missing rule {}", name);
    }
    let rulelist = compiled.rule("rulelist").unwrap();
    assert!(!compiled.grammar().rule(rulelist).core);
    assert!(compiled.grammar().rule(compiled.rule("alpha").unwrap()).core);

    let element = compiled.rule("element").unwrap();
    match &compiled.model().get(NodeRef::Rule(element)).shape {
        Shape::Sum(variants) => {
            let names: Vec<_> = variants.iter().map(|v| v.name.as_str()).collect();
            assert_eq!(
                names,
                vec!["rulename", "group", "option", "char-val", "num-val", "prose-val"]
            );
        }
        shape => panic!("unexpected shape: {:?}", shape),
    }
}

#[test]
fn document_round_trips_through_display() -> Result<()> {
    let document: GrammarDocument = RFC5234.parse()?;
    let printed = document.to_string();
    let reparsed: GrammarDocument = printed.parse()?;
    assert_eq!(document.rules.len(), reparsed.rules.len());
    for (original, reparsed) in document.rules.iter().zip(&reparsed.rules) {
        assert_eq!(original.name, reparsed.name);
        assert_eq!(original.mode, reparsed.mode);
        assert_eq!(original.body, reparsed.body);
    }
    Ok(())
}

#[test]
fn abnf_grammar_matches_a_rule() -> Result<()> {
    let compiled = compile(RFC5234)?;
    let input = "a = b c / \"x\"\r\n";
    let rulelist = compiled.rule("rulelist").context("no rulelist")?;
    let tree = compiled.parse_complete(rulelist, input)?;

    let rulename = NodeRef::Rule(compiled.rule("rulename").context("no rulename")?);
    let found = tree.find(rulename).context("no rulename in tree")?;
    assert_eq!(found.as_str(input), "a");

    let char_val = NodeRef::Rule(compiled.rule("char-val").context("no char-val")?);
    let found = tree.find(char_val).context("no char-val in tree")?;
    assert_eq!(found.as_str(input), "\"x\"");
    Ok(())
}

#[test]
fn abnf_grammar_rejects_a_missing_line_break() {
    let compiled = compile(RFC5234).unwrap();
    let failure = compiled
        .parse_complete(compiled.rule("rulelist").unwrap(), "a = b")
        .unwrap_err();
    assert_eq!(failure.position, 5);
}
