use abnf::matcher::Matcher;
use abnf::{compile, CompileOptions, NodeRef, Shape, Value};
use parsegen::{Input, Span, State};
use proptest::prelude::*;

/// Input of arbitrary 32-bit units.
struct Units(Vec<u32>);

impl Input for Units {
    type Unit = u32;

    fn len(&self) -> usize {
        self.0.len()
    }

    fn unit_at(&self, idx: usize) -> Option<u32> {
        self.0.get(idx).copied()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn range_accepts_exactly_its_values(lo in 0u32..0x1_0000, width in 0u32..300) {
        let hi = lo + width;
        let compiled = compile(&format!("r = %x{:X}-{:X}\n", lo, hi)).unwrap();
        let r = compiled.rule("r").unwrap();

        for unit in lo..=hi {
            let tree = compiled.parse_complete(r, &Units(vec![unit]));
            prop_assert!(tree.is_ok(), "rejected {:#X}", unit);
        }
        if lo > 0 {
            prop_assert!(compiled.parse(r, &Units(vec![lo - 1])).is_err());
        }
        prop_assert!(compiled.parse(r, &Units(vec![hi + 1])).is_err());
    }

    #[test]
    fn range_type_has_one_variant_per_value(lo in 0u32..0x100, width in 1u32..256) {
        let hi = lo + width;
        let compiled = compile(&format!("r = %d{}-{}\n", lo, hi)).unwrap();
        let r = compiled.rule("r").unwrap();
        match &compiled.model().get(NodeRef::Rule(r)).shape {
            Shape::Sum(variants) => prop_assert_eq!(variants.len() as u32, width + 1),
            shape => prop_assert!(false, "unexpected shape: {:?}", shape),
        }
    }
}

#[test]
fn compilation_is_deterministic() {
    init_tracing();
    let source = "msg = 1*( field / %x20-7E ) [ \"end\" ]\n\
                  field = name \":\" 1*DIGIT\n\
                  name = 1*ALPHA *( \"-\" 1*ALPHA )\n";
    let first = compile(source).unwrap();
    let second = compile(source).unwrap();
    assert_eq!(first.canonical(), second.canonical());
    assert_eq!(first.model(), second.model());
}

#[test]
fn ordered_choice_takes_first_match() {
    let compiled = compile("alternation = \"ab\" / \"a\"\n").unwrap();
    let tree = compiled
        .parse(compiled.rule("alternation").unwrap(), "ab")
        .unwrap();
    assert_eq!(tree.span, Span::new(0, 2));
    assert!(matches!(tree.value, Value::Sum { variant: 0, .. }));

    let compiled = compile("alternation = \"a\" / \"ab\"\n").unwrap();
    let tree = compiled
        .parse(compiled.rule("alternation").unwrap(), "ab")
        .unwrap();
    assert_eq!(tree.span, Span::new(0, 1));
}

#[test]
fn failed_sequence_leaves_cursor_in_place() {
    let compiled = compile("concatenation = \"a\" \"b\"\n").unwrap();
    let rule = NodeRef::Rule(compiled.rule("concatenation").unwrap());
    let state = Matcher::new(compiled.model())
        .match_type(State::new("ac"), rule)
        .unwrap_err();
    assert_eq!(state.position(), 0);
    assert_eq!(state.failure().position, 1);
}

#[test]
fn repetition_bounds() {
    let compiled = compile("repetition = 2*3\"x\"\n").unwrap();
    let rule = compiled.rule("repetition").unwrap();
    let tests = vec![("x", None), ("xx", Some(2)), ("xxx", Some(3)), ("xxxx", Some(3))];
    for (input, expected) in tests {
        let consumed = compiled.parse(rule, input).ok().map(|tree| tree.span.len());
        assert_eq!(consumed, expected, "input: {}", input);
    }
}

#[test]
fn nullable_repetition_terminates() {
    let compiled = compile("r = *( *\"x\" )\n").unwrap();
    let tree = compiled.parse(compiled.rule("r").unwrap(), "xxy").unwrap();
    assert_eq!(tree.span, Span::new(0, 2));
}

#[test]
fn identical_sub_expressions_share_a_type() {
    let compiled = compile("a = \"-\" 1*DIGIT\nb = \"+\" 1*DIGIT\n").unwrap();
    let fields = |name: &str| {
        let rule = compiled.rule(name).unwrap();
        match &compiled.model().get(NodeRef::Rule(rule)).shape {
            Shape::Product(fields) => fields.iter().map(|f| f.ty).collect::<Vec<_>>(),
            shape => panic!("unexpected shape: {:?}", shape),
        }
    };
    let a = fields("a");
    let b = fields("b");
    assert_eq!(a[1], b[1]);
    assert!(matches!(a[1], NodeRef::Inner(_)));
    assert_ne!(a[0], b[0]);
}

#[test]
fn digit_end_to_end() {
    let compiled = compile("digit = %x30-39\n").unwrap();
    let digit = compiled.rule("digit").unwrap();
    let variants = match &compiled.model().get(NodeRef::Rule(digit)).shape {
        Shape::Sum(variants) => variants.clone(),
        shape => panic!("unexpected shape: {:?}", shape),
    };
    assert_eq!(variants.len(), 10);
    for variant in &variants {
        assert!(matches!(
            compiled.model().get(variant.ty).shape,
            Shape::Leaf(_)
        ));
    }

    let tree = compiled.parse(digit, "7").unwrap();
    assert_eq!(tree.span.len(), 1);
    match tree.value {
        Value::Sum { variant, .. } => assert_eq!(variants[variant].name, "7"),
        value => panic!("unexpected value: {:?}", value),
    }
}

#[test]
fn range_limit_is_enforced() {
    let options = CompileOptions::default().max_range_len(Some(255));
    assert!(abnf::compile_with("octet = %x00-FF\n", &options).is_err());
    let options = CompileOptions::default().max_range_len(Some(256));
    assert!(abnf::compile_with("octet = %x00-FF\n", &options).is_ok());
}
