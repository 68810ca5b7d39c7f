use collider_domain_ugen::{Args, BinaryOp, GraphContext, GraphError, UGenTable, UnaryOp, Value, MAX_TEXT_LEN};
use collider_ports::Rate;
use pretty_assertions::assert_eq;

fn nums(values: &[f64]) -> Value {
    Value::Seq(values.iter().copied().map(Value::Num).collect())
}

#[test]
fn sequences_broadcast_cyclically() {
    let table = UGenTable::new();
    let mut ctx = GraphContext::new(&table);

    let sum = ctx
        .add(&nums(&[1.0, 2.0, 3.0, 4.0]), &nums(&[10.0, 20.0]))
        .expect("add should succeed");
    assert_eq!(sum, nums(&[11.0, 22.0, 13.0, 24.0]));

    let product = ctx
        .mul(&nums(&[2.0]), &nums(&[1.0, 2.0, 3.0]))
        .expect("mul should succeed");
    assert_eq!(product, nums(&[2.0, 4.0, 6.0]));

    let empty = ctx.add(&nums(&[]), &nums(&[1.0])).expect("add should succeed");
    assert_eq!(empty, nums(&[]));
}

#[test]
fn scalar_maps_across_sequence() {
    let table = UGenTable::new();
    let mut ctx = GraphContext::new(&table);

    let shifted = ctx.sub(&nums(&[5.0, 6.0]), &Value::Num(1.0)).expect("sub should succeed");
    assert_eq!(shifted, nums(&[4.0, 5.0]));

    let halves = ctx.div(&Value::Num(1.0), &nums(&[2.0, 4.0])).expect("div should succeed");
    assert_eq!(halves, nums(&[0.5, 0.25]));
}

#[test]
fn oversized_text_repeat_is_an_error() {
    let table = UGenTable::new();
    let mut ctx = GraphContext::new(&table);
    let ab = Value::from("ab");

    assert!(matches!(
        ctx.mul(&ab, &Value::Num(1e30)),
        Err(GraphError::TextTooLong { len: 2, .. })
    ));
    assert!(matches!(
        ctx.mul(&ab, &Value::Num(f64::INFINITY)),
        Err(GraphError::TextTooLong { len: 2, .. })
    ));
    assert!(matches!(
        ctx.mul(&ab, &Value::Num((MAX_TEXT_LEN / 2 + 1) as f64)),
        Err(GraphError::TextTooLong { .. })
    ));
    assert_eq!(ctx.mul(&ab, &Value::Num(f64::NAN)).expect("nan count"), Value::from(""));
    assert_eq!(ctx.mul(&ab, &Value::Num(-2.0)).expect("negative count"), Value::from(""));
    assert_eq!(ctx.mul(&ab, &Value::Num(2.9)).expect("fractional count"), Value::from("abab"));
}

#[test]
fn text_keeps_value_semantics() {
    let table = UGenTable::new();
    let mut ctx = GraphContext::new(&table);

    assert_eq!(
        ctx.add(&Value::from("freq"), &Value::Num(440.0)).expect("concat"),
        Value::from("freq440")
    );
    assert_eq!(
        ctx.add(&Value::Num(1.0), &Value::from("x")).expect("concat"),
        Value::from("1x")
    );
    assert_eq!(
        ctx.mul(&Value::from("ab"), &Value::Num(3.0)).expect("repeat"),
        Value::from("ababab")
    );
    assert!(matches!(
        ctx.sub(&Value::from("a"), &Value::Num(1.0)),
        Err(GraphError::UnsupportedOperands { op: "-", .. })
    ));
    assert!(matches!(
        ctx.unary(UnaryOp::Neg, &Value::from("a")),
        Err(GraphError::UnsupportedOperand { kind: "text", .. })
    ));
}

#[test]
fn node_operands_build_operator_nodes() {
    let table = UGenTable::with_builtins().expect("builtins should register");
    let mut ctx = GraphContext::new(&table);

    let lfo = ctx.kr("SinOsc", &Args::new()).expect("SinOsc.kr");
    let sig = ctx.ar("LFSaw", &Args::new()).expect("LFSaw.ar");

    let scaled = ctx.mul(&lfo, &Value::Num(0.5)).expect("mul");
    let node = scaled.as_ugen().expect("node result");
    assert_eq!(node.name(), "BinaryOpUGen");
    assert_eq!(node.special_index(), BinaryOp::Mul.special_index());
    assert_eq!(node.rate(), Rate::Control);

    let mixed = ctx.add(&scaled, &sig).expect("add");
    assert_eq!(mixed.as_ugen().expect("node result").rate(), Rate::Audio);

    let neg = ctx.unary(UnaryOp::Neg, &sig).expect("neg");
    let neg = neg.as_ugen().expect("node result");
    assert_eq!(neg.name(), "UnaryOpUGen");
    assert_eq!(neg.special_index(), 0);
    assert_eq!(neg.rate(), Rate::Audio);

    let seq = ctx.mul(&Value::Seq(vec![lfo.clone(), Value::Num(2.0)]), &Value::Num(3.0)).expect("mul");
    let items = seq.as_seq().expect("sequence result");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ugen().map(|n| n.name().to_string()), Some("BinaryOpUGen".into()));
    assert_eq!(items[1], Value::Num(6.0));
}

#[test]
fn operator_indices_round_trip() {
    for op in BinaryOp::ALL {
        assert_eq!(BinaryOp::from_special_index(op.special_index()), Some(op));
        assert_eq!(BinaryOp::from_selector(op.selector()), Some(op));
    }
    assert_eq!(BinaryOp::Div.special_index(), 4);
    assert_eq!(UnaryOp::Midicps.apply(69.0), 440.0);
    assert_eq!(BinaryOp::Mod.apply(7.0, 3.0), 1.0);
}
