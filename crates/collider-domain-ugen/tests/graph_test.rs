use collider_domain_ugen::{
    expand, Args, GraphContext, GraphError, ParamList, UGenRef, UGenTable, Value,
};
use collider_ports::{Rate, SignalRange};
use pretty_assertions::assert_eq;

fn builtins() -> UGenTable {
    UGenTable::with_builtins().expect("builtins should register")
}

fn node(value: &Value) -> &UGenRef {
    value.as_ugen().expect("expected a graph node")
}

fn consts(node: &UGenRef) -> Vec<Option<f64>> {
    node.inputs().iter().map(|input| input.as_const()).collect()
}

#[test]
fn madd_keeps_source_rate() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let src = ctx.kr("SinOsc", &Args::new()).expect("SinOsc.kr");
    assert_eq!(node(&src).signal_range(), SignalRange::Bipolar);

    let scaled = ctx
        .madd(&src, &Value::Num(2.0), &Value::Num(1.0))
        .expect("madd should succeed");
    let scaled = node(&scaled);
    assert_eq!(scaled.name(), "MulAdd");
    assert_eq!(scaled.rate(), Rate::Control);
    assert_eq!(consts(scaled), vec![None, Some(2.0), Some(1.0)]);
    assert!(std::rc::Rc::ptr_eq(
        scaled.inputs()[0].as_node().expect("source input"),
        node(&src)
    ));
}

#[test]
fn madd_identity_returns_source() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let src = ctx.ar("SinOsc", &Args::new()).expect("SinOsc.ar");
    let same = ctx
        .madd(&src, &Value::Num(1.0), &Value::Num(0.0))
        .expect("madd should succeed");
    assert_eq!(same, src);

    let plain = ctx
        .madd(&Value::Num(3.0), &Value::Num(2.0), &Value::Num(1.0))
        .expect("numeric madd");
    assert_eq!(plain, Value::Num(7.0));
}

#[test]
fn range_depends_on_signal_range() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);

    let sine = ctx.kr("SinOsc", &Args::new()).expect("SinOsc.kr");
    let ranged = ctx
        .range(&sine, &Value::Num(100.0), &Value::Num(300.0))
        .expect("range");
    assert_eq!(consts(node(&ranged)), vec![None, Some(100.0), Some(200.0)]);

    let pulse = ctx.kr("LFPulse", &Args::new()).expect("LFPulse.kr");
    assert_eq!(node(&pulse).signal_range(), SignalRange::Unipolar);
    let ranged = ctx
        .range(&pulse, &Value::Num(100.0), &Value::Num(300.0))
        .expect("range");
    assert_eq!(consts(node(&ranged)), vec![None, Some(200.0), Some(100.0)]);

    let bipolar = ctx.bipolar(&sine, &Value::Num(2.0)).expect("bipolar");
    assert_eq!(consts(node(&bipolar)), vec![None, Some(2.0), Some(0.0)]);

    let unipolar = ctx.unipolar(&sine, &Value::Num(1.0)).expect("unipolar");
    assert_eq!(consts(node(&unipolar)), vec![None, Some(0.5), Some(0.5)]);

    assert!(matches!(
        ctx.range(&Value::Num(1.0), &Value::Num(0.0), &Value::Num(1.0)),
        Err(GraphError::UnsupportedOperand { op: "range", .. })
    ));
}

#[test]
fn keyed_args_override_positional() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let sig = ctx
        .ar("SinOsc", &Args::new().arg(220.0).key("freq", 330.0))
        .expect("SinOsc.ar");
    assert_eq!(consts(node(&sig)), vec![Some(330.0), Some(0.0)]);

    let with_mul = ctx
        .ar("SinOsc", &Args::new().key("mul", 0.25))
        .expect("SinOsc.ar");
    let with_mul = node(&with_mul);
    assert_eq!(with_mul.name(), "MulAdd");
    assert_eq!(consts(with_mul), vec![None, Some(0.25), Some(0.0)]);
}

#[test]
fn param_list_defaults() {
    let params = ParamList::parse("freq=440, amp").expect("declaration should parse");
    assert_eq!(params.names(), ["freq".to_string(), "amp".to_string()]);
    assert_eq!(params.defaults(), [Value::Num(440.0), Value::Num(0.0)]);

    let resolved = params.resolve(&Args::new().arg(220.0).arg(0.5).arg(99.0).key("nope", 1.0));
    assert_eq!(resolved, vec![Value::Num(220.0), Value::Num(0.5)]);

    assert!(matches!(ParamList::parse("=1"), Err(GraphError::InvalidDeclaration(_))));
    assert!(matches!(ParamList::parse("a=x"), Err(GraphError::InvalidDeclaration(_))));
    assert!(ParamList::parse("").expect("empty declaration").is_empty());
}

#[test]
fn multichannel_expansion() {
    let rows = expand(&[
        Value::Seq(vec![Value::Num(1.0), Value::Num(2.0), Value::Num(3.0)]),
        Value::Num(0.0),
        Value::Seq(vec![Value::Num(5.0), Value::Num(6.0)]),
    ])
    .expect("sequence arguments expand");
    assert_eq!(
        rows,
        vec![
            vec![Value::Num(1.0), Value::Num(0.0), Value::Num(5.0)],
            vec![Value::Num(2.0), Value::Num(0.0), Value::Num(6.0)],
            vec![Value::Num(3.0), Value::Num(0.0), Value::Num(5.0)],
        ]
    );
    assert_eq!(expand(&[Value::Num(1.0)]), None);

    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let pair = ctx
        .ar("SinOsc", &Args::new().arg(vec![220.0, 330.0]))
        .expect("SinOsc.ar");
    let freqs: Vec<_> = pair
        .as_seq()
        .expect("expanded call returns a sequence")
        .iter()
        .map(|item| node(item).inputs()[0].as_const())
        .collect();
    assert_eq!(freqs, vec![Some(220.0), Some(330.0)]);
}

#[test]
fn tag_is_an_implicit_parameter() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let sig = ctx
        .ar("LFTri", &Args::new().key("tag", "lead"))
        .expect("LFTri.ar");
    assert_eq!(node(&sig).tag(), "lead");
    assert_eq!(node(&sig).num_inputs(), 2);
}

#[test]
fn pan2_returns_output_proxies() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let sig = ctx.ar("SinOsc", &Args::new()).expect("SinOsc.ar");
    let panned = ctx.ar("Pan2", &Args::new().arg(sig).arg(-0.5)).expect("Pan2.ar");

    let proxies = panned.as_seq().expect("two channels");
    assert_eq!(proxies.len(), 2);
    let left = node(&proxies[0]);
    let right = node(&proxies[1]);
    assert!(left.is_output_proxy() && right.is_output_proxy());
    assert_eq!((left.output_index(), right.output_index()), (0, 1));

    let source = left.source().expect("proxy source");
    assert!(std::rc::Rc::ptr_eq(source, right.source().expect("proxy source")));
    assert!(source.is_multi_out());
    assert_eq!(source.num_outputs(), 2);
    assert_eq!(source.channels().len(), 2);
}

#[test]
fn pan2_keeps_one_proxy_per_output() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let sig = ctx.ar("SinOsc", &Args::new()).expect("SinOsc.ar");
    let panned = ctx.ar("Pan2", &Args::new().arg(sig)).expect("Pan2.ar");
    let source = std::rc::Rc::clone(node(&panned.as_seq().expect("two channels")[0]).source().expect("proxy source"));
    drop(panned);

    let channels = source.channels();
    assert_eq!(channels.len(), source.num_outputs());
    assert_eq!(
        channels.iter().map(|proxy| proxy.output_index()).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert!(channels
        .iter()
        .all(|proxy| proxy.source().is_some_and(|s| std::rc::Rc::ptr_eq(s, &source))));

    let again = source.channels();
    assert!(std::rc::Rc::ptr_eq(&channels[1], &again[1]));
}

#[test]
fn unknown_constructors_are_reported() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    assert_eq!(
        ctx.ar("Nope", &Args::new()),
        Err(GraphError::UnknownUGen("Nope".into()))
    );
    assert_eq!(
        ctx.call("Out", Rate::Scalar, &Args::new()),
        Err(GraphError::UnknownRate {
            name: "Out".into(),
            method: "ir",
        })
    );
}
