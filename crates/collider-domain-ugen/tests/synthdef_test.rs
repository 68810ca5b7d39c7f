use collider_domain_ugen::{Args, GraphContext, GraphError, UGenTable, Value};
use collider_ports::{InputSpec, ParamSpec, Rate, SynthDefSpec, UnitSpec};
use pretty_assertions::assert_eq;
use std::cell::Cell;

fn builtins() -> UGenTable {
    UGenTable::with_builtins().expect("builtins should register")
}

#[test]
fn compiles_sine_definition() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let def = ctx
        .build_def("sine", "freq=440,amp=0.5", |ctx, controls| {
            let sig = ctx.ar("SinOsc", &Args::new().arg(controls[0].clone()))?;
            let sig = ctx.mul(&sig, &controls[1])?;
            ctx.ar("Out", &Args::new().arg(0).arg(vec![sig.clone(), sig]))?;
            Ok(())
        })
        .expect("definition should compile");

    assert_eq!(
        def,
        SynthDefSpec {
            name: "sine".into(),
            consts: vec![0.0],
            params: vec![
                ParamSpec {
                    name: "freq".into(),
                    default: 440.0,
                },
                ParamSpec {
                    name: "amp".into(),
                    default: 0.5,
                },
            ],
            units: vec![
                UnitSpec {
                    name: "Control".into(),
                    rate: Rate::Control,
                    special_index: 0,
                    inputs: vec![],
                    outputs: vec![Rate::Control, Rate::Control],
                },
                UnitSpec {
                    name: "SinOsc".into(),
                    rate: Rate::Audio,
                    special_index: 0,
                    inputs: vec![
                        InputSpec::Unit { unit: 0, output: 0 },
                        InputSpec::Const { index: 0 },
                    ],
                    outputs: vec![Rate::Audio],
                },
                UnitSpec {
                    name: "BinaryOpUGen".into(),
                    rate: Rate::Audio,
                    special_index: 2,
                    inputs: vec![
                        InputSpec::Unit { unit: 1, output: 0 },
                        InputSpec::Unit { unit: 0, output: 1 },
                    ],
                    outputs: vec![Rate::Audio],
                },
                UnitSpec {
                    name: "Out".into(),
                    rate: Rate::Audio,
                    special_index: 0,
                    inputs: vec![
                        InputSpec::Const { index: 0 },
                        InputSpec::Unit { unit: 2, output: 0 },
                        InputSpec::Unit { unit: 2, output: 0 },
                    ],
                    outputs: vec![],
                },
            ],
        }
    );
    assert!(!ctx.is_defining());
}

#[test]
fn definition_without_params_has_no_control_unit() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let def = ctx
        .build_def("saw", "", |ctx, controls| {
            assert!(controls.is_empty());
            let sig = ctx.ar("LFSaw", &Args::new().arg(110.0))?;
            ctx.ar("Out", &Args::new().arg(0).arg(sig))?;
            Ok(())
        })
        .expect("definition should compile");

    let names: Vec<_> = def.units.iter().map(|unit| unit.name.as_str()).collect();
    assert_eq!(names, vec!["LFSaw", "Out"]);
    assert_eq!(def.consts, vec![110.0, 0.0]);
}

#[test]
fn pan2_outputs_resolve_to_source_channels() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let def = ctx
        .build_def("panned", "", |ctx, _| {
            let sig = ctx.ar("SinOsc", &Args::new())?;
            let stereo = ctx.ar("Pan2", &Args::new().arg(sig))?;
            ctx.ar("Out", &Args::new().arg(0).arg(stereo))?;
            Ok(())
        })
        .expect("definition should compile");

    assert_eq!(def.units[1].name, "Pan2");
    assert_eq!(def.units[1].outputs, vec![Rate::Audio, Rate::Audio]);
    assert_eq!(
        def.units[2].inputs[1..],
        [
            InputSpec::Unit { unit: 1, output: 0 },
            InputSpec::Unit { unit: 1, output: 1 },
        ]
    );
}

#[test]
fn nested_definition_is_rejected_before_inner_nodes_exist() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let inner_ran = Cell::new(false);

    ctx.begin_def().expect("first definition opens");
    let nested = ctx.build_def("inner", "", |_, _| {
        inner_ran.set(true);
        Ok(())
    });
    assert_eq!(nested, Err(GraphError::NestedDefinition));
    assert_eq!(ctx.begin_def(), Err(GraphError::NestedDefinition));
    assert!(!inner_ran.get());

    ctx.ar("SinOsc", &Args::new()).expect("SinOsc.ar");
    let builder = ctx.end_def().expect("outer definition closes");
    assert_eq!(builder.nodes().len(), 1);
    assert_eq!(ctx.end_def().err(), Some(GraphError::NoOpenDefinition));
}

#[test]
fn body_error_closes_definition() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let result = ctx.build_def("broken", "", |ctx, _| {
        ctx.ar("Missing", &Args::new())?;
        Ok(())
    });
    assert_eq!(result, Err(GraphError::UnknownUGen("Missing".into())));
    assert!(!ctx.is_defining());
}

#[test]
fn nodes_from_outside_the_definition_are_rejected() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let stray = ctx.ar("SinOsc", &Args::new()).expect("SinOsc.ar");

    let result = ctx.build_def("leaky", "", |ctx, _| {
        ctx.ar("Out", &Args::new().arg(0).arg(stray.clone()))?;
        Ok(())
    });
    assert_eq!(result, Err(GraphError::ForeignNode("SinOsc".into())));
}

#[test]
fn text_inputs_coerce_to_numbers() {
    let table = builtins();
    let mut ctx = GraphContext::new(&table);
    let def = ctx
        .build_def("coerce", "", |ctx, _| {
            let sig = ctx.ar("SinOsc", &Args::new().arg("220").arg(Value::Num(f64::NAN)))?;
            ctx.ar("Out", &Args::new().arg(0).arg(sig))?;
            Ok(())
        })
        .expect("definition should compile");
    assert_eq!(def.consts, vec![220.0, 0.0]);
}
