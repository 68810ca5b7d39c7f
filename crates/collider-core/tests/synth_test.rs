use collider_core::{CommandError, FixNumTable, RenderContext, Synth, SyncItems, UnitTable};
use collider_domain_ugen::{Args, GraphContext, GraphError, UGenTable, Value};
use collider_ports::{BusLayout, InputSpec, Rate, SynthDefSpec, AUDIO_BUS_LEN};
use pretty_assertions::assert_eq;

fn compile<F>(params: &str, body: F) -> SynthDefSpec
where
    F: FnOnce(&mut GraphContext<'_>, &[Value]) -> Result<(), GraphError>,
{
    let table = UGenTable::with_builtins().expect("builtins should register");
    let mut ctx = GraphContext::new(&table);
    ctx.build_def("test", params, body)
        .expect("definition should compile")
}

fn instantiate(def: &SynthDefSpec, buf_length: usize) -> Synth {
    let mut fix_nums = FixNumTable::default();
    Synth::new(def, &UnitTable::with_builtins(), &mut fix_nums, buf_length)
        .expect("synth should build")
}

fn render(synth: &mut Synth, sample_rate: f32, layout: BusLayout) -> Vec<f32> {
    let mut bus = vec![0.0; layout.bus_len()];
    let sync = SyncItems::default();
    {
        let mut ctx = RenderContext {
            sample_rate,
            buf_length: layout.buf_length,
            frames: layout.buf_length,
            bus: &mut bus,
            sync: &sync,
        };
        synth.process(&mut ctx);
    }
    bus
}

fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < 1e-5, "sample {index}: {a} != {e}");
    }
}

fn level_def() -> SynthDefSpec {
    compile("amp=0.5", |ctx, controls| {
        let amp = controls[0].clone();
        ctx.ar("Out", &Args::new().arg(0).arg(vec![amp.clone(), amp]))?;
        Ok(())
    })
}

#[test]
fn control_params_broadcast_to_audio_out() {
    let layout = BusLayout::new(8, 2);
    let mut synth = instantiate(&level_def(), layout.buf_length);
    assert_eq!(synth.params(), [0.5]);

    let bus = render(&mut synth, 44_100.0, layout);
    assert_eq!(bus[..16], [0.5; 16]);
    assert!(bus[16..].iter().all(|&s| s == 0.0));

    assert!(synth.set_param(0, 0.25));
    assert!(!synth.set_param(3, 1.0));
    let bus = render(&mut synth, 44_100.0, layout);
    assert_eq!(bus[..16], [0.25; 16]);
}

#[test]
fn sine_steps_by_frequency() {
    let def = compile("", |ctx, _| {
        let sig = ctx.ar("SinOsc", &Args::new().arg(1.0))?;
        ctx.ar("Out", &Args::new().arg(0).arg(sig))?;
        Ok(())
    });
    let layout = BusLayout::new(4, 1);
    let mut synth = instantiate(&def, layout.buf_length);

    let bus = render(&mut synth, 4.0, layout);
    assert_close(&bus[..4], &[0.0, 1.0, 0.0, -1.0]);
    let bus = render(&mut synth, 4.0, layout);
    assert_close(&bus[..4], &[0.0, 1.0, 0.0, -1.0]);
}

#[test]
fn pulse_and_saw_shapes() {
    let def = compile("", |ctx, _| {
        let pulse = ctx.ar("LFPulse", &Args::new().arg(1.0))?;
        let saw = ctx.ar("LFSaw", &Args::new().arg(1.0))?;
        let tri = ctx.ar("LFTri", &Args::new().arg(1.0))?;
        ctx.ar("Out", &Args::new().arg(0).arg(vec![pulse, saw, tri]))?;
        Ok(())
    });
    let layout = BusLayout::new(4, 3);
    let mut synth = instantiate(&def, layout.buf_length);

    let bus = render(&mut synth, 4.0, layout);
    assert_eq!(bus[..4], [1.0, 1.0, 0.0, 0.0]);
    assert_close(&bus[4..8], &[0.0, 0.5, -1.0, -0.5]);
    assert_close(&bus[8..12], &[0.0, 1.0, 0.0, -1.0]);
}

#[test]
fn pan2_center_is_equal_power() {
    let def = compile("", |ctx, _| {
        let stereo = ctx.ar("Pan2", &Args::new().arg(1.0))?;
        ctx.ar("Out", &Args::new().arg(0).arg(stereo))?;
        Ok(())
    });
    let layout = BusLayout::new(2, 2);
    let mut synth = instantiate(&def, layout.buf_length);

    let bus = render(&mut synth, 44_100.0, layout);
    let half = std::f32::consts::FRAC_1_SQRT_2;
    assert_close(&bus[..4], &[half, half, half, half]);
}

#[test]
fn control_out_writes_control_region() {
    let def = compile("", |ctx, _| {
        ctx.kr("Out", &Args::new().arg(3).arg(vec![0.25, 0.5]))?;
        Ok(())
    });
    let layout = BusLayout::new(8, 2);
    let mut synth = instantiate(&def, layout.buf_length);

    let bus = render(&mut synth, 44_100.0, layout);
    let offset = 8 * AUDIO_BUS_LEN;
    assert_eq!(bus[offset + 3], 0.25);
    assert_eq!(bus[offset + 4], 0.5);
    assert!(bus[..offset].iter().all(|&s| s == 0.0));
}

#[test]
fn division_by_zero_uses_guarded_denominator() {
    let def = compile("amp=0.5", |ctx, controls| {
        let ratio = ctx.div(&controls[0], &Value::Num(0.0))?;
        ctx.kr("Out", &Args::new().arg(0).arg(ratio))?;
        Ok(())
    });
    let layout = BusLayout::new(8, 1);
    let mut synth = instantiate(&def, layout.buf_length);

    let bus = render(&mut synth, 44_100.0, layout);
    let value = bus[layout.control_offset()];
    assert!(value.is_finite() && value > 1e5, "got {value}");
}

#[test]
fn constants_are_shared_across_synths() {
    let def = compile("", |ctx, _| {
        let sig = ctx.ar("SinOsc", &Args::new().arg(220.0))?;
        ctx.ar("Out", &Args::new().arg(0).arg(sig))?;
        Ok(())
    });
    let table = UnitTable::with_builtins();
    let mut fix_nums = FixNumTable::default();
    Synth::new(&def, &table, &mut fix_nums, 8).expect("first synth");
    Synth::new(&def, &table, &mut fix_nums, 8).expect("second synth");
    assert_eq!(fix_nums.len(), def.consts.len());
}

#[test]
fn malformed_definitions_are_rejected() {
    let table = UnitTable::with_builtins();
    let mut fix_nums = FixNumTable::default();
    let base = level_def();

    let mut unknown = base.clone();
    unknown.units[1].name = "Nope".into();
    assert_eq!(
        Synth::new(&unknown, &table, &mut fix_nums, 8).err(),
        Some(CommandError::UnknownUnit("Nope".into()))
    );

    let mut arity = base.clone();
    arity.units[1].outputs = vec![Rate::Audio];
    assert_eq!(
        Synth::new(&arity, &table, &mut fix_nums, 8).err(),
        Some(CommandError::OutputArity {
            name: "Out".into(),
            expected: 0,
            actual: 1,
        })
    );

    let mut unordered = base.clone();
    unordered.units[0].inputs = vec![InputSpec::Unit { unit: 1, output: 0 }];
    assert_eq!(
        Synth::new(&unordered, &table, &mut fix_nums, 8).err(),
        Some(CommandError::UnorderedInput {
            unit: 0,
            source_unit: 1,
        })
    );

    let mut missing_output = base.clone();
    missing_output.units[1].inputs[1] = InputSpec::Unit { unit: 0, output: 4 };
    assert_eq!(
        Synth::new(&missing_output, &table, &mut fix_nums, 8).err(),
        Some(CommandError::MissingOutput {
            unit: 1,
            source_unit: 0,
            output: 4,
        })
    );

    let mut missing_const = base;
    missing_const.units[1].inputs[0] = InputSpec::Const { index: 9 };
    assert_eq!(
        Synth::new(&missing_const, &table, &mut fix_nums, 8).err(),
        Some(CommandError::MissingConst { unit: 1, index: 9 })
    );
}
