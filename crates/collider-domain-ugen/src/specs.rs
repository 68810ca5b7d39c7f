use crate::context::GraphContext;
use crate::error::GraphError;
use crate::registry::{CtorSpec, UGenTable};
use crate::ugen::UGen;
use crate::value::Value;
use collider_ports::Rate;

const OSC: &str = "freq=440,phase=0,mul=1,add=0";
const OSC_FB: &str = "freq=440,feedback=0,mul=1,add=0";
const LF_OSC: &str = "freq=440,iphase=0,mul=1,add=0";
const LF_PULSE: &str = "freq=440,iphase=0,width=0.5,mul=1,add=0";
const PAN2: &str = "in=0,pos=0,level=1";
const OUT: &str = "bus=0,channelsArray=0";

pub(crate) fn register_builtins(table: &mut UGenTable) -> Result<(), GraphError> {
    for rate in [Rate::Audio, Rate::Control] {
        table.register("SinOsc", rate, CtorSpec::new(OSC, two_input_osc))?;
        table.register("SinOscFB", rate, CtorSpec::new(OSC_FB, two_input_osc))?;
        table.register("LFSaw", rate, CtorSpec::new(LF_OSC, two_input_osc))?;
        table.register("LFTri", rate, CtorSpec::new(LF_OSC, two_input_osc))?;
        table.register("LFPulse", rate, CtorSpec::new(LF_PULSE, pulse).unipolar())?;
        table.register("Pan2", rate, CtorSpec::new(PAN2, pan2))?;
        table.register("Out", rate, CtorSpec::new(OUT, out).single_call())?;
    }
    Ok(())
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Num(0.0))
}

fn two_input_osc(
    ctx: &mut GraphContext<'_>,
    ugen: UGen,
    rate: Rate,
    args: &[Value],
) -> Result<Value, GraphError> {
    let node = ctx.init(ugen, rate, &[arg(args, 0), arg(args, 1)]);
    ctx.madd(&Value::UGen(node), &arg(args, 2), &arg(args, 3))
}

fn pulse(
    ctx: &mut GraphContext<'_>,
    ugen: UGen,
    rate: Rate,
    args: &[Value],
) -> Result<Value, GraphError> {
    let node = ctx.init(ugen, rate, &[arg(args, 0), arg(args, 1), arg(args, 2)]);
    ctx.madd(&Value::UGen(node), &arg(args, 3), &arg(args, 4))
}

fn pan2(
    ctx: &mut GraphContext<'_>,
    ugen: UGen,
    rate: Rate,
    args: &[Value],
) -> Result<Value, GraphError> {
    Ok(ctx.init_outputs(ugen, rate, &[arg(args, 0), arg(args, 1), arg(args, 2)], 2))
}

// Channel arrays are flattened into the node's inputs after the bus index.
fn out(
    ctx: &mut GraphContext<'_>,
    ugen: UGen,
    rate: Rate,
    args: &[Value],
) -> Result<Value, GraphError> {
    let node = ctx.init(ugen.with_outputs(0), rate, &[arg(args, 0), arg(args, 1)]);
    Ok(Value::UGen(node))
}
