//! Realtime counterparts of compiled graph nodes.
//!
//! Every unit output is a wire: audio-rate wires hold one sample per frame,
//! control and scalar wires hold a single sample that broadcasts to every
//! frame of a consumer.

pub mod inout;
pub mod ops;
pub mod osc;

use crate::bus::{FixNum, SyncItems};
use crate::error::CommandError;
use collider_ports::UnitSpec;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum WireRef {
    Wire(usize),
    Const(Arc<FixNum>),
}

/// Read-only view of a unit's inputs.
pub struct Inputs<'a> {
    wires: &'a [Vec<f32>],
    refs: &'a [WireRef],
}

impl<'a> Inputs<'a> {
    pub fn new(wires: &'a [Vec<f32>], refs: &'a [WireRef]) -> Self {
        Self { wires, refs }
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn slice(&self, index: usize) -> &'a [f32] {
        match self.refs.get(index) {
            Some(WireRef::Wire(wire)) => self.wires.get(*wire).map(Vec::as_slice).unwrap_or(&[]),
            Some(WireRef::Const(fix)) => fix.outputs(),
            None => &[],
        }
    }

    /// Sample `frame` of input `index`; single-sample inputs broadcast.
    #[inline]
    pub fn at(&self, index: usize, frame: usize) -> f32 {
        let samples = self.slice(index);
        match samples.len() {
            0 => 0.0,
            1 => samples[0],
            len => samples[frame.min(len - 1)],
        }
    }

    #[inline]
    pub fn first(&self, index: usize) -> f32 {
        self.at(index, 0)
    }
}

pub struct UnitContext<'a> {
    pub sample_rate: f32,
    /// Stride between audio channels on the bus.
    pub buf_length: usize,
    /// Frames rendered in this pass.
    pub frames: usize,
    pub params: &'a [f32],
    pub bus: &'a mut [f32],
    pub sync: &'a SyncItems,
}

impl UnitContext<'_> {
    /// Seconds covered by one sample of a wire holding `len` samples.
    pub fn sample_duration(&self, len: usize) -> f32 {
        (self.buf_length / len.max(1)) as f32 / self.sample_rate
    }
}

pub trait Unit: Send {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], ctx: &mut UnitContext<'_>);
}

pub type UnitCtor = fn(&UnitSpec) -> Box<dyn Unit>;

#[derive(Clone, Copy)]
struct UnitEntry {
    ctor: UnitCtor,
    num_outputs: Option<usize>,
}

/// Unit constructors by name, with the output arity each one requires
/// (`None` for variable arity).
#[derive(Clone, Default)]
pub struct UnitTable {
    entries: HashMap<String, UnitEntry>,
}

impl UnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register("Control", None, ops::Control::create);
        table.register("BinaryOpUGen", Some(1), ops::BinaryOpUnit::create);
        table.register("UnaryOpUGen", Some(1), ops::UnaryOpUnit::create);
        table.register("MulAdd", Some(1), ops::MulAdd::create);
        table.register("SinOsc", Some(1), osc::SinOsc::create);
        table.register("SinOscFB", Some(1), osc::SinOscFB::create);
        table.register("LFSaw", Some(1), osc::LFSaw::create);
        table.register("LFTri", Some(1), osc::LFTri::create);
        table.register("LFPulse", Some(1), osc::LFPulse::create);
        table.register("Pan2", Some(2), inout::Pan2::create);
        table.register("Out", Some(0), inout::Out::create);
        table
    }

    pub fn register(&mut self, name: &str, num_outputs: Option<usize>, ctor: UnitCtor) {
        self.entries
            .insert(name.to_string(), UnitEntry { ctor, num_outputs });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn create(&self, spec: &UnitSpec) -> Result<Box<dyn Unit>, CommandError> {
        let entry = self
            .entries
            .get(&spec.name)
            .ok_or_else(|| CommandError::UnknownUnit(spec.name.clone()))?;
        if let Some(expected) = entry.num_outputs {
            if spec.outputs.len() != expected {
                return Err(CommandError::OutputArity {
                    name: spec.name.clone(),
                    expected,
                    actual: spec.outputs.len(),
                });
            }
        }
        Ok((entry.ctor)(spec))
    }
}
