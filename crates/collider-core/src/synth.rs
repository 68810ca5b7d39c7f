use crate::bus::{FixNumTable, SyncItems};
use crate::error::CommandError;
use crate::unit::{Inputs, Unit, UnitContext, UnitTable, WireRef};
use collider_ports::{InputSpec, Rate, SynthDefSpec};

/// Per-pass rendering state shared by every synth of an instance.
pub struct RenderContext<'a> {
    pub sample_rate: f32,
    pub buf_length: usize,
    pub frames: usize,
    pub bus: &'a mut [f32],
    pub sync: &'a SyncItems,
}

fn wire_len(rate: Rate, buf_length: usize) -> usize {
    match rate {
        Rate::Audio => buf_length,
        Rate::Control | Rate::Scalar => 1,
    }
}

/// A running instance of a compiled definition.
///
/// Units run in definition order; every input must come from an earlier
/// unit or the constant table, so one forward pass renders the graph.
pub struct Synth {
    def_name: String,
    units: Vec<Box<dyn Unit>>,
    inputs: Vec<Vec<WireRef>>,
    offsets: Vec<usize>,
    wires: Vec<Vec<f32>>,
    params: Vec<f32>,
}

impl Synth {
    pub fn new(
        def: &SynthDefSpec,
        table: &UnitTable,
        fix_nums: &mut FixNumTable,
        buf_length: usize,
    ) -> Result<Self, CommandError> {
        let mut units = Vec::with_capacity(def.units.len());
        let mut inputs = Vec::with_capacity(def.units.len());
        let mut offsets = Vec::with_capacity(def.units.len());
        let mut wires = Vec::new();

        for (index, spec) in def.units.iter().enumerate() {
            let unit = table.create(spec)?;
            let refs = spec
                .inputs
                .iter()
                .map(|input| match *input {
                    InputSpec::Const { index: slot } => def
                        .consts
                        .get(slot)
                        .map(|&value| WireRef::Const(fix_nums.get(value)))
                        .ok_or(CommandError::MissingConst { unit: index, index: slot }),
                    InputSpec::Unit { unit, output } => {
                        if unit >= index {
                            return Err(CommandError::UnorderedInput {
                                unit: index,
                                source_unit: unit,
                            });
                        }
                        if output >= def.units[unit].outputs.len() {
                            return Err(CommandError::MissingOutput {
                                unit: index,
                                source_unit: unit,
                                output,
                            });
                        }
                        Ok(WireRef::Wire(offsets[unit] + output))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;

            offsets.push(wires.len());
            wires.extend(spec.outputs.iter().map(|&rate| vec![0.0; wire_len(rate, buf_length)]));
            units.push(unit);
            inputs.push(refs);
        }

        Ok(Self {
            def_name: def.name.clone(),
            units,
            inputs,
            offsets,
            wires,
            params: def.params.iter().map(|p| p.default).collect(),
        })
    }

    pub fn def_name(&self) -> &str {
        &self.def_name
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    /// Returns false when `index` is out of range.
    pub fn set_param(&mut self, index: usize, value: f32) -> bool {
        match self.params.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn num_units(&self) -> usize {
        self.units.len()
    }

    /// Latest samples of output `output` of unit `unit`.
    pub fn output(&self, unit: usize, output: usize) -> Option<&[f32]> {
        let start = *self.offsets.get(unit)?;
        let end = self.offsets.get(unit + 1).copied().unwrap_or(self.wires.len());
        if start + output >= end {
            return None;
        }
        self.wires.get(start + output).map(Vec::as_slice)
    }

    pub fn process(&mut self, render: &mut RenderContext<'_>) {
        let Synth {
            units,
            inputs,
            offsets,
            wires,
            params,
            ..
        } = self;
        let total = wires.len();
        for (index, unit) in units.iter_mut().enumerate() {
            let start = offsets[index];
            let end = offsets.get(index + 1).copied().unwrap_or(total);
            let (done, rest) = wires.split_at_mut(start);
            let unit_inputs = Inputs::new(done, &inputs[index]);
            let mut ctx = UnitContext {
                sample_rate: render.sample_rate,
                buf_length: render.buf_length,
                frames: render.frames,
                params: params.as_slice(),
                bus: &mut *render.bus,
                sync: render.sync,
            };
            unit.process(&unit_inputs, &mut rest[..end - start], &mut ctx);
        }
    }
}
