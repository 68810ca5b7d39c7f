use super::{Inputs, Unit, UnitContext};
use crate::guards::avoid_zero;
use collider_domain_ugen::{BinaryOp, UnaryOp};
use collider_ports::UnitSpec;

/// Publishes the synth's parameters, starting at `special_index`.
pub struct Control {
    offset: usize,
}

impl Control {
    pub fn create(spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self {
            offset: spec.special_index.max(0) as usize,
        })
    }
}

impl Unit for Control {
    fn process(&mut self, _inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], ctx: &mut UnitContext<'_>) {
        for (index, out) in outputs.iter_mut().enumerate() {
            let value = ctx.params.get(self.offset + index).copied().unwrap_or(0.0);
            out.fill(value);
        }
    }
}

pub struct BinaryOpUnit {
    op: Option<BinaryOp>,
}

impl BinaryOpUnit {
    pub fn create(spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self {
            op: BinaryOp::from_special_index(spec.special_index),
        })
    }
}

impl Unit for BinaryOpUnit {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], _ctx: &mut UnitContext<'_>) {
        let Some(out) = outputs.first_mut() else {
            return;
        };
        let Some(op) = self.op else {
            out.fill(0.0);
            return;
        };
        let guard_denominator = matches!(op, BinaryOp::Div | BinaryOp::Mod);
        for (frame, sample) in out.iter_mut().enumerate() {
            let a = inputs.at(0, frame);
            let mut b = inputs.at(1, frame);
            if guard_denominator {
                b = avoid_zero(b);
            }
            *sample = op.apply(a as f64, b as f64) as f32;
        }
    }
}

pub struct UnaryOpUnit {
    op: Option<UnaryOp>,
}

impl UnaryOpUnit {
    pub fn create(spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self {
            op: UnaryOp::from_special_index(spec.special_index),
        })
    }
}

impl Unit for UnaryOpUnit {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], _ctx: &mut UnitContext<'_>) {
        let Some(out) = outputs.first_mut() else {
            return;
        };
        let Some(op) = self.op else {
            out.fill(0.0);
            return;
        };
        for (frame, sample) in out.iter_mut().enumerate() {
            let mut a = inputs.at(0, frame);
            if op == UnaryOp::Reciprocal {
                a = avoid_zero(a);
            }
            *sample = op.apply(a as f64) as f32;
        }
    }
}

pub struct MulAdd;

impl MulAdd {
    pub fn create(_spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self)
    }
}

impl Unit for MulAdd {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], _ctx: &mut UnitContext<'_>) {
        let Some(out) = outputs.first_mut() else {
            return;
        };
        for (frame, sample) in out.iter_mut().enumerate() {
            *sample = inputs.at(0, frame) * inputs.at(1, frame) + inputs.at(2, frame);
        }
    }
}
