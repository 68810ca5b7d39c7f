use super::{Inputs, Unit, UnitContext};
use collider_ports::UnitSpec;
use std::f32::consts::TAU;

fn wrap_unit(phase: f32) -> f32 {
    phase - phase.floor()
}

/// Sine oscillator. Inputs: freq, phase (radians).
#[derive(Default)]
pub struct SinOsc {
    cycle: f32,
}

impl SinOsc {
    pub fn create(_spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self::default())
    }
}

impl Unit for SinOsc {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], ctx: &mut UnitContext<'_>) {
        let Some(out) = outputs.first_mut() else {
            return;
        };
        let dt = ctx.sample_duration(out.len());
        for (frame, sample) in out.iter_mut().enumerate() {
            let freq = inputs.at(0, frame);
            let phase = inputs.at(1, frame);
            *sample = (TAU * self.cycle + phase).sin();
            self.cycle = wrap_unit(self.cycle + freq * dt);
        }
    }
}

/// Sine oscillator with phase modulation by its own previous output.
/// Inputs: freq, feedback.
#[derive(Default)]
pub struct SinOscFB {
    cycle: f32,
    last: f32,
}

impl SinOscFB {
    pub fn create(_spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self::default())
    }
}

impl Unit for SinOscFB {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], ctx: &mut UnitContext<'_>) {
        let Some(out) = outputs.first_mut() else {
            return;
        };
        let dt = ctx.sample_duration(out.len());
        for (frame, sample) in out.iter_mut().enumerate() {
            let freq = inputs.at(0, frame);
            let feedback = inputs.at(1, frame);
            self.last = (TAU * self.cycle + feedback * self.last).sin();
            *sample = self.last;
            self.cycle = wrap_unit(self.cycle + freq * dt);
        }
    }
}

/// Rising ramp in [-1, 1). Inputs: freq, iphase (0..2).
#[derive(Default)]
pub struct LFSaw {
    phase: Option<f32>,
}

impl LFSaw {
    pub fn create(_spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self::default())
    }
}

impl Unit for LFSaw {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], ctx: &mut UnitContext<'_>) {
        let Some(out) = outputs.first_mut() else {
            return;
        };
        let dt = ctx.sample_duration(out.len());
        let mut phase = self
            .phase
            .unwrap_or_else(|| 2.0 * wrap_unit((inputs.first(1) + 1.0) * 0.5) - 1.0);
        for (frame, sample) in out.iter_mut().enumerate() {
            *sample = phase;
            phase += 2.0 * inputs.at(0, frame) * dt;
            phase = 2.0 * wrap_unit((phase + 1.0) * 0.5) - 1.0;
        }
        self.phase = Some(phase);
    }
}

/// Triangle in [-1, 1] starting at zero and rising. Inputs: freq, iphase (0..4).
#[derive(Default)]
pub struct LFTri {
    phase: Option<f32>,
}

impl LFTri {
    pub fn create(_spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self::default())
    }
}

fn triangle(phase: f32) -> f32 {
    if phase < 1.0 {
        phase
    } else if phase < 3.0 {
        2.0 - phase
    } else {
        phase - 4.0
    }
}

impl Unit for LFTri {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], ctx: &mut UnitContext<'_>) {
        let Some(out) = outputs.first_mut() else {
            return;
        };
        let dt = ctx.sample_duration(out.len());
        let mut phase = self
            .phase
            .unwrap_or_else(|| 4.0 * wrap_unit(inputs.first(1) * 0.25));
        for (frame, sample) in out.iter_mut().enumerate() {
            *sample = triangle(phase);
            phase = 4.0 * wrap_unit((phase + 4.0 * inputs.at(0, frame) * dt) * 0.25);
        }
        self.phase = Some(phase);
    }
}

/// Unipolar pulse. Inputs: freq, iphase (0..1), width.
#[derive(Default)]
pub struct LFPulse {
    phase: Option<f32>,
}

impl LFPulse {
    pub fn create(_spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self::default())
    }
}

impl Unit for LFPulse {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], ctx: &mut UnitContext<'_>) {
        let Some(out) = outputs.first_mut() else {
            return;
        };
        let dt = ctx.sample_duration(out.len());
        let mut phase = self.phase.unwrap_or_else(|| wrap_unit(inputs.first(1)));
        for (frame, sample) in out.iter_mut().enumerate() {
            let width = inputs.at(2, frame);
            *sample = if phase < width { 1.0 } else { 0.0 };
            phase = wrap_unit(phase + inputs.at(0, frame) * dt);
        }
        self.phase = Some(phase);
    }
}
