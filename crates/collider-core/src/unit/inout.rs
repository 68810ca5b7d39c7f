use super::{Inputs, Unit, UnitContext};
use collider_ports::{Rate, UnitSpec, AUDIO_BUS_LEN, CONTROL_BUS_LEN};
use std::f32::consts::FRAC_PI_4;

/// Equal-power stereo panner. Inputs: in, pos (-1..1), level.
pub struct Pan2;

impl Pan2 {
    pub fn create(_spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self)
    }
}

impl Unit for Pan2 {
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], _ctx: &mut UnitContext<'_>) {
        let [left, right] = outputs else {
            return;
        };
        for (frame, (l, r)) in left.iter_mut().zip(right.iter_mut()).enumerate() {
            let input = inputs.at(0, frame) * inputs.at(2, frame);
            let angle = (inputs.at(1, frame).clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
            *l = input * angle.cos();
            *r = input * angle.sin();
        }
    }
}

/// Sums its channel inputs onto the instance bus. Inputs: bus, channels...
///
/// Audio-rate Out writes whole audio channels, control-rate Out writes single
/// slots of the control region. Writes past either region are dropped.
pub struct Out {
    rate: Rate,
}

impl Out {
    pub fn create(spec: &UnitSpec) -> Box<dyn Unit> {
        Box::new(Self { rate: spec.rate })
    }
}

impl Unit for Out {
    fn process(&mut self, inputs: &Inputs<'_>, _outputs: &mut [Vec<f32>], ctx: &mut UnitContext<'_>) {
        let first = inputs.first(0);
        if !(first >= 0.0) {
            return;
        }
        let first = first as usize;
        let channels = inputs.len().saturating_sub(1);
        match self.rate {
            Rate::Audio => {
                for channel in 0..channels {
                    let bus_channel = first + channel;
                    if bus_channel >= AUDIO_BUS_LEN {
                        break;
                    }
                    let start = bus_channel * ctx.buf_length;
                    let Some(dst) = ctx.bus.get_mut(start..start + ctx.frames) else {
                        break;
                    };
                    for (frame, sample) in dst.iter_mut().enumerate() {
                        *sample += inputs.at(channel + 1, frame);
                    }
                }
            }
            Rate::Control | Rate::Scalar => {
                let offset = ctx.buf_length * AUDIO_BUS_LEN;
                for channel in 0..channels {
                    let slot = first + channel;
                    if slot >= CONTROL_BUS_LEN {
                        break;
                    }
                    if let Some(sample) = ctx.bus.get_mut(offset + slot) {
                        *sample += inputs.first(channel + 1);
                    }
                }
            }
        }
    }
}
