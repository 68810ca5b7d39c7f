use crate::types::Rate;
use serde::{Deserialize, Serialize};

/// Compiled synth definition as exchanged between the language layer and the
/// engine. Units are listed in evaluation order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SynthDefSpec {
    pub name: String,
    pub consts: Vec<f32>,
    pub params: Vec<ParamSpec>,
    pub units: Vec<UnitSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub default: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    pub rate: Rate,
    pub special_index: i32,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<Rate>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputSpec {
    Const { index: usize },
    Unit { unit: usize, output: usize },
}

impl SynthDefSpec {
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}
