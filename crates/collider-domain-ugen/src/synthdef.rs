use crate::error::GraphError;
use crate::params::ParamList;
use crate::ugen::{Input, UGen, UGenRef};
use collider_ports::{InputSpec, ParamSpec, SynthDefSpec, UnitSpec};
use std::collections::HashMap;
use std::rc::Rc;

/// Nodes registered while a definition is open, in creation order. Inputs
/// always exist before the node consuming them, so this order is already a
/// valid evaluation order.
#[derive(Debug, Default)]
pub struct DefBuilder {
    nodes: Vec<UGenRef>,
}

impl DefBuilder {
    pub(crate) fn push(&mut self, node: UGenRef) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[UGenRef] {
        &self.nodes
    }

    pub fn compile(&self, name: &str, params: &ParamList) -> Result<SynthDefSpec, GraphError> {
        let mut unit_index: HashMap<*const UGen, usize> = HashMap::new();
        let mut const_index: HashMap<u32, usize> = HashMap::new();
        let mut consts: Vec<f32> = Vec::new();
        let mut units = Vec::with_capacity(self.nodes.len());

        for node in self.nodes.iter().filter(|node| !node.is_output_proxy()) {
            let mut inputs = Vec::with_capacity(node.num_inputs());
            for input in node.inputs() {
                let spec = match input {
                    Input::Const(value) => {
                        let value = *value as f32;
                        let index = *const_index.entry(value.to_bits()).or_insert_with(|| {
                            consts.push(value);
                            consts.len() - 1
                        });
                        InputSpec::Const { index }
                    }
                    Input::Node(input_node) => {
                        let (source, output) = match input_node.source() {
                            Some(source) => (source, input_node.output_index()),
                            None => (input_node, 0),
                        };
                        let unit = unit_index
                            .get(&Rc::as_ptr(source))
                            .copied()
                            .ok_or_else(|| GraphError::ForeignNode(source.name().to_string()))?;
                        InputSpec::Unit { unit, output }
                    }
                };
                inputs.push(spec);
            }

            unit_index.insert(Rc::as_ptr(node), units.len());
            units.push(UnitSpec {
                name: node.name().to_string(),
                rate: node.rate(),
                special_index: node.special_index(),
                inputs,
                outputs: node.output_rates(),
            });
        }

        let params = params
            .names()
            .iter()
            .zip(params.defaults())
            .map(|(name, default)| ParamSpec {
                name: name.clone(),
                default: default.to_input_number() as f32,
            })
            .collect();

        Ok(SynthDefSpec {
            name: name.to_string(),
            consts,
            params,
            units,
        })
    }
}
