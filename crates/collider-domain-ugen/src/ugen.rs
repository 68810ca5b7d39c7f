use crate::value::Value;
use collider_ports::{Rate, SignalRange};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub type UGenRef = Rc<UGen>;

#[derive(Clone, Debug)]
pub enum Input {
    Node(UGenRef),
    Const(f64),
}

impl Input {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::UGen(node) => Input::Node(Rc::clone(node)),
            other => Input::Const(other.to_input_number()),
        }
    }

    pub fn rate(&self) -> Rate {
        match self {
            Input::Node(node) => node.rate(),
            Input::Const(_) => Rate::Scalar,
        }
    }

    pub fn as_const(&self) -> Option<f64> {
        match self {
            Input::Const(value) => Some(*value),
            Input::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&UGenRef> {
        match self {
            Input::Node(node) => Some(node),
            Input::Const(_) => None,
        }
    }
}

/// Flattens nested sequences into a flat input list and coerces everything
/// that is not a node to a number.
pub fn normalize_inputs(values: &[Value]) -> Vec<Input> {
    let mut inputs = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Seq(items) => inputs.extend(normalize_inputs(items)),
            other => inputs.push(Input::from_value(other)),
        }
    }
    inputs
}

#[derive(Debug)]
enum Shape {
    Single,
    // Proxies hold their source strongly; the source sees them and itself
    // weakly, and rebuilds any proxy nobody holds anymore.
    MultiOut {
        this: Weak<UGen>,
        channels: RefCell<Vec<Weak<UGen>>>,
    },
    OutputProxy,
}

/// One node of a synthesis graph.
#[derive(Debug)]
pub struct UGen {
    name: String,
    rate: Rate,
    signal_range: SignalRange,
    special_index: i32,
    output_index: usize,
    inputs: Vec<Input>,
    num_outputs: usize,
    tag: String,
    shape: Shape,
}

impl UGen {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rate: Rate::Audio,
            signal_range: SignalRange::Bipolar,
            special_index: 0,
            output_index: 0,
            inputs: Vec::new(),
            num_outputs: 1,
            tag: String::new(),
            shape: Shape::Single,
        }
    }

    pub fn with_signal_range(mut self, signal_range: SignalRange) -> Self {
        self.signal_range = signal_range;
        self
    }

    pub fn with_special_index(mut self, special_index: i32) -> Self {
        self.special_index = special_index;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_outputs(mut self, num_outputs: usize) -> Self {
        self.num_outputs = num_outputs;
        self
    }

    pub(crate) fn initialized(mut self, rate: Rate, inputs: Vec<Input>) -> Self {
        self.rate = rate;
        self.inputs = inputs;
        self
    }

    pub(crate) fn multi_out(
        mut self,
        rate: Rate,
        inputs: Vec<Input>,
        num_outputs: usize,
        this: Weak<UGen>,
    ) -> Self {
        self.rate = rate;
        self.inputs = inputs;
        self.num_outputs = num_outputs;
        self.shape = Shape::MultiOut {
            this,
            channels: RefCell::new(Vec::with_capacity(num_outputs)),
        };
        self
    }

    pub(crate) fn output_proxy(rate: Rate, source: &UGenRef, index: usize) -> Self {
        Self {
            name: "OutputProxy".to_string(),
            rate,
            signal_range: source.signal_range,
            special_index: 0,
            output_index: index,
            inputs: vec![Input::Node(Rc::clone(source))],
            num_outputs: 1,
            tag: String::new(),
            shape: Shape::OutputProxy,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn signal_range(&self) -> SignalRange {
        self.signal_range
    }

    pub fn special_index(&self) -> i32 {
        self.special_index
    }

    pub fn output_index(&self) -> usize {
        self.output_index
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    pub fn output_rates(&self) -> Vec<Rate> {
        vec![self.rate; self.num_outputs]
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_multi_out(&self) -> bool {
        matches!(self.shape, Shape::MultiOut { .. })
    }

    pub fn is_output_proxy(&self) -> bool {
        matches!(self.shape, Shape::OutputProxy)
    }

    /// Node a proxy reads from; `None` for anything but an output proxy.
    pub fn source(&self) -> Option<&UGenRef> {
        match self.shape {
            Shape::OutputProxy => self.inputs.first().and_then(Input::as_node),
            _ => None,
        }
    }

    /// Output proxies of a multi-output node, one per output in output order.
    pub fn channels(&self) -> Vec<UGenRef> {
        let Shape::MultiOut { this, channels } = &self.shape else {
            return Vec::new();
        };
        let Some(source) = this.upgrade() else {
            return Vec::new();
        };
        let mut slots = channels.borrow_mut();
        slots.resize_with(self.num_outputs, Weak::new);
        slots
            .iter_mut()
            .enumerate()
            .map(|(index, slot)| match slot.upgrade() {
                Some(proxy) => proxy,
                None => {
                    let proxy = Rc::new(UGen::output_proxy(self.rate, &source, index));
                    *slot = Rc::downgrade(&proxy);
                    proxy
                }
            })
            .collect()
    }
}

pub(crate) fn value_rate(value: &Value) -> Rate {
    match value {
        Value::UGen(node) => node.rate(),
        Value::Seq(items) => items.iter().map(value_rate).max().unwrap_or(Rate::Scalar),
        Value::Num(_) | Value::Text(_) => Rate::Scalar,
    }
}
