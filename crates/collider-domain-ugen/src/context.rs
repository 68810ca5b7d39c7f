use crate::error::GraphError;
use crate::ops::{BinaryOp, UnaryOp};
use crate::params::{expand, Args, ParamList};
use crate::registry::{Constructor, UGenTable};
use crate::synthdef::DefBuilder;
use crate::ugen::{normalize_inputs, UGen, UGenRef};
use crate::value::Value;
use collider_ports::{Rate, SignalRange, SynthDefSpec};
use std::rc::{Rc, Weak};

/// Graph construction state: the constructor table and the synth-definition
/// builder currently collecting nodes, if any.
pub struct GraphContext<'t> {
    table: &'t UGenTable,
    open: Option<DefBuilder>,
}

impl<'t> GraphContext<'t> {
    pub fn new(table: &'t UGenTable) -> Self {
        Self { table, open: None }
    }

    pub fn table(&self) -> &'t UGenTable {
        self.table
    }

    /// Assigns rate and normalized inputs, then registers the node with the
    /// open definition.
    pub fn init(&mut self, ugen: UGen, rate: Rate, inputs: &[Value]) -> UGenRef {
        let node = Rc::new(ugen.initialized(rate, normalize_inputs(inputs)));
        self.register(&node);
        node
    }

    /// Multi-output variant of [`init`](Self::init). Returns the single proxy
    /// when `num_channels == 1`, otherwise the proxies in output order.
    pub fn init_outputs(
        &mut self,
        ugen: UGen,
        rate: Rate,
        inputs: &[Value],
        num_channels: usize,
    ) -> Value {
        let inputs = normalize_inputs(inputs);
        let source =
            Rc::new_cyclic(|this| ugen.multi_out(rate, inputs, num_channels, Weak::clone(this)));
        self.register(&source);
        let mut channels = source.channels();
        if num_channels == 1 {
            match channels.pop() {
                Some(proxy) => Value::UGen(proxy),
                None => Value::Seq(Vec::new()),
            }
        } else {
            Value::Seq(channels.into_iter().map(Value::UGen).collect())
        }
    }

    fn register(&mut self, node: &UGenRef) {
        if let Some(builder) = self.open.as_mut() {
            builder.push(Rc::clone(node));
        }
    }

    pub fn is_defining(&self) -> bool {
        self.open.is_some()
    }

    pub fn begin_def(&mut self) -> Result<(), GraphError> {
        if self.open.is_some() {
            return Err(GraphError::NestedDefinition);
        }
        self.open = Some(DefBuilder::default());
        Ok(())
    }

    pub fn end_def(&mut self) -> Result<DefBuilder, GraphError> {
        self.open.take().ok_or(GraphError::NoOpenDefinition)
    }

    /// Builds and compiles a synth definition. `params` declares the synth's
    /// controls (`"freq=440,amp=0.5"`); `body` receives one control-rate
    /// value per declared parameter.
    pub fn build_def<F>(&mut self, name: &str, params: &str, body: F) -> Result<SynthDefSpec, GraphError>
    where
        F: FnOnce(&mut Self, &[Value]) -> Result<(), GraphError>,
    {
        let params = ParamList::parse(params)?;
        self.begin_def()?;
        let controls = match params.len() {
            0 => Vec::new(),
            n => match self.init_outputs(UGen::new("Control"), Rate::Control, &[], n) {
                Value::Seq(items) => items,
                single => vec![single],
            },
        };
        let result = body(self, &controls);
        let builder = self.end_def()?;
        result?;
        builder.compile(name, &params)
    }

    /// Calls a registered constructor, e.g. `call("SinOsc", Rate::Audio, args)`.
    pub fn call(&mut self, name: &str, rate: Rate, args: &Args) -> Result<Value, GraphError> {
        let table = self.table;
        let ctor = table.lookup(name, rate)?;
        let mut resolved = ctor.params.resolve(args);
        let tag = match resolved.pop() {
            Some(Value::Text(tag)) => tag,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        self.call_resolved(name, ctor, rate, &resolved, &tag)
    }

    pub fn ar(&mut self, name: &str, args: &Args) -> Result<Value, GraphError> {
        self.call(name, Rate::Audio, args)
    }

    pub fn kr(&mut self, name: &str, args: &Args) -> Result<Value, GraphError> {
        self.call(name, Rate::Control, args)
    }

    fn call_resolved(
        &mut self,
        name: &str,
        ctor: &Constructor,
        rate: Rate,
        args: &[Value],
        tag: &str,
    ) -> Result<Value, GraphError> {
        if ctor.multi_call {
            if let Some(rows) = expand(args) {
                return rows
                    .iter()
                    .map(|row| self.call_resolved(name, ctor, rate, row, tag))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Seq);
            }
        }
        let ugen = UGen::new(name)
            .with_signal_range(ctor.signal_range)
            .with_tag(tag);
        (ctor.build)(self, ugen, rate, args)
    }

    /// `src * mul + add` as a `MulAdd` node at the source's rate.
    pub fn madd(&mut self, src: &Value, mul: &Value, add: &Value) -> Result<Value, GraphError> {
        let args = [src.clone(), mul.clone(), add.clone()];
        if let Some(rows) = expand(&args) {
            return rows
                .iter()
                .map(|row| self.madd(&row[0], &row[1], &row[2]))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Seq);
        }
        match src {
            Value::UGen(node) => {
                if mul.as_num() == Some(1.0) && add.as_num() == Some(0.0) {
                    return Ok(src.clone());
                }
                let rate = node.rate();
                Ok(Value::UGen(self.init(UGen::new("MulAdd"), rate, &args)))
            }
            _ => {
                let scaled = self.binary(BinaryOp::Mul, src, mul)?;
                self.binary(BinaryOp::Add, &scaled, add)
            }
        }
    }

    /// Maps the source's natural range onto `lo..hi`.
    pub fn range(&mut self, src: &Value, lo: &Value, hi: &Value) -> Result<Value, GraphError> {
        match src {
            Value::Seq(items) => items
                .iter()
                .map(|item| self.range(item, lo, hi))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Seq),
            Value::UGen(node) => {
                let span = self.binary(BinaryOp::Sub, hi, lo)?;
                let (mul, add) = match node.signal_range() {
                    SignalRange::Bipolar => {
                        let mul = self.binary(BinaryOp::Mul, &span, &Value::Num(0.5))?;
                        let add = self.binary(BinaryOp::Add, &mul, lo)?;
                        (mul, add)
                    }
                    SignalRange::Unipolar => (span, lo.clone()),
                };
                self.madd(src, &mul, &add)
            }
            _ => Err(GraphError::UnsupportedOperand {
                op: "range",
                kind: src.kind(),
            }),
        }
    }

    pub fn unipolar(&mut self, src: &Value, mul: &Value) -> Result<Value, GraphError> {
        self.range(src, &Value::Num(0.0), mul)
    }

    pub fn bipolar(&mut self, src: &Value, mul: &Value) -> Result<Value, GraphError> {
        let lo = self.unary(UnaryOp::Neg, mul)?;
        self.range(src, &lo, mul)
    }
}
