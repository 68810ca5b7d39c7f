use crate::context::GraphContext;
use crate::error::GraphError;
use crate::params::ParamList;
use crate::ugen::UGen;
use crate::value::Value;
use collider_ports::{Rate, SignalRange};
use std::collections::HashMap;
use std::fmt;

pub type BuildFn = fn(&mut GraphContext<'_>, UGen, Rate, &[Value]) -> Result<Value, GraphError>;

/// Registration input for one `(name, rate)` constructor.
#[derive(Clone, Copy)]
pub struct CtorSpec {
    pub defaults: &'static str,
    pub build: BuildFn,
    pub multi_call: bool,
    pub signal_range: SignalRange,
}

impl CtorSpec {
    pub fn new(defaults: &'static str, build: BuildFn) -> Self {
        Self {
            defaults,
            build,
            multi_call: true,
            signal_range: SignalRange::Bipolar,
        }
    }

    pub fn unipolar(mut self) -> Self {
        self.signal_range = SignalRange::Unipolar;
        self
    }

    pub fn single_call(mut self) -> Self {
        self.multi_call = false;
        self
    }
}

#[derive(Clone)]
pub struct Constructor {
    pub(crate) params: ParamList,
    pub(crate) build: BuildFn,
    pub(crate) multi_call: bool,
    pub(crate) signal_range: SignalRange,
}

impl Constructor {
    pub fn params(&self) -> &ParamList {
        &self.params
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .field("multi_call", &self.multi_call)
            .field("signal_range", &self.signal_range)
            .finish()
    }
}

/// Table of UGen constructors, built once and handed to every
/// [`GraphContext`] by reference.
#[derive(Clone, Debug, Default)]
pub struct UGenTable {
    ctors: HashMap<String, HashMap<Rate, Constructor>>,
}

impl UGenTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Result<Self, GraphError> {
        let mut table = Self::new();
        crate::specs::register_builtins(&mut table)?;
        Ok(table)
    }

    /// Registers a constructor. Every constructor gets an implicit trailing
    /// `tag` parameter.
    pub fn register(&mut self, name: &str, rate: Rate, spec: CtorSpec) -> Result<(), GraphError> {
        let mut params = ParamList::parse(spec.defaults)?;
        params.push("tag", Value::Text(String::new()));
        let by_rate = self.ctors.entry(name.to_string()).or_default();
        if by_rate.contains_key(&rate) {
            return Err(GraphError::DuplicateConstructor {
                name: name.to_string(),
                method: rate.method(),
            });
        }
        by_rate.insert(
            rate,
            Constructor {
                params,
                build: spec.build,
                multi_call: spec.multi_call,
                signal_range: spec.signal_range,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str, rate: Rate) -> Result<&Constructor, GraphError> {
        let by_rate = self
            .ctors
            .get(name)
            .ok_or_else(|| GraphError::UnknownUGen(name.to_string()))?;
        by_rate.get(&rate).ok_or_else(|| GraphError::UnknownRate {
            name: name.to_string(),
            method: rate.method(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ctors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ctors.keys().map(String::as_str)
    }
}
