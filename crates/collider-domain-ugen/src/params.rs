use crate::error::GraphError;
use crate::value::Value;

/// Arguments of one constructor call: positional values plus an optional
/// set of keyed overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keyed: Vec<(String, Value)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn key(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyed.push((name.into(), value.into()));
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyed(&self) -> &[(String, Value)] {
        &self.keyed
    }
}

impl From<Vec<Value>> for Args {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            keyed: Vec::new(),
        }
    }
}

/// Ordered `name=value` declaration of a constructor's parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    names: Vec<String>,
    defaults: Vec<Value>,
}

impl ParamList {
    /// Parses declarations such as `"freq=440,phase=0,mul=1,add=0"`. A name
    /// without `=value` defaults to 0.
    pub fn parse(decl: &str) -> Result<Self, GraphError> {
        let mut list = Self::default();
        if decl.trim().is_empty() {
            return Ok(list);
        }
        for item in decl.split(',') {
            let mut parts = item.splitn(2, '=');
            let name = parts.next().unwrap_or_default().trim();
            if name.is_empty() {
                return Err(GraphError::InvalidDeclaration(decl.to_string()));
            }
            let default = match parts.next() {
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| GraphError::InvalidDeclaration(decl.to_string()))?,
                None => 0.0,
            };
            list.push(name, Value::Num(default));
        }
        Ok(list)
    }

    pub fn push(&mut self, name: impl Into<String>, default: Value) {
        self.names.push(name.into());
        self.defaults.push(default);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn defaults(&self) -> &[Value] {
        &self.defaults
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Binds a call's arguments: positional values fill from the front, keyed
    /// values then override by name, and everything else keeps its default.
    /// Surplus positional values and unknown keys are ignored.
    pub fn resolve(&self, args: &Args) -> Vec<Value> {
        let mut resolved = self.defaults.clone();
        for (slot, value) in resolved.iter_mut().zip(args.positional()) {
            *slot = value.clone();
        }
        for (name, value) in args.keyed() {
            if let Some(index) = self.index_of(name) {
                resolved[index] = value.clone();
            }
        }
        resolved
    }
}

/// Multichannel expansion: when any argument is a sequence, returns one
/// argument row per index up to the longest sequence, each sequence
/// contributing its element at `index % len`. `None` when nothing expands.
pub fn expand(args: &[Value]) -> Option<Vec<Vec<Value>>> {
    let len = args.iter().filter_map(|arg| arg.as_seq().map(<[Value]>::len)).max()?;
    let rows = (0..len)
        .map(|i| {
            args.iter()
                .map(|arg| match arg {
                    Value::Seq(items) if !items.is_empty() => items[i % items.len()].clone(),
                    other => other.clone(),
                })
                .collect()
        })
        .collect();
    Some(rows)
}
