use crate::ugen::UGenRef;
use std::fmt;
use std::rc::Rc;

/// Operand accepted by the graph arithmetic protocol.
#[derive(Clone, Debug)]
pub enum Value {
    Num(f64),
    Seq(Vec<Value>),
    Text(String),
    UGen(UGenRef),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Seq(_) => "sequence",
            Value::Text(_) => "text",
            Value::UGen(_) => "ugen",
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_ugen(&self) -> Option<&UGenRef> {
        match self {
            Value::UGen(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric coercion used for non-node graph inputs: anything that is not
    /// a finite-or-infinite number becomes 0.
    pub fn to_input_number(&self) -> f64 {
        let n = match self {
            Value::Num(n) => *n,
            Value::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
            Value::Seq(_) | Value::UGen(_) => 0.0,
        };
        if n.is_nan() {
            0.0
        } else {
            n
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::UGen(a), Value::UGen(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n}"),
            Value::Text(text) => f.write_str(text),
            Value::UGen(node) => f.write_str(node.name()),
            Value::Seq(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Num(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Num(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Num(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<UGenRef> for Value {
    fn from(value: UGenRef) -> Self {
        Value::UGen(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Seq(values.into_iter().map(Into::into).collect())
    }
}
