use crate::context::GraphContext;
use crate::error::GraphError;
use crate::ugen::{value_rate, UGen};
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    Atan2,
    Hypot,
    Pow,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 10] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Min,
        BinaryOp::Max,
        BinaryOp::Atan2,
        BinaryOp::Hypot,
        BinaryOp::Pow,
    ];

    pub fn selector(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
            BinaryOp::Atan2 => "atan2",
            BinaryOp::Hypot => "hypot",
            BinaryOp::Pow => "pow",
        }
    }

    pub fn special_index(self) -> i32 {
        match self {
            BinaryOp::Add => 0,
            BinaryOp::Sub => 1,
            BinaryOp::Mul => 2,
            BinaryOp::Div => 4,
            BinaryOp::Mod => 5,
            BinaryOp::Min => 12,
            BinaryOp::Max => 13,
            BinaryOp::Atan2 => 22,
            BinaryOp::Hypot => 23,
            BinaryOp::Pow => 25,
        }
    }

    pub fn from_special_index(index: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.special_index() == index)
    }

    pub fn from_selector(selector: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.selector() == selector)
    }

    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Mod => a % b,
            BinaryOp::Min => a.min(b),
            BinaryOp::Max => a.max(b),
            BinaryOp::Atan2 => a.atan2(b),
            BinaryOp::Hypot => a.hypot(b),
            BinaryOp::Pow => a.powf(b),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Abs,
    Ceil,
    Floor,
    Frac,
    Sign,
    Squared,
    Cubed,
    Sqrt,
    Exp,
    Reciprocal,
    Midicps,
    Cpsmidi,
    Dbamp,
    Ampdb,
    Log,
    Log2,
    Log10,
    Sin,
    Cos,
    Tan,
    Tanh,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 22] = [
        UnaryOp::Neg,
        UnaryOp::Abs,
        UnaryOp::Ceil,
        UnaryOp::Floor,
        UnaryOp::Frac,
        UnaryOp::Sign,
        UnaryOp::Squared,
        UnaryOp::Cubed,
        UnaryOp::Sqrt,
        UnaryOp::Exp,
        UnaryOp::Reciprocal,
        UnaryOp::Midicps,
        UnaryOp::Cpsmidi,
        UnaryOp::Dbamp,
        UnaryOp::Ampdb,
        UnaryOp::Log,
        UnaryOp::Log2,
        UnaryOp::Log10,
        UnaryOp::Sin,
        UnaryOp::Cos,
        UnaryOp::Tan,
        UnaryOp::Tanh,
    ];

    pub fn selector(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Abs => "abs",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Floor => "floor",
            UnaryOp::Frac => "frac",
            UnaryOp::Sign => "sign",
            UnaryOp::Squared => "squared",
            UnaryOp::Cubed => "cubed",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Exp => "exp",
            UnaryOp::Reciprocal => "reciprocal",
            UnaryOp::Midicps => "midicps",
            UnaryOp::Cpsmidi => "cpsmidi",
            UnaryOp::Dbamp => "dbamp",
            UnaryOp::Ampdb => "ampdb",
            UnaryOp::Log => "log",
            UnaryOp::Log2 => "log2",
            UnaryOp::Log10 => "log10",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Tanh => "tanh",
        }
    }

    pub fn special_index(self) -> i32 {
        match self {
            UnaryOp::Neg => 0,
            UnaryOp::Abs => 5,
            UnaryOp::Ceil => 8,
            UnaryOp::Floor => 9,
            UnaryOp::Frac => 10,
            UnaryOp::Sign => 11,
            UnaryOp::Squared => 12,
            UnaryOp::Cubed => 13,
            UnaryOp::Sqrt => 14,
            UnaryOp::Exp => 15,
            UnaryOp::Reciprocal => 16,
            UnaryOp::Midicps => 17,
            UnaryOp::Cpsmidi => 18,
            UnaryOp::Dbamp => 21,
            UnaryOp::Ampdb => 22,
            UnaryOp::Log => 25,
            UnaryOp::Log2 => 26,
            UnaryOp::Log10 => 27,
            UnaryOp::Sin => 28,
            UnaryOp::Cos => 29,
            UnaryOp::Tan => 30,
            UnaryOp::Tanh => 36,
        }
    }

    pub fn from_special_index(index: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.special_index() == index)
    }

    pub fn from_selector(selector: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.selector() == selector)
    }

    pub fn apply(self, a: f64) -> f64 {
        match self {
            UnaryOp::Neg => -a,
            UnaryOp::Abs => a.abs(),
            UnaryOp::Ceil => a.ceil(),
            UnaryOp::Floor => a.floor(),
            UnaryOp::Frac => a - a.floor(),
            UnaryOp::Sign => {
                if a > 0.0 {
                    1.0
                } else if a < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            UnaryOp::Squared => a * a,
            UnaryOp::Cubed => a * a * a,
            UnaryOp::Sqrt => a.sqrt(),
            UnaryOp::Exp => a.exp(),
            UnaryOp::Reciprocal => 1.0 / a,
            UnaryOp::Midicps => 440.0 * 2f64.powf((a - 69.0) / 12.0),
            UnaryOp::Cpsmidi => (a / 440.0).log2() * 12.0 + 69.0,
            UnaryOp::Dbamp => 10f64.powf(a * 0.05),
            UnaryOp::Ampdb => a.log10() * 20.0,
            UnaryOp::Log => a.ln(),
            UnaryOp::Log2 => a.log2(),
            UnaryOp::Log10 => a.log10(),
            UnaryOp::Sin => a.sin(),
            UnaryOp::Cos => a.cos(),
            UnaryOp::Tan => a.tan(),
            UnaryOp::Tanh => a.tanh(),
        }
    }
}

impl GraphContext<'_> {
    /// Applies a binary operator to any pair of operands.
    ///
    /// Sequences combine elementwise, the shorter one reused cyclically;
    /// a sequence against anything else maps across its elements. Any
    /// node operand produces a `BinaryOpUGen`.
    pub fn binary(&mut self, op: BinaryOp, a: &Value, b: &Value) -> Result<Value, GraphError> {
        match (a, b) {
            (Value::Num(x), Value::Num(y)) => Ok(Value::Num(op.apply(*x, *y))),
            (Value::Text(_), _) => text_op(op, a, b),
            (Value::Seq(xs), Value::Seq(ys)) => self.binary_cyclic(op, xs, ys),
            (Value::Seq(xs), _) => xs
                .iter()
                .map(|x| self.binary(op, x, b))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Seq),
            (_, Value::Seq(ys)) => ys
                .iter()
                .map(|y| self.binary(op, a, y))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Seq),
            (_, Value::Text(_)) => text_op(op, a, b),
            (Value::UGen(_), _) | (_, Value::UGen(_)) => {
                let rate = value_rate(a).max(value_rate(b));
                let ugen = UGen::new("BinaryOpUGen").with_special_index(op.special_index());
                Ok(Value::UGen(self.init(ugen, rate, &[a.clone(), b.clone()])))
            }
        }
    }

    fn binary_cyclic(&mut self, op: BinaryOp, xs: &[Value], ys: &[Value]) -> Result<Value, GraphError> {
        if xs.is_empty() || ys.is_empty() {
            return Ok(Value::Seq(Vec::new()));
        }
        let len = xs.len().max(ys.len());
        (0..len)
            .map(|i| self.binary(op, &xs[i % xs.len()], &ys[i % ys.len()]))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Seq)
    }

    pub fn unary(&mut self, op: UnaryOp, a: &Value) -> Result<Value, GraphError> {
        match a {
            Value::Num(x) => Ok(Value::Num(op.apply(*x))),
            Value::Seq(xs) => xs
                .iter()
                .map(|x| self.unary(op, x))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Seq),
            Value::UGen(node) => {
                let rate = node.rate();
                let ugen = UGen::new("UnaryOpUGen").with_special_index(op.special_index());
                Ok(Value::UGen(self.init(ugen, rate, &[a.clone()])))
            }
            Value::Text(_) => Err(GraphError::UnsupportedOperand {
                op: op.selector(),
                kind: a.kind(),
            }),
        }
    }

    pub fn add(&mut self, a: &Value, b: &Value) -> Result<Value, GraphError> {
        self.binary(BinaryOp::Add, a, b)
    }

    pub fn sub(&mut self, a: &Value, b: &Value) -> Result<Value, GraphError> {
        self.binary(BinaryOp::Sub, a, b)
    }

    pub fn mul(&mut self, a: &Value, b: &Value) -> Result<Value, GraphError> {
        self.binary(BinaryOp::Mul, a, b)
    }

    pub fn div(&mut self, a: &Value, b: &Value) -> Result<Value, GraphError> {
        self.binary(BinaryOp::Div, a, b)
    }

    pub fn rem(&mut self, a: &Value, b: &Value) -> Result<Value, GraphError> {
        self.binary(BinaryOp::Mod, a, b)
    }
}

// Text keeps plain value semantics: `+` concatenates, `*` repeats.
fn text_op(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, GraphError> {
    match (op, a, b) {
        (BinaryOp::Add, Value::Text(text), other) => Ok(Value::Text(format!("{text}{other}"))),
        (BinaryOp::Add, Value::Num(n), Value::Text(text)) => Ok(Value::Text(format!("{n}{text}"))),
        (BinaryOp::Mul, Value::Text(text), Value::Num(n)) => repeat_text(text, *n).map(Value::Text),
        (BinaryOp::Mul, Value::Text(text), _) => Ok(Value::Text(text.clone())),
        _ => Err(GraphError::UnsupportedOperands {
            op: op.selector(),
            lhs: a.kind(),
            rhs: b.kind(),
        }),
    }
}

/// Upper bound on the byte length of repeated text.
pub const MAX_TEXT_LEN: usize = 1 << 24;

fn repeat_text(text: &str, count: f64) -> Result<String, GraphError> {
    if count.is_nan() || count <= 0.0 {
        return Ok(String::new());
    }
    let too_long = || GraphError::TextTooLong { len: text.len(), count };
    if !count.is_finite() {
        return Err(too_long());
    }
    let times = count as usize;
    match text.len().checked_mul(times) {
        Some(total) if total <= MAX_TEXT_LEN => Ok(text.repeat(times)),
        _ => Err(too_long()),
    }
}
