#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("nested graph definition")]
    NestedDefinition,
    #[error("no graph definition is open")]
    NoOpenDefinition,
    #[error("unsupported operands for {op}: {lhs} and {rhs}")]
    UnsupportedOperands {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("unsupported operand for {op}: {kind}")]
    UnsupportedOperand { op: &'static str, kind: &'static str },
    #[error("unknown unit generator: {0}")]
    UnknownUGen(String),
    #[error("{name} has no {method} constructor")]
    UnknownRate { name: String, method: &'static str },
    #[error("constructor already registered: {name}.{method}")]
    DuplicateConstructor { name: String, method: &'static str },
    #[error("invalid parameter declaration: {0}")]
    InvalidDeclaration(String),
    #[error("cannot repeat text of {len} bytes {count} times")]
    TextTooLong { len: usize, count: f64 },
    #[error("{0} was created outside the open definition")]
    ForeignNode(String),
}
