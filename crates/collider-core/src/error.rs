use collider_ports::{ConfigError, NodeId};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("{command}: missing argument {index}")]
    MissingArgument { command: &'static str, index: usize },
    #[error("{command}: invalid argument {index}")]
    InvalidArgument { command: &'static str, index: usize },
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("node already exists: {0}")]
    DuplicateNode(NodeId),
    #[error("node {0} is not a group")]
    NotAGroup(NodeId),
    #[error("unknown synth definition: {0}")]
    UnknownDef(i32),
    #[error("invalid synth definition: {0}")]
    InvalidDef(String),
    #[error("unknown unit: {0}")]
    UnknownUnit(String),
    #[error("{name} expects {expected} outputs, definition declares {actual}")]
    OutputArity {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("unit {unit} reads from unit {source_unit} which is not evaluated before it")]
    UnorderedInput { unit: usize, source_unit: usize },
    #[error("unit {unit} reads missing output {output} of unit {source_unit}")]
    MissingOutput {
        unit: usize,
        source_unit: usize,
        output: usize,
    },
    #[error("unit {unit} reads missing constant {index}")]
    MissingConst { unit: usize, index: usize },
    #[error("unknown buffer source: {0}")]
    UnknownSource(i32),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ServerError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("server is not initialized")]
    NotInitialized,
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
