use crate::types::SyncCount;
use serde_json::Value;

/// Ordered sequence whose first element is a command name.
pub type TextFrame = Vec<Value>;

/// Inbound message as delivered by the transport.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Text(TextFrame),
    Binary(Vec<u8>),
}

impl Frame {
    pub fn text<I>(name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut frame = vec![Value::from(name)];
        frame.extend(args);
        Frame::Text(frame)
    }
}

/// Outbound message towards the language host.
#[derive(Clone, Debug, PartialEq)]
pub enum LangMessage {
    Text(TextFrame),
    Stream(Vec<i16>),
}

impl LangMessage {
    pub fn ack(name: &str, sync_count: SyncCount) -> Self {
        LangMessage::Text(vec![Value::from(name), Value::from(sync_count)])
    }

    pub fn command_name(&self) -> Option<&str> {
        match self {
            LangMessage::Text(frame) => frame.first().and_then(Value::as_str),
            LangMessage::Stream(_) => None,
        }
    }
}

/// Upward send primitive. Implementations must preserve per-session order.
pub trait LangPort: Send + Sync {
    fn send(&self, msg: LangMessage);
}
