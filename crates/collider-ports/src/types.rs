use serde::{Deserialize, Serialize};

pub type SessionId = i32; // addressed instance, 0 when unspecified
pub type NodeId = i32;
pub type SyncCount = u32; // rendered samples since the server started, wraps

pub const DEFAULT_SESSION: SessionId = 0;
pub const ROOT_NODE: NodeId = 0;

/// Audio channels carried by every instance bus.
pub const AUDIO_BUS_LEN: usize = 16;
/// Control-rate samples appended after the audio channels.
pub const CONTROL_BUS_LEN: usize = 128;
/// Size in bytes of the per-instance parameter-sync region.
pub const SYNC_ITEM_LEN: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rate {
    Scalar,
    Control,
    Audio,
}

impl Rate {
    pub fn method(self) -> &'static str {
        match self {
            Rate::Scalar => "ir",
            Rate::Control => "kr",
            Rate::Audio => "ar",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignalRange {
    #[default]
    Bipolar,
    Unipolar,
}

/// Shape of an instance bus: `AUDIO_BUS_LEN` audio channels of `buf_length`
/// samples each, followed by `CONTROL_BUS_LEN` control samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusLayout {
    pub buf_length: usize,
    pub channels: usize,
}

impl BusLayout {
    pub fn new(buf_length: usize, channels: usize) -> Self {
        Self {
            buf_length,
            channels,
        }
    }

    pub fn bus_len(&self) -> usize {
        self.buf_length * AUDIO_BUS_LEN + CONTROL_BUS_LEN
    }

    /// Samples that belong to the output channels and take part in mixing.
    pub fn output_len(&self) -> usize {
        self.buf_length * self.channels
    }

    pub fn control_offset(&self) -> usize {
        self.buf_length * AUDIO_BUS_LEN
    }
}
