use crate::bus::{FixNumTable, SyncItems};
use crate::commands::{opcode, CommandTables};
use crate::guards;
use crate::node::NodeTree;
use crate::synth::RenderContext;
use collider_ports::{BusLayout, SessionId, SynthDefSpec, TextFrame};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Raw sample data registered by `/b_src`.
#[derive(Clone, Debug, PartialEq)]
pub struct BufferSource {
    pub sample_rate: f32,
    pub channels: usize,
    /// Interleaved frames.
    pub samples: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Buffer {
    pub sample_rate: f32,
    pub channels: usize,
    pub frames: usize,
    pub samples: Vec<f32>,
}

impl Buffer {
    pub fn from_source(source: &BufferSource) -> Self {
        Self {
            sample_rate: source.sample_rate,
            channels: source.channels,
            frames: source.samples.len() / source.channels.max(1),
            samples: source.samples.clone(),
        }
    }
}

/// One independent synthesis context: its own bus, node tree, timeline,
/// definitions and buffers.
pub struct Instance {
    pub(crate) session_id: SessionId,
    pub(crate) layout: BusLayout,
    pub(crate) sample_rate: f32,
    pub(crate) bus: Vec<f32>,
    pub(crate) gain: f32,
    pub(crate) timeline: VecDeque<TextFrame>,
    pub(crate) tree: NodeTree,
    pub(crate) fix_nums: FixNumTable,
    pub(crate) defs: HashMap<i32, Arc<SynthDefSpec>>,
    pub(crate) sources: HashMap<i32, BufferSource>,
    pub(crate) buffers: HashMap<i32, Buffer>,
    pub(crate) sync: SyncItems,
    pub(crate) tables: Arc<CommandTables>,
}

impl Instance {
    pub fn new(
        session_id: SessionId,
        layout: BusLayout,
        sample_rate: u32,
        gain: f32,
        tables: Arc<CommandTables>,
    ) -> Self {
        Self {
            session_id,
            layout,
            sample_rate: sample_rate as f32,
            bus: vec![0.0; layout.bus_len()],
            gain,
            timeline: VecDeque::new(),
            tree: NodeTree::new(),
            fix_nums: FixNumTable::default(),
            defs: HashMap::new(),
            sources: HashMap::new(),
            buffers: HashMap::new(),
            sync: SyncItems::default(),
            tables,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn layout(&self) -> BusLayout {
        self.layout
    }

    pub fn bus(&self) -> &[f32] {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut [f32] {
        &mut self.bus
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    pub fn is_running(&self) -> bool {
        self.tree.root_running()
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn sync_items(&self) -> &SyncItems {
        &self.sync
    }

    pub fn timeline_len(&self) -> usize {
        self.timeline.len()
    }

    pub fn def(&self, def_id: i32) -> Option<&SynthDefSpec> {
        self.defs.get(&def_id).map(Arc::as_ref)
    }

    pub fn buffer(&self, buf_id: i32) -> Option<&Buffer> {
        self.buffers.get(&buf_id)
    }

    pub fn fix_num_count(&self) -> usize {
        self.fix_nums.len()
    }

    pub fn play(&mut self) {
        self.tree.set_root_running(true);
        self.bus.fill(0.0);
    }

    /// Stops the root and discards everything still queued.
    pub fn pause(&mut self) {
        self.tree.set_root_running(false);
        self.bus.fill(0.0);
        self.timeline.clear();
    }

    /// Rebuilds all per-instance state. The root keeps its running flag.
    pub fn reset(&mut self) {
        let running = self.tree.root_running();
        self.tree = NodeTree::new();
        self.tree.set_root_running(running);
        self.timeline.clear();
        self.bus.fill(0.0);
        self.fix_nums.clear();
        self.defs.clear();
        self.sources.clear();
        self.buffers.clear();
        self.sync.clear();
        debug!(session = self.session_id, "instance reset");
    }

    pub fn enqueue<I>(&mut self, fragment: I)
    where
        I: IntoIterator<Item = TextFrame>,
    {
        self.timeline.extend(fragment);
    }

    pub fn apply_command(&mut self, command: &[serde_json::Value]) {
        let Some(name) = command.first().and_then(serde_json::Value::as_str) else {
            warn!(session = self.session_id, "timeline command without a name");
            return;
        };
        let Some(handler) = self.tables.timeline(name) else {
            debug!(session = self.session_id, command = name, "unknown timeline command skipped");
            return;
        };
        if let Err(err) = handler(self, &command[1..]) {
            warn!(session = self.session_id, command = name, %err, "timeline command failed");
        }
    }

    /// Dispatches a binary frame on its opcode; unknown opcodes are dropped.
    pub fn apply_binary_command(&mut self, frame: &[u8]) {
        let Some(code) = opcode(frame) else {
            trace!(session = self.session_id, "binary frame without opcode dropped");
            return;
        };
        match self.tables.binary(code) {
            Some(handler) => handler(self, &frame[2..]),
            None => trace!(session = self.session_id, opcode = code, "unknown opcode dropped"),
        }
    }

    /// Drains the timeline, then renders one buffer onto a cleared bus.
    pub fn process(&mut self, buf_length: usize) {
        while let Some(command) = self.timeline.pop_front() {
            self.apply_command(&command);
        }
        self.bus.fill(0.0);
        let mut ctx = RenderContext {
            sample_rate: self.sample_rate,
            buf_length: self.layout.buf_length,
            frames: buf_length.min(self.layout.buf_length),
            bus: &mut self.bus,
            sync: &self.sync,
        };
        self.tree.process(&mut ctx);
        guards::zap_buffer(&mut self.bus);
    }
}
