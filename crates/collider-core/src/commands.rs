//! Name-keyed timeline commands and opcode-keyed binary commands.

use crate::error::CommandError;
use crate::instance::{Buffer, BufferSource, Instance};
use crate::node::AddAction;
use crate::synth::Synth;
use crate::unit::UnitTable;
use collider_ports::{NodeId, SynthDefSpec};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub type TimelineHandler = fn(&mut Instance, &[Value]) -> Result<(), CommandError>;
pub type BinaryHandler = fn(&mut Instance, &[u8]);

/// node: i32 LE, param: u16 LE, value: f32 LE
pub const OP_SET_PARAM: u16 = 1;
/// offset: u16 LE, then raw bytes
pub const OP_SYNC_ITEMS: u16 = 2;

/// Opcode of a binary frame: its first two bytes, little-endian.
pub fn opcode(frame: &[u8]) -> Option<u16> {
    match frame {
        [lo, hi, ..] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}

/// Lookup tables shared by every instance of a server.
#[derive(Clone)]
pub struct CommandTables {
    timeline: HashMap<&'static str, TimelineHandler>,
    binary: HashMap<u16, BinaryHandler>,
    units: UnitTable,
}

impl Default for CommandTables {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl CommandTables {
    pub fn new(units: UnitTable) -> Self {
        Self {
            timeline: HashMap::new(),
            binary: HashMap::new(),
            units,
        }
    }

    pub fn with_builtins() -> Self {
        let mut tables = Self::new(UnitTable::with_builtins());
        tables.register_timeline("/g_new", group_new);
        tables.register_timeline("/s_def", synth_def);
        tables.register_timeline("/s_new", synth_new);
        tables.register_timeline("/n_run", node_run);
        tables.register_timeline("/n_free", node_free);
        tables.register_timeline("/n_set", node_set);
        tables.register_timeline("/b_src", buffer_source);
        tables.register_timeline("/b_new", buffer_new);
        tables.register_timeline("/b_free", buffer_free);
        tables.register_binary(OP_SET_PARAM, set_param_binary);
        tables.register_binary(OP_SYNC_ITEMS, sync_items_binary);
        tables
    }

    pub fn register_timeline(&mut self, name: &'static str, handler: TimelineHandler) {
        self.timeline.insert(name, handler);
    }

    pub fn register_binary(&mut self, opcode: u16, handler: BinaryHandler) {
        self.binary.insert(opcode, handler);
    }

    pub fn timeline(&self, name: &str) -> Option<TimelineHandler> {
        self.timeline.get(name).copied()
    }

    pub fn binary(&self, opcode: u16) -> Option<BinaryHandler> {
        self.binary.get(&opcode).copied()
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }
}

fn number_arg(command: &'static str, args: &[Value], index: usize) -> Result<f64, CommandError> {
    let value = args
        .get(index)
        .ok_or(CommandError::MissingArgument { command, index })?;
    value
        .as_f64()
        .ok_or(CommandError::InvalidArgument { command, index })
}

fn int_arg(command: &'static str, args: &[Value], index: usize) -> Result<i64, CommandError> {
    let value = number_arg(command, args, index)?;
    if value.is_finite() {
        Ok(value as i64)
    } else {
        Err(CommandError::InvalidArgument { command, index })
    }
}

fn id_arg(command: &'static str, args: &[Value], index: usize) -> Result<i32, CommandError> {
    i32::try_from(int_arg(command, args, index)?)
        .map_err(|_| CommandError::InvalidArgument { command, index })
}

fn action_arg(command: &'static str, args: &[Value], index: usize) -> Result<AddAction, CommandError> {
    AddAction::from_code(int_arg(command, args, index)?)
        .ok_or(CommandError::InvalidArgument { command, index })
}

/// Trailing `[param, value]...` pairs starting at `start`.
fn param_pairs(command: &'static str, args: &[Value], start: usize) -> Result<Vec<(usize, f32)>, CommandError> {
    let mut pairs = Vec::new();
    let mut index = start;
    while index < args.len() {
        let param = int_arg(command, args, index)?;
        let param = usize::try_from(param).map_err(|_| CommandError::InvalidArgument { command, index })?;
        let value = number_arg(command, args, index + 1)? as f32;
        pairs.push((param, value));
        index += 2;
    }
    Ok(pairs)
}

/// `/g_new id action target`
fn group_new(instance: &mut Instance, args: &[Value]) -> Result<(), CommandError> {
    const NAME: &str = "/g_new";
    let id = id_arg(NAME, args, 0)?;
    let action = action_arg(NAME, args, 1)?;
    let target = id_arg(NAME, args, 2)?;
    instance.tree.add_group(id, action, target)
}

/// `/s_def defId spec`
fn synth_def(instance: &mut Instance, args: &[Value]) -> Result<(), CommandError> {
    const NAME: &str = "/s_def";
    let def_id = id_arg(NAME, args, 0)?;
    let spec = args
        .get(1)
        .ok_or(CommandError::MissingArgument { command: NAME, index: 1 })?;
    let def = SynthDefSpec::from_json(spec).map_err(|e| CommandError::InvalidDef(e.to_string()))?;
    instance.defs.insert(def_id, Arc::new(def));
    Ok(())
}

/// `/s_new id action target defId [param value]...`
fn synth_new(instance: &mut Instance, args: &[Value]) -> Result<(), CommandError> {
    const NAME: &str = "/s_new";
    let id = id_arg(NAME, args, 0)?;
    let action = action_arg(NAME, args, 1)?;
    let target = id_arg(NAME, args, 2)?;
    let def_id = id_arg(NAME, args, 3)?;
    let pairs = param_pairs(NAME, args, 4)?;
    let def = instance
        .defs
        .get(&def_id)
        .cloned()
        .ok_or(CommandError::UnknownDef(def_id))?;
    let mut synth = Synth::new(
        &def,
        instance.tables.units(),
        &mut instance.fix_nums,
        instance.layout.buf_length,
    )?;
    for (param, value) in pairs {
        synth.set_param(param, value);
    }
    instance.tree.add_synth(id, synth, action, target)
}

/// `/n_run id flag`
fn node_run(instance: &mut Instance, args: &[Value]) -> Result<(), CommandError> {
    const NAME: &str = "/n_run";
    let id: NodeId = id_arg(NAME, args, 0)?;
    let flag = int_arg(NAME, args, 1)?;
    instance.tree.set_running(id, flag != 0)
}

/// `/n_free id`
fn node_free(instance: &mut Instance, args: &[Value]) -> Result<(), CommandError> {
    let id = id_arg("/n_free", args, 0)?;
    instance.tree.free(id)?;
    instance.fix_nums.prune();
    Ok(())
}

/// `/n_set id [param value]...`
fn node_set(instance: &mut Instance, args: &[Value]) -> Result<(), CommandError> {
    const NAME: &str = "/n_set";
    let id = id_arg(NAME, args, 0)?;
    for (param, value) in param_pairs(NAME, args, 1)? {
        instance.tree.set_param(id, param, value)?;
    }
    Ok(())
}

/// `/b_src srcId sampleRate channels samples...`
fn buffer_source(instance: &mut Instance, args: &[Value]) -> Result<(), CommandError> {
    const NAME: &str = "/b_src";
    let src_id = id_arg(NAME, args, 0)?;
    let sample_rate = number_arg(NAME, args, 1)? as f32;
    let channels = int_arg(NAME, args, 2)?;
    let channels = usize::try_from(channels)
        .ok()
        .filter(|&c| c > 0)
        .ok_or(CommandError::InvalidArgument { command: NAME, index: 2 })?;
    let samples = (3..args.len())
        .map(|index| number_arg(NAME, args, index).map(|v| v as f32))
        .collect::<Result<Vec<_>, _>>()?;
    instance.sources.insert(
        src_id,
        BufferSource {
            sample_rate,
            channels,
            samples,
        },
    );
    Ok(())
}

/// `/b_new bufId srcId`
fn buffer_new(instance: &mut Instance, args: &[Value]) -> Result<(), CommandError> {
    const NAME: &str = "/b_new";
    let buf_id = id_arg(NAME, args, 0)?;
    let src_id = id_arg(NAME, args, 1)?;
    let source = instance
        .sources
        .get(&src_id)
        .ok_or(CommandError::UnknownSource(src_id))?;
    let buffer = Buffer::from_source(source);
    instance.buffers.insert(buf_id, buffer);
    Ok(())
}

/// `/b_free bufId`
fn buffer_free(instance: &mut Instance, args: &[Value]) -> Result<(), CommandError> {
    let buf_id = id_arg("/b_free", args, 0)?;
    instance.buffers.remove(&buf_id);
    Ok(())
}

fn read_array<const N: usize>(payload: &[u8], offset: usize) -> Option<[u8; N]> {
    payload.get(offset..offset + N)?.try_into().ok()
}

fn set_param_binary(instance: &mut Instance, payload: &[u8]) {
    let (Some(node), Some(param), Some(value)) = (
        read_array::<4>(payload, 0).map(i32::from_le_bytes),
        read_array::<2>(payload, 4).map(u16::from_le_bytes),
        read_array::<4>(payload, 6).map(f32::from_le_bytes),
    ) else {
        tracing::trace!(len = payload.len(), "short set-param payload dropped");
        return;
    };
    if let Err(err) = instance.tree.set_param(node, usize::from(param), value) {
        tracing::trace!(%err, "set-param dropped");
    }
}

fn sync_items_binary(instance: &mut Instance, payload: &[u8]) {
    let Some(offset) = read_array::<2>(payload, 0).map(u16::from_le_bytes) else {
        tracing::trace!(len = payload.len(), "short sync payload dropped");
        return;
    };
    instance.sync.write(usize::from(offset), &payload[2..]);
}
