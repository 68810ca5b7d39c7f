use crate::commands::CommandTables;
use crate::instance::Instance;
use collider_ports::{BusLayout, SessionId, TextFrame};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// How `mix` combines instance buses, chosen from the instance count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MixStrategy {
    Silent,
    /// Copies the only bus verbatim, control region included.
    Single,
    /// Gain-weighted sum over the output channels only.
    Summed,
}

impl MixStrategy {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 => MixStrategy::Silent,
            1 => MixStrategy::Single,
            _ => MixStrategy::Summed,
        }
    }
}

pub struct InstanceManager {
    layout: BusLayout,
    sample_rate: u32,
    default_gain: f32,
    tables: Arc<CommandTables>,
    map: HashMap<SessionId, Instance>,
    order: Vec<SessionId>,
    silence: Vec<f32>,
    bus_out: Vec<f32>,
    strategy: MixStrategy,
}

impl InstanceManager {
    pub fn new(layout: BusLayout, sample_rate: u32, default_gain: f32, tables: Arc<CommandTables>) -> Self {
        Self {
            layout,
            sample_rate,
            default_gain,
            tables,
            map: HashMap::new(),
            order: Vec::new(),
            silence: vec![0.0; layout.bus_len()],
            bus_out: vec![0.0; layout.bus_len()],
            strategy: MixStrategy::Silent,
        }
    }

    pub fn layout(&self) -> BusLayout {
        self.layout
    }

    pub fn strategy(&self) -> MixStrategy {
        self.strategy
    }

    pub fn bus_out(&self) -> &[f32] {
        &self.bus_out
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.map.contains_key(&id)
    }

    /// Session ids in creation order.
    pub fn session_ids(&self) -> &[SessionId] {
        &self.order
    }

    pub fn get(&self, id: SessionId) -> Option<&Instance> {
        self.map.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Instance> {
        self.map.get_mut(&id)
    }

    /// Creates the instance for `id` if missing. Returns whether it was created.
    pub fn append(&mut self, id: SessionId) -> bool {
        if self.map.contains_key(&id) {
            return false;
        }
        let instance = Instance::new(
            id,
            self.layout,
            self.sample_rate,
            self.default_gain,
            Arc::clone(&self.tables),
        );
        self.map.insert(id, instance);
        self.order.push(id);
        self.update_strategy();
        debug!(session = id, instances = self.order.len(), "instance appended");
        true
    }

    pub fn remove(&mut self, id: SessionId) -> Option<Instance> {
        let instance = self.map.remove(&id)?;
        self.order.retain(|&session| session != id);
        self.update_strategy();
        debug!(session = id, instances = self.order.len(), "instance removed");
        Some(instance)
    }

    fn update_strategy(&mut self) {
        self.strategy = MixStrategy::for_count(self.order.len());
    }

    pub fn play(&mut self, id: SessionId) {
        if let Some(instance) = self.map.get_mut(&id) {
            instance.play();
        }
    }

    pub fn pause(&mut self, id: SessionId) {
        if let Some(instance) = self.map.get_mut(&id) {
            instance.pause();
        }
    }

    pub fn reset(&mut self, id: SessionId) {
        if let Some(instance) = self.map.get_mut(&id) {
            instance.reset();
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.map.values().any(Instance::is_running)
    }

    pub fn enqueue(&mut self, id: SessionId, fragment: Vec<TextFrame>) {
        if let Some(instance) = self.map.get_mut(&id) {
            instance.enqueue(fragment);
        }
    }

    pub fn apply_binary_command(&mut self, id: SessionId, frame: &[u8]) {
        if let Some(instance) = self.map.get_mut(&id) {
            instance.apply_binary_command(frame);
        }
    }

    /// Renders every instance, then mixes their buses into `bus_out`.
    pub fn process(&mut self, buf_length: usize) {
        for id in &self.order {
            if let Some(instance) = self.map.get_mut(id) {
                instance.process(buf_length);
            }
        }
        self.mix();
    }

    pub fn mix(&mut self) {
        match self.strategy {
            MixStrategy::Silent => self.bus_out.copy_from_slice(&self.silence),
            MixStrategy::Single => {
                match self.order.first().and_then(|id| self.map.get(id)) {
                    Some(instance) => self.bus_out.copy_from_slice(instance.bus()),
                    None => self.bus_out.copy_from_slice(&self.silence),
                }
            }
            MixStrategy::Summed => {
                self.bus_out.copy_from_slice(&self.silence);
                let len = self.layout.output_len();
                for id in &self.order {
                    let Some(instance) = self.map.get(id) else {
                        continue;
                    };
                    let gain = instance.gain();
                    for (out, sample) in self.bus_out[..len].iter_mut().zip(&instance.bus()[..len]) {
                        *out += sample * gain;
                    }
                }
            }
        }
    }
}
