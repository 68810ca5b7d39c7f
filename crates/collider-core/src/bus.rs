use collider_ports::SYNC_ITEM_LEN;
use std::collections::HashMap;
use std::sync::Arc;

/// Raw parameter-sync region, readable as little-endian i16 or f32 words.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncItems {
    bytes: [u8; SYNC_ITEM_LEN],
}

impl Default for SyncItems {
    fn default() -> Self {
        Self {
            bytes: [0; SYNC_ITEM_LEN],
        }
    }
}

impl SyncItems {
    /// Copies `data` in at `offset`, truncating at the end of the region.
    pub fn write(&mut self, offset: usize, data: &[u8]) {
        if offset >= SYNC_ITEM_LEN {
            return;
        }
        let len = data.len().min(SYNC_ITEM_LEN - offset);
        self.bytes[offset..offset + len].copy_from_slice(&data[..len]);
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn i16_at(&self, index: usize) -> i16 {
        let start = index * 2;
        match self.bytes.get(start..start + 2) {
            Some(word) => i16::from_le_bytes([word[0], word[1]]),
            None => 0,
        }
    }

    pub fn f32_at(&self, index: usize) -> f32 {
        let start = index * 4;
        match self.bytes.get(start..start + 4) {
            Some(word) => f32::from_le_bytes([word[0], word[1], word[2], word[3]]),
            None => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.bytes = [0; SYNC_ITEM_LEN];
    }
}

/// A constant exposed as a one-sample output.
#[derive(Debug, PartialEq)]
pub struct FixNum {
    outputs: [f32; 1],
}

impl FixNum {
    pub fn value(&self) -> f32 {
        self.outputs[0]
    }

    pub fn outputs(&self) -> &[f32] {
        &self.outputs
    }
}

/// One shared [`FixNum`] per distinct value, created on first request.
#[derive(Debug, Default)]
pub struct FixNumTable {
    values: HashMap<u32, Arc<FixNum>>,
}

impl FixNumTable {
    pub fn get(&mut self, value: f32) -> Arc<FixNum> {
        let entry = self
            .values
            .entry(value.to_bits())
            .or_insert_with(|| Arc::new(FixNum { outputs: [value] }));
        Arc::clone(entry)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Drops constants no synth refers to anymore.
    pub fn prune(&mut self) {
        self.values.retain(|_, fix_num| Arc::strong_count(fix_num) > 1);
    }
}
