use axe_core::midi::split_effect_id;
use axe_core::patch::PatchRef;
use crate::config::{BlockDef, BLOCKS};
use crate::names::normalize;

pub const MAX_CHANNELS: usize = 7;

/// Live per-block sync state: wire identity, presence and channel as last
/// reported by the device, plus the local patches bound to the block.
pub struct EffectBlock {
    pub name: &'static str,
    pub normalized_name: String,
    pub id: u16,
    pub id_ls: u8,
    pub id_ms: u8,
    pub current_channel: u8,
    pub max_channels: u8,
    pub present_in_preset: bool,
    /// Bypass patches; all bound patches track the same block state
    pub patches: Vec<PatchRef>,
    /// At most one patch per selectable channel A..G
    pub channel_select_patches: [Option<PatchRef>; MAX_CHANNELS],
}

impl EffectBlock {
    fn new(def: &BlockDef) -> Self {
        let (id_ls, id_ms) = split_effect_id(def.id);
        EffectBlock {
            name: def.name,
            normalized_name: normalize(def.name),
            id: def.id,
            id_ls,
            id_ms,
            current_channel: 0,
            max_channels: 1,
            present_in_preset: false,
            patches: vec![],
            channel_select_patches: Default::default(),
        }
    }

    pub fn clear_patches(&mut self) {
        self.patches.clear();
        self.channel_select_patches = Default::default();
    }
}

pub struct EffectRegistry {
    blocks: Vec<EffectBlock>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::with_blocks(&BLOCKS)
    }

    pub fn with_blocks(defs: &[BlockDef]) -> Self {
        EffectRegistry {
            blocks: defs.iter().map(EffectBlock::new).collect()
        }
    }

    pub fn lookup_by_name(&self, normalized: &str) -> Option<&EffectBlock> {
        self.blocks.iter().find(|b| b.normalized_name == normalized)
    }

    pub fn lookup_by_name_mut(&mut self, normalized: &str) -> Option<&mut EffectBlock> {
        self.blocks.iter_mut().find(|b| b.normalized_name == normalized)
    }

    pub fn lookup_by_id(&self, id: u16) -> Option<&EffectBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn lookup_by_id_mut(&mut self, id: u16) -> Option<&mut EffectBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectBlock> {
        self.blocks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EffectBlock> {
        self.blocks.iter_mut()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
