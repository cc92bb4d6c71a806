use log::*;
use axe_core::patch::PatchRef;
use crate::capability::CapabilityDoc;
use crate::config::{DEFAULT_CC, XY_CC};
use crate::names::normalize;

/// X and Y are the only block states on this generation.
pub const NUM_CHANNELS: usize = 2;

/// Live per-block sync state for a second-generation device, built from
/// the capability document rather than a fixed table.
pub struct EffectBlock {
    pub name: String,
    pub normalized_name: String,
    /// Sysex id used in preset effect dumps
    pub id: u16,
    pub effect_type: String,
    /// Parameter id toggling the block on and off
    pub bypass_param: Option<u16>,
    pub bypass_cc: Option<u8>,
    pub xy_cc: Option<u8>,
    /// 0 = X, 1 = Y
    pub current_channel: u8,
    pub present_in_preset: bool,
    pub patches: Vec<PatchRef>,
    pub channel_select_patches: [Option<PatchRef>; NUM_CHANNELS],
}

impl EffectBlock {
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
        Self::from_capability(CapabilityDoc::builtin())
    }

    pub fn from_capability(doc: &CapabilityDoc) -> Self {
        let blocks = doc.blocks()
            .map(|entry| {
                let normalized_name = normalize(&entry.name);
                let bypass_param = doc.bypass_parameter(&entry.effect_type)
                    .map(|p| p.id);
                if bypass_param.is_none() {
                    warn!("no bypass parameter for {:?} ({})", entry.name, entry.effect_type);
                }
                let bypass_cc = DEFAULT_CC.get(normalized_name.as_str()).copied();
                let xy_cc = XY_CC.get(normalized_name.as_str()).copied();
                EffectBlock {
                    name: entry.name.clone(),
                    normalized_name,
                    id: entry.id,
                    effect_type: entry.effect_type.clone(),
                    bypass_param,
                    bypass_cc,
                    xy_cc,
                    current_channel: 0,
                    present_in_preset: false,
                    patches: vec![],
                    channel_select_patches: Default::default(),
                }
            })
            .collect();
        EffectRegistry { blocks }
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_registry_resolves_ccs() {
        let registry = EffectRegistry::new();
        let amp = registry.lookup_by_name("amp 1").expect("amp 1");
        assert_eq!(amp.bypass_cc, Some(37));
        assert_eq!(amp.xy_cc, Some(102));
        // amps keep state in the flags parameter
        assert!(amp.bypass_param.is_some());

        let enhancer = registry.lookup_by_name("enhancer").expect("enhancer");
        assert_eq!(enhancer.bypass_cc, Some(51));
        assert_eq!(enhancer.xy_cc, None);
    }

    #[test]
    fn excluded_pool_entries_do_not_become_blocks() {
        let registry = EffectRegistry::new();
        assert!(registry.lookup_by_id(0).is_none());
        assert!(registry.lookup_by_name("controllers").is_none());
    }

    #[test]
    fn normalized_names_are_unique() {
        let registry = EffectRegistry::new();
        let mut seen = HashSet::new();
        for block in registry.iter() {
            assert!(seen.insert(block.normalized_name.clone()),
                    "blocks {:?} collide after normalization", block.name);
        }
    }
}
