use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Device capability document for the Axe-Fx II generation: the effect
/// pool (which blocks exist, with their sysex ids) and the per-type
/// parameter lists the bypass parameter is resolved from. A bundled
/// default ships with the crate; a newer document can be loaded at
/// startup to cover later firmware.
#[derive(Clone, Debug, Deserialize)]
pub struct CapabilityDoc {
    pub effect_pool: Vec<PoolEntry>,
    pub parameter_lists: Vec<ParameterList>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PoolEntry {
    pub id: u16,
    pub name: String,
    #[serde(rename = "type")]
    pub effect_type: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ParameterList {
    #[serde(rename = "type")]
    pub effect_type: String,
    pub parameters: Vec<ParameterEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ParameterEntry {
    pub name: String,
    pub id: u16,
}

/// Pool types that are bookkeeping artifacts, never addressable blocks.
const EXCLUDED_TYPES: [&str; 2] = ["Dummy", "Controllers"];

/// Types whose on/off state lives in a packed flags parameter instead of
/// a dedicated bypass parameter.
const FLAGS_TYPES: [&str; 4] = ["Amp", "Chorus", "Flanger", "Pitch"];

pub const DEFAULT_CAPABILITY: &str = include_str!("../data/default_capability.json");

static BUILTIN: Lazy<CapabilityDoc> = Lazy::new(|| {
    CapabilityDoc::from_json(DEFAULT_CAPABILITY)
        .expect("bundled capability document")
});

impl CapabilityDoc {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .context("Failed to parse capability document")
    }

    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Pool entries that name addressable effect blocks.
    pub fn blocks(&self) -> impl Iterator<Item = &PoolEntry> {
        self.effect_pool.iter()
            .filter(|e| !EXCLUDED_TYPES.contains(&e.effect_type.as_str()))
    }

    /// The parameter toggling a block of the given type on and off.
    /// Most types carry a `*_BYPASS` parameter; `*_BYPASSMODE` is a
    /// different animal (how the block behaves when bypassed) and must
    /// never match. The flags types pack the state into `*_FLAGS`.
    pub fn bypass_parameter(&self, effect_type: &str) -> Option<&ParameterEntry> {
        let list = self.parameter_lists.iter()
            .find(|l| l.effect_type == effect_type)?;

        if FLAGS_TYPES.contains(&effect_type) {
            list.parameters.iter().find(|p| p.name.ends_with("_FLAGS"))
        } else {
            list.parameters.iter().find(|p|
                p.name.contains("_BYPASS") && !p.name.contains("_BYPASSMODE"))
        }
    }
}
