use std::sync::Arc;
use bitflags::bitflags;

bitflags! {
    /// Behavioral axes of a local control patch, combined per instance
    /// instead of one type per combination.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PatchCaps: u8 {
        /// Press toggles between active/inactive
        const TOGGLE         = 0x01;
        /// Active only while the switch is held
        const MOMENTARY      = 0x02;
        /// Patch has a distinct "disabled" display state (LED off + dimmed
        /// label) it can be put into when its target leaves the preset
        const DISABLED_STATE = 0x04;
        /// Patch tracks an expression pedal
        const PEDAL          = 0x08;
    }
}

/// A local switch-bound control object. The device managers only drive the
/// display side of a patch; press handling lives in the navigation engine.
pub trait Patch: Send + Sync {
    fn name(&self) -> String;
    fn caps(&self) -> PatchCaps {
        PatchCaps::TOGGLE
    }
    fn is_active(&self) -> bool;
    /// Reflect device state on the bound switch/LED
    fn update_state(&self, active: bool);
    /// Put the patch into its disabled display state (LED forced off)
    fn disable(&self);
    fn supports_disabled_state(&self) -> bool {
        self.caps().contains(PatchCaps::DISABLED_STATE)
    }
    /// Replace the switch label text (scene-name patches)
    fn set_switch_text(&self, _text: &str) {}
}

pub type PatchRef = Arc<dyn Patch>;

/// The main (status line) display surface.
pub trait MainDisplay: Send + Sync {
    fn text_out(&self, text: &str);
    /// Status text that the next full refresh may overwrite
    fn transient_text_out(&self, text: &str);
    fn clear(&self);
}

pub type MainDisplayRef = Arc<dyn MainDisplay>;
