use bitflags::bitflags;
use crate::event::AppEvent;
use crate::patch::{MainDisplayRef, PatchRef};

/// Closed set of supported Fractal Audio device models. The navigation
/// engine asks "which variant" through `AxeDevice::model` instead of
/// downcasting the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxeModel {
    Standard,
    Ultra,
    Two,
    Three,
}

impl AxeModel {
    /// Model byte in the sysex header `F0 00 01 74 <model> ...`
    pub fn sysex_model_byte(&self) -> u8 {
        match self {
            AxeModel::Standard => 0x00,
            AxeModel::Ultra => 0x01,
            AxeModel::Two => 0x03,
            AxeModel::Three => 0x10,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AxeModel::Standard => "Axe-Fx Standard",
            AxeModel::Ultra => "Axe-Fx Ultra",
            AxeModel::Two => "Axe-Fx II",
            AxeModel::Three => "Axe-Fx III",
        }
    }
}

/// Whether the device preset currently contains a looper block. Starts
/// out unknown until the first full status dump is analyzed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Unknown,
    Absent,
    Present,
}

bitflags! {
    /// Looper transport state. Record/Play are independent; the rest are
    /// modifiers. Overdub/Undo are only reported by the legacy devices.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct LooperFlags: u8 {
        const RECORD  = 0x01;
        const PLAY    = 0x02;
        const OVERDUB = 0x04;
        const ONCE    = 0x08;
        const REVERSE = 0x10;
        const HALF    = 0x20;
    }
}

/// Looper front-panel buttons addressable from a local patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LooperButton {
    Record,
    Play,
    Undo,
    Once,
    Reverse,
    Half,
}

impl LooperButton {
    /// Resolve a looper button from a normalized patch name, e.g.
    /// "looper record". Names without a known button word resolve to none.
    pub fn from_name(name: &str) -> Option<Self> {
        if !name.contains("looper") {
            return None;
        }
        for (word, button) in [
            ("record", LooperButton::Record),
            ("play", LooperButton::Play),
            ("undo", LooperButton::Undo),
            ("once", LooperButton::Once),
            ("reverse", LooperButton::Reverse),
            ("half", LooperButton::Half),
        ] {
            if name.contains(word) {
                return Some(button);
            }
        }
        None
    }
}

/// Device-manager capability consumed by the bank/patch navigation engine.
/// Both protocol variants implement this, so the engine stays agnostic of
/// which one is active.
pub trait AxeDevice: Send {
    fn model(&self) -> AxeModel;
    fn channel(&self) -> u8;

    fn set_main_display(&mut self, display: MainDisplayRef);
    fn set_tempo_patch(&mut self, patch: PatchRef);
    /// `scene` is the user-facing 1..=8 scene number
    fn set_scene_patch(&mut self, scene: usize, patch: PatchRef);
    /// Bind a bypass patch (channel = None) or a channel-select patch
    /// (channel = Some(0..=6)) to an effect block, resolved through the
    /// patch name unless an explicit effect id/CC is given
    fn set_sync_patch(&mut self, patch: PatchRef, effect_id: Option<u16>, channel: Option<u8>);
    fn set_looper_patch(&mut self, patch: PatchRef);

    fn force_refresh(&mut self);
    fn delayed_name_sync(&mut self, force: bool);
    fn delayed_effects_sync(&mut self);
    fn delayed_looper_sync(&mut self);

    fn increment_preset(&mut self);
    fn decrement_preset(&mut self);
    fn reload_current_preset(&mut self);
    fn increment_scene(&mut self);
    fn decrement_scene(&mut self);
    /// `user_action` distinguishes a local scene switch (which must be
    /// sent to the device) from a device-reported one
    fn update_scene_status(&mut self, scene: u8, user_action: bool);

    /// Returns true if the sysex belongs to this device's protocol,
    /// whether or not the message was understood.
    fn receive_sysex(&mut self, bytes: &[u8]) -> bool;
    fn handle_app_event(&mut self, event: &AppEvent);

    fn shutdown(&mut self);
}

pub type BoxedAxeDevice = Box<dyn AxeDevice>;
