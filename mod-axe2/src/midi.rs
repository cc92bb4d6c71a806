use anyhow::{bail, Result};
use axe_core::device::{LooperButton, LooperFlags};
use axe_core::midi::{checksum, merge_effect_id, trim_name_field, MidiMessage};
use crate::config::{cc, msg};
use crate::names::normalize;
use crate::registry::EffectRegistry;

/// Manufacturer prefix shared by the whole legacy family; byte 4 selects
/// the member (0x00 Standard, 0x01 Ultra, 0x03 II).
pub const VENDOR_PREFIX: [u8; 4] = [0xf0, 0x00, 0x01, 0x74];
pub const MODEL_BYTES: [u8; 3] = [0x00, 0x01, 0x03];

/// Axe-Fx II sysex header, the default member of the family.
pub const HEADER: [u8; 5] = [0xf0, 0x00, 0x01, 0x74, 0x03];

pub fn is_legacy_frame(bytes: &[u8]) -> bool {
    bytes.len() >= 5
        && bytes.starts_with(&VENDOR_PREFIX)
        && MODEL_BYTES.contains(&bytes[4])
}

/// A preset name frame shorter than this carries a truncated name; the
/// device occasionally sends these right after a preset switch.
pub const PRESET_NAME_MIN_LEN: usize = 21;

pub const PRESET_NAME_LEN: usize = 23;

/// One record of a preset effects dump.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectState {
    pub id: u16,
    pub bypassed: bool,
    pub y_active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Axe2Message {
    FirmwareVersionRequest,
    PresetNameRequest,
    PresetEffectsRequest,

    FirmwareVersion { major: u8, minor: u8 },
    /// `complete` is false when the frame was too short to carry the
    /// whole name field
    PresetName { name: String, complete: bool },
    PresetChange { preset: u16 },
    PresetEffects { blocks: Vec<EffectState> },
    LooperState { flags: LooperFlags },
    TempoBeat,
}

fn frame_for(model_byte: u8, msg_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(VENDOR_PREFIX.len() + payload.len() + 4);
    bytes.extend_from_slice(&VENDOR_PREFIX);
    bytes.push(model_byte);
    bytes.push(msg_id);
    bytes.extend_from_slice(payload);
    bytes.push(checksum(&bytes));
    bytes.push(0xf7);
    bytes
}

impl Axe2Message {
    /// Encode for the Axe-Fx II; `to_bytes_for` selects another family
    /// member's model byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_for(0x03)
    }

    pub fn to_bytes_for(&self, model_byte: u8) -> Vec<u8> {
        match self {
            Axe2Message::FirmwareVersionRequest =>
                frame_for(model_byte, msg::FIRMWARE_VERSION, &[]),
            Axe2Message::PresetNameRequest =>
                frame_for(model_byte, msg::PRESET_NAME, &[]),
            Axe2Message::PresetEffectsRequest =>
                frame_for(model_byte, msg::PRESET_EFFECTS, &[]),

            Axe2Message::FirmwareVersion { major, minor } =>
                frame_for(model_byte, msg::FIRMWARE_VERSION, &[*major, *minor]),
            Axe2Message::PresetName { name, .. } => {
                let mut field = name.bytes().take(PRESET_NAME_LEN).collect::<Vec<_>>();
                field.resize(PRESET_NAME_LEN, 0x20);
                field.push(0x00);
                frame_for(model_byte, msg::PRESET_NAME, &field)
            }
            Axe2Message::PresetChange { preset } => {
                let ls = (*preset & 0x7f) as u8;
                let ms = ((*preset >> 7) & 0x7f) as u8;
                frame_for(model_byte, msg::PRESET_CHANGE, &[ls, ms])
            }
            Axe2Message::PresetEffects { blocks } => {
                let mut payload = vec![];
                for block in blocks {
                    let ls = (block.id & 0x7f) as u8;
                    let ms = ((block.id >> 7) & 0x7f) as u8;
                    let state = (block.bypassed as u8) | ((block.y_active as u8) << 1);
                    payload.extend_from_slice(&[ls, ms, state]);
                }
                frame_for(model_byte, msg::PRESET_EFFECTS, &payload)
            }
            Axe2Message::LooperState { flags } =>
                frame_for(model_byte, msg::LOOPER_STATE, &[flags.bits()]),
            Axe2Message::TempoBeat =>
                frame_for(model_byte, msg::TEMPO_BEAT, &[]),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 || !is_legacy_frame(bytes) || *bytes.last().unwrap() != 0xf7 {
            bail!("Not a legacy Axe-Fx sysex frame");
        }
        let msg_id = bytes[5];
        let payload = &bytes[6 .. bytes.len() - 2];

        match msg_id {
            msg::FIRMWARE_VERSION => {
                if payload.len() < 2 { bail!("Short firmware version message") }
                Ok(Axe2Message::FirmwareVersion { major: payload[0], minor: payload[1] })
            }
            msg::PRESET_NAME => {
                // a truncated frame still carries usable name prefix bytes
                let complete = bytes.len() >= PRESET_NAME_MIN_LEN;
                Ok(Axe2Message::PresetName {
                    name: trim_name_field(payload),
                    complete,
                })
            }
            msg::PRESET_CHANGE => {
                if payload.len() < 2 { bail!("Short preset change message") }
                Ok(Axe2Message::PresetChange {
                    preset: merge_effect_id(payload[0], payload[1])
                })
            }
            msg::PRESET_EFFECTS => {
                let blocks = payload.chunks_exact(3)
                    .map(|rec| EffectState {
                        id: merge_effect_id(rec[0], rec[1]),
                        bypassed: rec[2] & 0x01 != 0,
                        y_active: rec[2] & 0x02 != 0,
                    })
                    .collect();
                Ok(Axe2Message::PresetEffects { blocks })
            }
            msg::LOOPER_STATE => {
                if payload.is_empty() { bail!("Short looper state message") }
                Ok(Axe2Message::LooperState {
                    flags: LooperFlags::from_bits_truncate(payload[0])
                })
            }
            msg::TEMPO_BEAT => Ok(Axe2Message::TempoBeat),
            _ => bail!("Unknown Axe-Fx II message id {:#04x}", msg_id)
        }
    }
}

fn control_change(channel: u8, control: u8, value: u8) -> Vec<u8> {
    MidiMessage::ControlChange { channel, control, value }.to_bytes()
}

fn looper_cc(button: LooperButton) -> u8 {
    match button {
        LooperButton::Record => cc::LOOPER_RECORD,
        LooperButton::Play => cc::LOOPER_PLAY,
        LooperButton::Undo => cc::LOOPER_UNDO,
        LooperButton::Once => cc::LOOPER_ONCE,
        LooperButton::Reverse => cc::LOOPER_REVERSE,
        LooperButton::Half => cc::LOOPER_HALF,
    }
}

/// Resolve a patch name to the CC bytes toggling it on this generation;
/// block bypass, looper transport and the fixed commands all ride on
/// control changes here. Unresolvable names yield an empty vec.
pub fn effect_command(registry: &EffectRegistry, channel: u8, name: &str, enable: bool)
    -> Vec<u8>
{
    let normalized = normalize(name);
    let value = if enable { 127 } else { 0 };

    match normalized.as_str() {
        "taptempo" => return control_change(channel, cc::TAP_TEMPO, 127),
        "tuner" => return control_change(channel, cc::TUNER, value),
        "metronome" => return control_change(channel, cc::METRONOME, value),
        _ => {}
    }
    if let Some(button) = LooperButton::from_name(&normalized) {
        return control_change(channel, looper_cc(button), 127);
    }
    if normalized.contains("looper") && normalized.contains("overdub") {
        return control_change(channel, cc::LOOPER_OVERDUB, value);
    }
    if let Some(block) = registry.lookup_by_name(&normalized) {
        if let Some(bypass_cc) = block.bypass_cc {
            // CC value 0 bypasses, anything above engages
            return control_change(channel, bypass_cc, value);
        }
    }
    vec![]
}

/// CC bytes selecting the X (channel 0) or Y (channel 1) state of a block.
pub fn channel_command(registry: &EffectRegistry, channel: u8, block_name: &str, select: u8)
    -> Vec<u8>
{
    if select > 1 { return vec![] }
    let Some(block) = registry.lookup_by_name(&normalize(block_name)) else {
        return vec![]
    };
    let Some(xy_cc) = block.xy_cc else { return vec![] };
    // values 64..=127 select X, 0..=63 select Y
    let value = if select == 0 { 127 } else { 0 };
    control_change(channel, xy_cc, value)
}
