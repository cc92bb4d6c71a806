use anyhow::{bail, Result};
use axe_core::device::{LooperButton, LooperFlags};
use axe_core::midi::{checksum, merge_effect_id, split_effect_id, trim_name_field};
use crate::config::msg;
use crate::names::normalize;
use crate::registry::EffectRegistry;

/// Axe-Fx III sysex header: manufacturer 00 01 74 (Fractal Audio),
/// model byte 0x10.
pub const HEADER: [u8; 5] = [0xf0, 0x00, 0x01, 0x74, 0x10];

/// "Current" placeholder in preset/scene query payloads.
pub const CURRENT: u8 = 0x7f;

pub const PRESET_NAME_LEN: usize = 32;

/// One record of a status dump: wire id plus the packed flags byte.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockStatus {
    pub id: u16,
    pub bypassed: bool,
    pub channel: u8,
    pub max_channels: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AxeMessage {
    // queries and commands
    FirmwareVersionRequest,
    PresetNameRequest,
    SceneNameRequest { scene: u8 },
    StatusDumpRequest,
    LooperStateRequest,
    LooperButton { button: LooperButton },
    SceneSelect { scene: u8 },
    EffectBypass { id: u16, bypassed: bool },
    EffectChannel { id: u16, channel: u8 },
    TapTempo,
    TunerToggle,

    // responses and notifications
    FirmwareVersion { major: u8, minor: u8 },
    PresetName { preset: u16, name: String },
    SceneName { scene: u8, name: String },
    Scene { scene: u8 },
    StatusDump { blocks: Vec<BlockStatus> },
    LooperState { flags: LooperFlags },
    TempoBeat,
    Ack { code: u8 },
    /// Traffic belonging to the editor software, passed through untouched
    Editor { id: u8 },
}

fn frame(msg_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER.len() + payload.len() + 3);
    bytes.extend_from_slice(&HEADER);
    bytes.push(msg_id);
    bytes.extend_from_slice(payload);
    bytes.push(checksum(&bytes));
    bytes.push(0xf7);
    bytes
}

fn name_field(name: &str) -> Vec<u8> {
    let mut field = name.bytes().take(PRESET_NAME_LEN).collect::<Vec<_>>();
    field.resize(PRESET_NAME_LEN, 0x20);
    field
}

fn looper_button_byte(button: LooperButton) -> u8 {
    match button {
        LooperButton::Record => 0x00,
        LooperButton::Play => 0x01,
        LooperButton::Undo => 0x02,
        LooperButton::Once => 0x03,
        LooperButton::Reverse => 0x04,
        LooperButton::Half => 0x05,
    }
}

impl AxeMessage {
    /// Encode to wire bytes. Commands with out-of-range or unresolvable
    /// arguments encode to an empty vec, which the manager never sends.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            AxeMessage::FirmwareVersionRequest =>
                frame(msg::FIRMWARE_VERSION, &[0x0a]),
            AxeMessage::PresetNameRequest =>
                frame(msg::PRESET_NAME, &[CURRENT, CURRENT]),
            AxeMessage::SceneNameRequest { scene } =>
                frame(msg::SCENE_NAME, &[*scene]),
            AxeMessage::StatusDumpRequest =>
                frame(msg::STATUS_DUMP, &[]),
            AxeMessage::LooperStateRequest =>
                frame(msg::LOOPER_STATE, &[CURRENT]),
            AxeMessage::LooperButton { button } =>
                frame(msg::LOOPER_STATE, &[looper_button_byte(*button)]),
            AxeMessage::SceneSelect { scene } => {
                if *scene > 7 { return vec![] }
                frame(msg::SCENE, &[*scene])
            }
            AxeMessage::EffectBypass { id, bypassed } => {
                if *id == 0 { return vec![] }
                let (ls, ms) = split_effect_id(*id);
                frame(msg::EFFECT_BYPASS, &[ls, ms, *bypassed as u8])
            }
            AxeMessage::EffectChannel { id, channel } => {
                if *id == 0 || *channel > 6 { return vec![] }
                let (ls, ms) = split_effect_id(*id);
                frame(msg::EFFECT_CHANNEL, &[ls, ms, *channel])
            }
            AxeMessage::TapTempo =>
                frame(msg::TAP_TEMPO, &[]),
            AxeMessage::TunerToggle =>
                frame(msg::TUNER, &[]),

            AxeMessage::FirmwareVersion { major, minor } =>
                frame(msg::FIRMWARE_VERSION, &[*major, *minor]),
            AxeMessage::PresetName { preset, name } => {
                let (ls, ms) = split_effect_id(*preset);
                let mut payload = vec![ls, ms];
                payload.extend(name_field(name));
                frame(msg::PRESET_NAME, &payload)
            }
            AxeMessage::SceneName { scene, name } => {
                let mut payload = vec![*scene];
                payload.extend(name_field(name));
                frame(msg::SCENE_NAME, &payload)
            }
            AxeMessage::Scene { scene } =>
                frame(msg::SCENE, &[*scene]),
            AxeMessage::StatusDump { blocks } => {
                let mut payload = vec![];
                for block in blocks {
                    let (ls, ms) = split_effect_id(block.id);
                    let flags = (block.bypassed as u8)
                        | ((block.channel & 0x07) << 1)
                        | ((block.max_channels & 0x07) << 4);
                    payload.extend_from_slice(&[ls, ms, flags]);
                }
                frame(msg::STATUS_DUMP, &payload)
            }
            AxeMessage::LooperState { flags } =>
                frame(msg::LOOPER_STATE, &[flags.bits()]),
            AxeMessage::TempoBeat =>
                frame(msg::TEMPO, &[]),
            AxeMessage::Ack { code } =>
                frame(msg::ACK, &[*code]),
            AxeMessage::Editor { id } =>
                frame(*id, &[]),
        }
    }

    /// Decode a sysex frame received from the device. Frames with a
    /// foreign header are an error; so are truncated payloads.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 || !bytes.starts_with(&HEADER) || *bytes.last().unwrap() != 0xf7 {
            bail!("Not an Axe-Fx III sysex frame");
        }
        let msg_id = bytes[5];
        let payload = &bytes[6 .. bytes.len() - 2];

        if msg::EDITOR.contains(&msg_id) {
            return Ok(AxeMessage::Editor { id: msg_id });
        }

        match msg_id {
            msg::FIRMWARE_VERSION => {
                if payload.len() < 2 { bail!("Short firmware version message") }
                Ok(AxeMessage::FirmwareVersion { major: payload[0], minor: payload[1] })
            }
            msg::PRESET_NAME => {
                if bytes.len() < 42 { bail!("Short preset name message") }
                Ok(AxeMessage::PresetName {
                    preset: merge_effect_id(payload[0], payload[1]),
                    name: trim_name_field(&payload[2 .. 2 + PRESET_NAME_LEN]),
                })
            }
            msg::SCENE_NAME => {
                if bytes.len() < 41 { bail!("Short scene name message") }
                Ok(AxeMessage::SceneName {
                    scene: payload[0],
                    name: trim_name_field(&payload[1 .. 1 + PRESET_NAME_LEN]),
                })
            }
            msg::SCENE => {
                if payload.is_empty() { bail!("Short scene message") }
                Ok(AxeMessage::Scene { scene: payload[0] })
            }
            msg::STATUS_DUMP => {
                let blocks = payload.chunks_exact(3)
                    .map(|rec| BlockStatus {
                        id: merge_effect_id(rec[0], rec[1]),
                        bypassed: rec[2] & 0x01 != 0,
                        channel: (rec[2] >> 1) & 0x07,
                        max_channels: (rec[2] >> 4) & 0x07,
                    })
                    .collect();
                Ok(AxeMessage::StatusDump { blocks })
            }
            msg::LOOPER_STATE => {
                if payload.is_empty() { bail!("Short looper state message") }
                Ok(AxeMessage::LooperState {
                    flags: LooperFlags::from_bits_truncate(payload[0])
                })
            }
            msg::TEMPO => Ok(AxeMessage::TempoBeat),
            msg::ACK => {
                if payload.is_empty() { bail!("Short ack message") }
                Ok(AxeMessage::Ack { code: payload[0] })
            }
            _ => bail!("Unknown Axe-Fx III message id {:#04x}", msg_id)
        }
    }
}

/// Resolve a normalized-or-raw patch name to the command bytes toggling it.
/// Unresolvable names yield an empty vec.
pub fn effect_command(registry: &EffectRegistry, name: &str, enable: bool) -> Vec<u8> {
    let normalized = normalize(name);

    match normalized.as_str() {
        "taptempo" => return AxeMessage::TapTempo.to_bytes(),
        "tuner" => return AxeMessage::TunerToggle.to_bytes(),
        _ => {}
    }
    if let Some(button) = LooperButton::from_name(&normalized) {
        return AxeMessage::LooperButton { button }.to_bytes();
    }
    if let Some(block) = registry.lookup_by_name(&normalized) {
        // a "1" bypass flag means engaged -> bypassed, so the flag is the
        // inverse of enable
        return AxeMessage::EffectBypass { id: block.id, bypassed: !enable }.to_bytes();
    }
    vec![]
}

/// Command bytes selecting channel `letter` ('a'..='g') on a block.
pub fn channel_command(registry: &EffectRegistry, block_name: &str, letter: char) -> Vec<u8> {
    let channel = match letter.to_ascii_lowercase() {
        c @ 'a'..='g' => c as u8 - b'a',
        _ => return vec![]
    };
    let Some(block) = registry.lookup_by_name(&normalize(block_name)) else {
        return vec![]
    };
    AxeMessage::EffectChannel { id: block.id, channel }.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axe_core::midi::from_hex;
    use crate::config::BlockDef;

    fn amp1_registry() -> EffectRegistry {
        EffectRegistry::with_blocks(&[BlockDef { id: 0x012a, name: "Amp 1" }])
    }

    #[test]
    fn bypass_command_wire_format() {
        let registry = amp1_registry();
        let bytes = effect_command(&registry, "Axe Amp 1", false);
        assert_eq!(bytes, from_hex("f0 00 01 74 10 0a 2a 02 01 36 f7").unwrap());

        // engaging sends flag 0
        let bytes = effect_command(&registry, "Amp 1", true);
        assert_eq!(bytes[8], 0x00);
    }

    #[test]
    fn unresolvable_command_is_empty() {
        let registry = amp1_registry();
        assert!(effect_command(&registry, "Banjo 7", true).is_empty());
        assert!(AxeMessage::EffectBypass { id: 0, bypassed: true }.to_bytes().is_empty());
        assert!(AxeMessage::SceneSelect { scene: 8 }.to_bytes().is_empty());
        assert!(AxeMessage::EffectChannel { id: 0x012a, channel: 7 }.to_bytes().is_empty());
    }

    #[test]
    fn fixed_commands_bypass_the_registry() {
        let registry = EffectRegistry::with_blocks(&[]);
        assert_eq!(effect_command(&registry, "Tap Tempo", true),
                   AxeMessage::TapTempo.to_bytes());
        assert_eq!(effect_command(&registry, "Tuner", true),
                   AxeMessage::TunerToggle.to_bytes());
        assert_eq!(effect_command(&registry, "Looper Record", true),
                   AxeMessage::LooperButton { button: LooperButton::Record }.to_bytes());
    }

    #[test]
    fn channel_command_wire_format() {
        let registry = amp1_registry();
        let bytes = channel_command(&registry, "Amp 1", 'B');
        assert_eq!(&bytes[5..9], &[msg::EFFECT_CHANNEL, 0x2a, 0x02, 0x01]);
        assert!(channel_command(&registry, "Amp 1", 'h').is_empty());
    }

    #[test]
    fn every_frame_carries_a_valid_checksum() {
        let msgs = [
            AxeMessage::FirmwareVersionRequest,
            AxeMessage::PresetNameRequest,
            AxeMessage::SceneNameRequest { scene: CURRENT },
            AxeMessage::StatusDumpRequest,
            AxeMessage::LooperStateRequest,
            AxeMessage::SceneSelect { scene: 3 },
            AxeMessage::TapTempo,
        ];
        for msg in msgs {
            let bytes = msg.to_bytes();
            let body = &bytes[.. bytes.len() - 2];
            assert_eq!(bytes[bytes.len() - 2], checksum(body), "bad checksum for {:?}", msg);
            assert_eq!(*bytes.last().unwrap(), 0xf7);
        }
    }

    #[test]
    fn preset_name_round_trip() {
        let msg = AxeMessage::PresetName { preset: 383, name: "Big Hair Solo".into() };
        let bytes = msg.to_bytes();
        assert_eq!(bytes.len(), 42);
        assert_eq!(AxeMessage::from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn scene_name_round_trip() {
        let msg = AxeMessage::SceneName { scene: 4, name: "Clean".into() };
        let bytes = msg.to_bytes();
        assert_eq!(bytes.len(), 41);
        assert_eq!(AxeMessage::from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn status_dump_decodes_packed_flags() {
        // flags 0x31 = bypassed, channel 0, 3 channels available
        let msg = AxeMessage::StatusDump { blocks: vec![
            BlockStatus { id: 0x012a, bypassed: true, channel: 0, max_channels: 3 },
            BlockStatus { id: 0x012e, bypassed: false, channel: 2, max_channels: 4 },
        ]};
        let bytes = msg.to_bytes();
        assert_eq!(bytes[8], 0x31);
        assert_eq!(AxeMessage::from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn foreign_frames_are_rejected() {
        // Axe-Fx II header (model byte 0x03)
        let bytes = from_hex("f0 00 01 74 03 0f 00 f7").unwrap();
        assert!(AxeMessage::from_bytes(&bytes).is_err());
        assert!(AxeMessage::from_bytes(&[0xf0, 0xf7]).is_err());
    }

    #[test]
    fn editor_traffic_is_classified_not_parsed() {
        let bytes = frame(0x21, &[0x01, 0x02, 0x03]);
        assert_eq!(AxeMessage::from_bytes(&bytes).unwrap(),
                   AxeMessage::Editor { id: 0x21 });
    }
}
