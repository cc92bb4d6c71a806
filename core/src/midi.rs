use anyhow::Result;

/// XOR of every preceding byte of a sysex frame (including the leading
/// 0xF0), masked to 7 bits.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b) & 0x7f
}

pub fn split_effect_id(id: u16) -> (u8, u8) {
    ((id & 0x7f) as u8, ((id >> 7) & 0x7f) as u8)
}

pub fn merge_effect_id(ls: u8, ms: u8) -> u16 {
    (ls as u16 & 0x7f) | ((ms as u16 & 0x7f) << 7)
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn from_hex(str: &str) -> Result<Vec<u8>> {
    str.split_whitespace()
        .map(|s| u8::from_str_radix(s, 16)
            .map_err(|e| anyhow!("Invalid hex byte {:?}: {}", s, e)))
        .collect()
}

/// Decode a fixed-size name field: strip the trailing space/NUL run,
/// stopping at the first other byte walking backward.
pub fn trim_name_field(bytes: &[u8]) -> String {
    let end = bytes.iter()
        .rposition(|&b| b != 0x20 && b != 0x00)
        .map(|p| p + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&bytes[..end]).to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub enum MidiMessage {
    ControlChange { channel: u8, control: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    /// Bank select, coarse (CC 0)
    BankSelect { channel: u8, bank: u8 },
}

impl MidiMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MidiMessage::ControlChange { channel, control, value } =>
                vec![0xb0 | (channel & 0x0f), *control, *value],
            MidiMessage::ProgramChange { channel, program } =>
                vec![0xc0 | (channel & 0x0f), *program],
            MidiMessage::BankSelect { channel, bank } =>
                vec![0xb0 | (channel & 0x0f), 0x00, *bank],
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let Some(status) = bytes.first() else {
            bail!("Zero-size MIDI message");
        };
        match status & 0xf0 {
            0xb0 if bytes.len() >= 3 => {
                let channel = status & 0x0f;
                if bytes[1] == 0x00 {
                    Ok(MidiMessage::BankSelect { channel, bank: bytes[2] })
                } else {
                    Ok(MidiMessage::ControlChange { channel, control: bytes[1], value: bytes[2] })
                }
            }
            0xc0 if bytes.len() >= 2 =>
                Ok(MidiMessage::ProgramChange { channel: status & 0x0f, program: bytes[1] }),
            _ => bail!("Failed to parse MIDI message")
        }
    }
}
