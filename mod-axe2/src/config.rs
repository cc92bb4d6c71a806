use std::collections::HashMap;
use once_cell::sync::Lazy;

/// Axe-Fx II sysex message ids (byte 5 of the frame).
pub mod msg {
    pub const FIRMWARE_VERSION: u8 = 0x08;
    pub const PRESET_EFFECTS: u8 = 0x0e;
    pub const PRESET_NAME: u8 = 0x0f;
    pub const TEMPO_BEAT: u8 = 0x10;
    pub const PRESET_CHANGE: u8 = 0x14;
    pub const LOOPER_STATE: u8 = 0x23;
}

/// Fixed control-change assignments the device ships with.
pub mod cc {
    pub const INPUT_VOLUME: u8 = 10;
    pub const OUT1_VOLUME: u8 = 11;
    pub const OUT2_VOLUME: u8 = 12;
    pub const TAP_TEMPO: u8 = 14;
    pub const TUNER: u8 = 15;
    /// external controllers 1..=12 sit at 16..=27
    pub const EXTERNAL_BASE: u8 = 16;
    pub const LOOPER_RECORD: u8 = 28;
    pub const LOOPER_PLAY: u8 = 29;
    pub const LOOPER_ONCE: u8 = 30;
    pub const LOOPER_OVERDUB: u8 = 31;
    pub const LOOPER_REVERSE: u8 = 32;
    pub const LOOPER_BYPASS: u8 = 33;
    pub const SCENE_SELECT: u8 = 34;
    pub const LOOPER_HALF: u8 = 120;
    pub const LOOPER_UNDO: u8 = 121;
    pub const METRONOME: u8 = 122;
    pub const VOLUME_INCREMENT: u8 = 123;
    pub const VOLUME_DECREMENT: u8 = 124;
}

pub const NUM_SCENES: usize = 8;
pub const NUM_PRESETS: i32 = 1000;

/// Default bypass CC per block, keyed by normalized block name. The
/// device assigns these contiguously from 37 in alphabetical block order.
pub static DEFAULT_CC: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    let list: &[(&str, u8)] = &[
        ("amp 1", 37), ("amp 2", 38),
        ("cabinet 1", 39), ("cabinet 2", 40),
        ("chorus 1", 41), ("chorus 2", 42),
        ("compressor 1", 43), ("compressor 2", 44),
        ("crossover 1", 45), ("crossover 2", 46),
        ("delay 1", 47), ("delay 2", 48),
        ("drive 1", 49), ("drive 2", 50),
        ("enhancer", 51),
        ("filter 1", 52), ("filter 2", 53), ("filter 3", 54), ("filter 4", 55),
        ("flanger 1", 56), ("flanger 2", 57),
        ("formant", 58),
        ("effects loop", 59),
        ("gate/expander 1", 60), ("gate/expander 2", 61),
        ("graphic eq 1", 62), ("graphic eq 2", 63),
        ("graphic eq 3", 64), ("graphic eq 4", 65),
        ("megatap delay", 66),
        ("multiband compressor 1", 67), ("multiband compressor 2", 68),
        ("multi delay 1", 69), ("multi delay 2", 70),
        ("parametric eq 1", 71), ("parametric eq 2", 72),
        ("parametric eq 3", 73), ("parametric eq 4", 74),
        ("phaser 1", 75), ("phaser 2", 76),
        ("pitch 1", 77), ("pitch 2", 78),
        ("quad chorus 1", 79), ("quad chorus 2", 80),
        ("resonator 1", 81), ("resonator 2", 82),
        ("reverb 1", 83), ("reverb 2", 84),
        ("ring modulator", 85),
        ("rotary 1", 86), ("rotary 2", 87),
        ("synth 1", 88), ("synth 2", 89),
        ("tremolo 1", 90), ("tremolo 2", 91),
        ("vocoder", 92),
        ("volume/pan 1", 93), ("volume/pan 2", 94),
        ("volume/pan 3", 95), ("volume/pan 4", 96),
        ("wah-wah 1", 97), ("wah-wah 2", 98),
        ("tone match", 99),
        ("looper", cc::LOOPER_BYPASS),
    ];
    list.iter().cloned().collect()
});

/// X/Y switch CC per block; only these blocks have two states.
pub static XY_CC: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    let list: &[(&str, u8)] = &[
        ("delay 1", 100), ("delay 2", 101),
        ("amp 1", 102), ("amp 2", 103),
        ("cabinet 1", 104), ("cabinet 2", 105),
        ("chorus 1", 106), ("chorus 2", 107),
        ("drive 1", 108), ("drive 2", 109),
        ("flanger 1", 110), ("flanger 2", 111),
        ("phaser 1", 112), ("phaser 2", 113),
        ("pitch 1", 114), ("pitch 2", 115),
        ("reverb 1", 116), ("reverb 2", 117),
        ("wah-wah 1", 118), ("wah-wah 2", 119),
    ];
    list.iter().cloned().collect()
});

/// Axe-Fx II synonym table. Deliberately not shared with the III table:
/// the generations diverge, most visibly in the legacy "looper N" names
/// that second-generation patch sets used for the delay blocks.
pub(crate) static SYNONYM_LIST: &[(&str, &str)] = &[
    // tempo and tuner
    ("tap", "taptempo"), ("tap tempo", "taptempo"), ("tempo tap", "taptempo"),
    ("tempo", "taptempo"),
    ("tune", "tuner"), ("pitch detector", "tuner"),

    // legacy patch sets called the delay blocks "looper"
    ("looper 1", "delay 1"), ("looper 2", "delay 2"),

    // looper commands
    ("loop rec", "looper record"), ("loop record", "looper record"),
    ("looper rec", "looper record"),
    ("loop play", "looper play"),
    ("loop once", "looper once"), ("looper play once", "looper once"),
    ("loop undo", "looper undo"),
    ("loop overdub", "looper overdub"), ("looper dub", "looper overdub"),
    ("loop rev", "looper reverse"), ("looper rev", "looper reverse"),
    ("loop reverse", "looper reverse"),
    ("loop half", "looper half"), ("looper half-speed", "looper half"),
    ("looper half speed", "looper half"),

    // amps and cabs
    ("amp", "amp 1"), ("amplifier", "amp 1"),
    ("amplifier 1", "amp 1"), ("amplifier 2", "amp 2"),
    ("cab", "cabinet 1"), ("cabinet", "cabinet 1"),
    ("cab 1", "cabinet 1"), ("cab 2", "cabinet 2"),

    // dynamics and eq
    ("comp", "compressor 1"), ("compressor", "compressor 1"),
    ("comp 1", "compressor 1"), ("comp 2", "compressor 2"),
    ("mbc", "multiband compressor 1"),
    ("mbc 1", "multiband compressor 1"), ("mbc 2", "multiband compressor 2"),
    ("geq", "graphic eq 1"), ("graphic eq", "graphic eq 1"),
    ("geq 1", "graphic eq 1"), ("geq 2", "graphic eq 2"),
    ("geq 3", "graphic eq 3"), ("geq 4", "graphic eq 4"),
    ("peq", "parametric eq 1"), ("parametric eq", "parametric eq 1"),
    ("peq 1", "parametric eq 1"), ("peq 2", "parametric eq 2"),
    ("peq 3", "parametric eq 3"), ("peq 4", "parametric eq 4"),
    ("gate", "gate/expander 1"),
    ("gate 1", "gate/expander 1"), ("gate 2", "gate/expander 2"),

    // delays and reverb
    ("delay", "delay 1"), ("dly", "delay 1"),
    ("dly 1", "delay 1"), ("dly 2", "delay 2"),
    ("multitap", "multi delay 1"), ("multitap delay", "multi delay 1"),
    ("multitap 1", "multi delay 1"), ("multitap 2", "multi delay 2"),
    ("megatap", "megatap delay"),
    ("reverb", "reverb 1"), ("verb", "reverb 1"),
    ("verb 1", "reverb 1"), ("verb 2", "reverb 2"),

    // modulation
    ("chorus", "chorus 1"), ("cho 1", "chorus 1"), ("cho 2", "chorus 2"),
    ("quad chorus", "quad chorus 1"),
    ("flanger", "flanger 1"), ("flange", "flanger 1"),
    ("flange 1", "flanger 1"), ("flange 2", "flanger 2"),
    ("phaser", "phaser 1"), ("phase 1", "phaser 1"), ("phase 2", "phaser 2"),
    ("rotary", "rotary 1"), ("leslie", "rotary 1"),
    ("tremolo", "tremolo 1"), ("trem", "tremolo 1"),
    ("trem 1", "tremolo 1"), ("trem 2", "tremolo 2"),
    ("ring mod", "ring modulator"), ("ringmod", "ring modulator"),

    // wah, filter, pitch
    ("wah", "wah-wah 1"), ("wahwah", "wah-wah 1"),
    ("wah 1", "wah-wah 1"), ("wah 2", "wah-wah 2"),
    ("wahwah 1", "wah-wah 1"), ("wahwah 2", "wah-wah 2"),
    ("filter", "filter 1"),
    ("pitch", "pitch 1"),
    ("whammy", "pitch 1"), ("whammy 1", "pitch 1"), ("whammy 2", "pitch 2"),
    ("pitch shift 1", "pitch 1"), ("pitch shift 2", "pitch 2"),
    ("harmonizer", "pitch 1"),

    // drive and volume
    ("drive", "drive 1"),
    ("dist", "drive 1"), ("distortion", "drive 1"),
    ("dist 1", "drive 1"), ("dist 2", "drive 2"),
    ("od 1", "drive 1"), ("od 2", "drive 2"),
    ("volume", "volume/pan 1"), ("vol", "volume/pan 1"),
    ("vol 1", "volume/pan 1"), ("vol 2", "volume/pan 2"),
    ("vol 3", "volume/pan 3"), ("vol 4", "volume/pan 4"),
    ("pan 1", "volume/pan 1"), ("pan 2", "volume/pan 2"),

    // misc
    ("xover", "crossover 1"),
    ("xover 1", "crossover 1"), ("xover 2", "crossover 2"),
    ("resonator", "resonator 1"),
    ("synth", "synth 1"),
    ("vocoder 1", "vocoder"),
    ("tonematch", "tone match"), ("tone-match", "tone match"),
    ("fx loop", "effects loop"), ("fxloop", "effects loop"),
    ("loop l", "effects loop"), ("loop r", "effects loop"),
    ("metro", "metronome"),
];

pub static SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    SYNONYM_LIST.iter().cloned().collect()
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn cc_assignments_are_unique() {
        let mut seen = HashSet::new();
        for (name, cc) in DEFAULT_CC.iter() {
            assert!(seen.insert(*cc), "bypass cc {} assigned twice ({})", cc, name);
        }
        for (name, cc) in XY_CC.iter() {
            assert!(seen.insert(*cc), "x/y cc {} collides ({})", cc, name);
        }
        // fixed assignments stay clear of the block range
        assert!(!seen.contains(&cc::SCENE_SELECT));
        assert!(!seen.contains(&cc::TAP_TEMPO));
    }

    #[test]
    fn synonym_targets_are_canonical() {
        for (_, target) in SYNONYM_LIST.iter() {
            if let Some(next) = SYNONYMS.get(target) {
                assert_eq!(next, target, "synonym target {:?} is not canonical", target);
            }
        }
    }

    #[test]
    fn legacy_looper_names_map_to_delays() {
        assert_eq!(SYNONYMS["looper 1"], "delay 1");
        assert_eq!(SYNONYMS["looper 2"], "delay 2");
    }
}
