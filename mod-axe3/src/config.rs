use std::collections::HashMap;
use once_cell::sync::Lazy;

/// Axe-Fx III sysex message ids (byte 5 of the frame).
pub mod msg {
    pub const FIRMWARE_VERSION: u8 = 0x08;
    pub const EFFECT_BYPASS: u8 = 0x0a;
    pub const EFFECT_CHANNEL: u8 = 0x0b;
    pub const SCENE: u8 = 0x0c;
    pub const PRESET_NAME: u8 = 0x0d;
    pub const SCENE_NAME: u8 = 0x0e;
    pub const LOOPER_STATE: u8 = 0x0f;
    pub const TAP_TEMPO: u8 = 0x10;
    pub const TUNER: u8 = 0x11;
    pub const STATUS_DUMP: u8 = 0x13;
    pub const TEMPO: u8 = 0x14;
    pub const ACK: u8 = 0x64;

    /// Ids the Axe-Edit software exchanges with the device. We see them
    /// echoed on the wire; they are acknowledged but otherwise ignored.
    pub const EDITOR: [u8; 3] = [0x21, 0x22, 0x23];
}

pub const NUM_SCENES: usize = 8;
pub const NUM_PRESETS: i32 = 1024;

#[derive(Clone, Copy, Debug)]
pub struct BlockDef {
    pub id: u16,
    pub name: &'static str,
}

macro_rules! blk {
    ($id:expr, $name:expr) => (BlockDef { id: $id, name: $name });
}

/// The fixed Axe-Fx III effect block taxonomy: every addressable fixed,
/// per-instance and utility block with its device-assigned sysex id.
/// Order matches the device's own enumeration.
pub static BLOCKS: Lazy<Vec<BlockDef>> = Lazy::new(|| {
    vec![
        // i/o and routing utility blocks
        blk!(32, "Input 1"),
        blk!(33, "Input 2"),
        blk!(34, "Input 3"),
        blk!(35, "Input 4"),
        blk!(36, "Input 5"),
        blk!(37, "Output 1"),
        blk!(38, "Output 2"),
        blk!(39, "Output 3"),
        blk!(40, "Output 4"),
        blk!(41, "Send 1"),
        blk!(42, "Send 2"),
        blk!(43, "Send 3"),
        blk!(44, "Send 4"),
        blk!(45, "Return 1"),
        blk!(46, "Return 2"),
        blk!(47, "Return 3"),
        blk!(48, "Return 4"),
        blk!(49, "Mixer 1"),
        blk!(50, "Mixer 2"),
        blk!(51, "Mixer 3"),
        blk!(52, "Mixer 4"),
        blk!(53, "Feedback Send"),
        blk!(54, "Feedback Return"),
        blk!(55, "Looper"),
        blk!(56, "Tuner"),
        blk!(57, "Scene MIDI"),

        // effect blocks
        blk!(58, "Compressor 1"),
        blk!(59, "Compressor 2"),
        blk!(60, "Compressor 3"),
        blk!(61, "Compressor 4"),
        blk!(62, "Graphic EQ 1"),
        blk!(63, "Graphic EQ 2"),
        blk!(64, "Graphic EQ 3"),
        blk!(65, "Graphic EQ 4"),
        blk!(66, "Parametric EQ 1"),
        blk!(67, "Parametric EQ 2"),
        blk!(68, "Parametric EQ 3"),
        blk!(69, "Parametric EQ 4"),
        blk!(70, "Amp 1"),
        blk!(71, "Amp 2"),
        blk!(72, "Cabinet 1"),
        blk!(73, "Cabinet 2"),
        blk!(74, "Reverb 1"),
        blk!(75, "Reverb 2"),
        blk!(76, "Reverb 3"),
        blk!(77, "Reverb 4"),
        blk!(78, "Delay 1"),
        blk!(79, "Delay 2"),
        blk!(80, "Delay 3"),
        blk!(81, "Delay 4"),
        blk!(82, "Multitap Delay 1"),
        blk!(83, "Multitap Delay 2"),
        blk!(84, "Multitap Delay 3"),
        blk!(85, "Multitap Delay 4"),
        blk!(86, "Chorus 1"),
        blk!(87, "Chorus 2"),
        blk!(88, "Chorus 3"),
        blk!(89, "Chorus 4"),
        blk!(90, "Flanger 1"),
        blk!(91, "Flanger 2"),
        blk!(92, "Flanger 3"),
        blk!(93, "Flanger 4"),
        blk!(94, "Rotary 1"),
        blk!(95, "Rotary 2"),
        blk!(96, "Rotary 3"),
        blk!(97, "Rotary 4"),
        blk!(98, "Phaser 1"),
        blk!(99, "Phaser 2"),
        blk!(100, "Phaser 3"),
        blk!(101, "Phaser 4"),
        blk!(102, "Wah-Wah 1"),
        blk!(103, "Wah-Wah 2"),
        blk!(104, "Wah-Wah 3"),
        blk!(105, "Wah-Wah 4"),
        blk!(106, "Formant 1"),
        blk!(107, "Formant 2"),
        blk!(108, "Formant 3"),
        blk!(109, "Formant 4"),
        blk!(110, "Volume/Pan 1"),
        blk!(111, "Volume/Pan 2"),
        blk!(112, "Volume/Pan 3"),
        blk!(113, "Volume/Pan 4"),
        blk!(114, "Tremolo 1"),
        blk!(115, "Tremolo 2"),
        blk!(116, "Tremolo 3"),
        blk!(117, "Tremolo 4"),
        blk!(118, "Pitch 1"),
        blk!(119, "Pitch 2"),
        blk!(120, "Pitch 3"),
        blk!(121, "Pitch 4"),
        blk!(122, "Filter 1"),
        blk!(123, "Filter 2"),
        blk!(124, "Filter 3"),
        blk!(125, "Filter 4"),
        blk!(126, "Drive 1"),
        blk!(127, "Drive 2"),
        blk!(128, "Drive 3"),
        blk!(129, "Drive 4"),
        blk!(130, "Enhancer 1"),
        blk!(131, "Enhancer 2"),
        blk!(132, "Effects Loop"),
        blk!(133, "Synth 1"),
        blk!(134, "Synth 2"),
        blk!(135, "Synth 3"),
        blk!(136, "Synth 4"),
        blk!(137, "Vocoder"),
        blk!(138, "Megatap Delay 1"),
        blk!(139, "Megatap Delay 2"),
        blk!(140, "Megatap Delay 3"),
        blk!(141, "Megatap Delay 4"),
        blk!(142, "Crossover 1"),
        blk!(143, "Crossover 2"),
        blk!(144, "Crossover 3"),
        blk!(145, "Crossover 4"),
        blk!(146, "Gate/Expander 1"),
        blk!(147, "Gate/Expander 2"),
        blk!(148, "Gate/Expander 3"),
        blk!(149, "Gate/Expander 4"),
        blk!(150, "Ring Modulator 1"),
        blk!(151, "Ring Modulator 2"),
        blk!(152, "Multiband Compressor 1"),
        blk!(153, "Multiband Compressor 2"),
        blk!(154, "Multiband Compressor 3"),
        blk!(155, "Multiband Compressor 4"),
        blk!(156, "Quad Chorus 1"),
        blk!(157, "Quad Chorus 2"),
        blk!(158, "Quad Chorus 3"),
        blk!(159, "Quad Chorus 4"),
        blk!(160, "Resonator 1"),
        blk!(161, "Resonator 2"),
        blk!(162, "Resonator 3"),
        blk!(163, "Resonator 4"),
        blk!(164, "Ten-Tap Delay 1"),
        blk!(165, "Ten-Tap Delay 2"),
        blk!(166, "Ten-Tap Delay 3"),
        blk!(167, "Ten-Tap Delay 4"),
        blk!(168, "Plex Delay 1"),
        blk!(169, "Plex Delay 2"),
        blk!(170, "Plex Delay 3"),
        blk!(171, "Plex Delay 4"),
        blk!(172, "Multiplexer 1"),
        blk!(173, "Multiplexer 2"),
        blk!(174, "Multiplexer 3"),
        blk!(175, "Multiplexer 4"),
        blk!(176, "RTA 1"),
        blk!(177, "RTA 2"),
        blk!(178, "Tone Match"),
        blk!(179, "IR Player 1"),
        blk!(180, "IR Player 2"),
    ]
});

/// Axe-Fx III synonym table: exact-match substitutions applied after
/// lower-casing and prefix/parenthetical stripping. This table is specific
/// to the III and intentionally kept separate from the legacy table — the
/// two diverge (e.g. the legacy "looper N" aliases do not exist here).
pub(crate) static SYNONYM_LIST: &[(&str, &str)] = &[
    // tempo and tuner
    ("tap", "taptempo"), ("tap tempo", "taptempo"), ("tempo tap", "taptempo"),
    ("tempo", "taptempo"),
    ("tune", "tuner"), ("pitch detector", "tuner"),

    // looper commands
    ("loop", "looper"),
    ("loop rec", "looper record"), ("loop record", "looper record"),
    ("looper rec", "looper record"),
    ("loop play", "looper play"),
    ("loop once", "looper once"), ("looper play once", "looper once"),
    ("loop undo", "looper undo"),
    ("loop rev", "looper reverse"), ("looper rev", "looper reverse"),
    ("loop reverse", "looper reverse"),
    ("loop half", "looper half"), ("looper half-speed", "looper half"),
    ("looper half speed", "looper half"), ("looper halfspeed", "looper half"),

    // amps and cabs
    ("amp", "amp 1"), ("amplifier", "amp 1"),
    ("amplifier 1", "amp 1"), ("amplifier 2", "amp 2"),
    ("cab", "cabinet 1"), ("cabinet", "cabinet 1"),
    ("cab 1", "cabinet 1"), ("cab 2", "cabinet 2"),

    // compressors
    ("comp", "compressor 1"), ("compressor", "compressor 1"),
    ("comp 1", "compressor 1"), ("comp 2", "compressor 2"),
    ("comp 3", "compressor 3"), ("comp 4", "compressor 4"),
    ("mbc", "multiband compressor 1"),
    ("mbc 1", "multiband compressor 1"), ("mbc 2", "multiband compressor 2"),
    ("mbc 3", "multiband compressor 3"), ("mbc 4", "multiband compressor 4"),
    ("multi comp", "multiband compressor 1"),
    ("multi comp 1", "multiband compressor 1"),
    ("multi comp 2", "multiband compressor 2"),
    ("multi comp 3", "multiband compressor 3"),
    ("multi comp 4", "multiband compressor 4"),

    // eq
    ("geq", "graphic eq 1"), ("graphic eq", "graphic eq 1"),
    ("geq 1", "graphic eq 1"), ("geq 2", "graphic eq 2"),
    ("geq 3", "graphic eq 3"), ("geq 4", "graphic eq 4"),
    ("graphiceq 1", "graphic eq 1"), ("graphiceq 2", "graphic eq 2"),
    ("peq", "parametric eq 1"), ("parametric eq", "parametric eq 1"),
    ("peq 1", "parametric eq 1"), ("peq 2", "parametric eq 2"),
    ("peq 3", "parametric eq 3"), ("peq 4", "parametric eq 4"),
    ("para eq 1", "parametric eq 1"), ("para eq 2", "parametric eq 2"),
    ("para eq 3", "parametric eq 3"), ("para eq 4", "parametric eq 4"),

    // delays
    ("delay", "delay 1"), ("dly", "delay 1"),
    ("dly 1", "delay 1"), ("dly 2", "delay 2"),
    ("dly 3", "delay 3"), ("dly 4", "delay 4"),
    ("multitap", "multitap delay 1"), ("multi delay", "multitap delay 1"),
    ("multi delay 1", "multitap delay 1"), ("multi delay 2", "multitap delay 2"),
    ("multi delay 3", "multitap delay 3"), ("multi delay 4", "multitap delay 4"),
    ("multitap 1", "multitap delay 1"), ("multitap 2", "multitap delay 2"),
    ("multitap 3", "multitap delay 3"), ("multitap 4", "multitap delay 4"),
    ("megatap", "megatap delay 1"),
    ("megatap 1", "megatap delay 1"), ("megatap 2", "megatap delay 2"),
    ("megatap 3", "megatap delay 3"), ("megatap 4", "megatap delay 4"),
    ("ten tap", "ten-tap delay 1"), ("tentap", "ten-tap delay 1"),
    ("ten tap 1", "ten-tap delay 1"), ("ten tap 2", "ten-tap delay 2"),
    ("ten tap 3", "ten-tap delay 3"), ("ten tap 4", "ten-tap delay 4"),
    ("tentap 1", "ten-tap delay 1"), ("tentap 2", "ten-tap delay 2"),
    ("tentap 3", "ten-tap delay 3"), ("tentap 4", "ten-tap delay 4"),
    ("plex", "plex delay 1"),
    ("plex 1", "plex delay 1"), ("plex 2", "plex delay 2"),
    ("plex 3", "plex delay 3"), ("plex 4", "plex delay 4"),

    // reverb
    ("reverb", "reverb 1"), ("verb", "reverb 1"),
    ("verb 1", "reverb 1"), ("verb 2", "reverb 2"),
    ("verb 3", "reverb 3"), ("verb 4", "reverb 4"),

    // modulation
    ("chorus", "chorus 1"), ("cho", "chorus 1"),
    ("cho 1", "chorus 1"), ("cho 2", "chorus 2"),
    ("cho 3", "chorus 3"), ("cho 4", "chorus 4"),
    ("quad chorus", "quad chorus 1"),
    ("quad 1", "quad chorus 1"), ("quad 2", "quad chorus 2"),
    ("quad 3", "quad chorus 3"), ("quad 4", "quad chorus 4"),
    ("flanger", "flanger 1"), ("flange", "flanger 1"),
    ("flange 1", "flanger 1"), ("flange 2", "flanger 2"),
    ("flange 3", "flanger 3"), ("flange 4", "flanger 4"),
    ("phaser", "phaser 1"), ("phase", "phaser 1"),
    ("phase 1", "phaser 1"), ("phase 2", "phaser 2"),
    ("phase 3", "phaser 3"), ("phase 4", "phaser 4"),
    ("rotary", "rotary 1"), ("leslie", "rotary 1"),
    ("tremolo", "tremolo 1"), ("trem", "tremolo 1"),
    ("trem 1", "tremolo 1"), ("trem 2", "tremolo 2"),
    ("trem 3", "tremolo 3"), ("trem 4", "tremolo 4"),
    ("panner 1", "tremolo 1"), ("panner 2", "tremolo 2"),
    ("panner 3", "tremolo 3"), ("panner 4", "tremolo 4"),
    ("ring mod", "ring modulator 1"), ("ringmod", "ring modulator 1"),
    ("ring mod 1", "ring modulator 1"), ("ring mod 2", "ring modulator 2"),
    ("ringmod 1", "ring modulator 1"), ("ringmod 2", "ring modulator 2"),

    // wah and filters
    ("wah", "wah-wah 1"), ("wahwah", "wah-wah 1"),
    ("wah 1", "wah-wah 1"), ("wah 2", "wah-wah 2"),
    ("wah 3", "wah-wah 3"), ("wah 4", "wah-wah 4"),
    ("wahwah 1", "wah-wah 1"), ("wahwah 2", "wah-wah 2"),
    ("wahwah 3", "wah-wah 3"), ("wahwah 4", "wah-wah 4"),
    ("filter", "filter 1"),
    ("autofilter 1", "filter 1"), ("autofilter 2", "filter 2"),
    ("formant", "formant 1"),
    ("xover", "crossover 1"), ("crossover", "crossover 1"),
    ("xover 1", "crossover 1"), ("xover 2", "crossover 2"),
    ("xover 3", "crossover 3"), ("xover 4", "crossover 4"),
    ("resonator", "resonator 1"),
    ("res 1", "resonator 1"), ("res 2", "resonator 2"),
    ("res 3", "resonator 3"), ("res 4", "resonator 4"),

    // drive and pitch
    ("drive", "drive 1"),
    ("dist", "drive 1"), ("distortion", "drive 1"),
    ("dist 1", "drive 1"), ("dist 2", "drive 2"),
    ("dist 3", "drive 3"), ("dist 4", "drive 4"),
    ("od 1", "drive 1"), ("od 2", "drive 2"),
    ("od 3", "drive 3"), ("od 4", "drive 4"),
    ("overdrive 1", "drive 1"), ("overdrive 2", "drive 2"),
    ("pitch", "pitch 1"),
    ("whammy", "pitch 1"),
    ("whammy 1", "pitch 1"), ("whammy 2", "pitch 2"),
    ("whammy 3", "pitch 3"), ("whammy 4", "pitch 4"),
    ("pitch shift", "pitch 1"),
    ("pitch shift 1", "pitch 1"), ("pitch shift 2", "pitch 2"),
    ("pitch shift 3", "pitch 3"), ("pitch shift 4", "pitch 4"),
    ("harmonizer", "pitch 1"),
    ("detune 1", "pitch 1"), ("detune 2", "pitch 2"),

    // gates, volume, dynamics
    ("gate", "gate/expander 1"),
    ("gate 1", "gate/expander 1"), ("gate 2", "gate/expander 2"),
    ("gate 3", "gate/expander 3"), ("gate 4", "gate/expander 4"),
    ("expander 1", "gate/expander 1"), ("expander 2", "gate/expander 2"),
    ("expander 3", "gate/expander 3"), ("expander 4", "gate/expander 4"),
    ("volume", "volume/pan 1"),
    ("vol", "volume/pan 1"),
    ("vol 1", "volume/pan 1"), ("vol 2", "volume/pan 2"),
    ("vol 3", "volume/pan 3"), ("vol 4", "volume/pan 4"),
    ("volume 1", "volume/pan 1"), ("volume 2", "volume/pan 2"),
    ("volume 3", "volume/pan 3"), ("volume 4", "volume/pan 4"),
    ("pan 1", "volume/pan 1"), ("pan 2", "volume/pan 2"),
    ("pan 3", "volume/pan 3"), ("pan 4", "volume/pan 4"),
    ("enhancer", "enhancer 1"),

    // synth, vocoder, misc
    ("synth", "synth 1"),
    ("vocoder 1", "vocoder"),
    ("tonematch", "tone match"), ("tone-match", "tone match"),
    ("irplayer", "ir player 1"), ("ir player", "ir player 1"),
    ("ir 1", "ir player 1"), ("ir 2", "ir player 2"),
    ("rta", "rta 1"),
    ("mux", "multiplexer 1"),
    ("mux 1", "multiplexer 1"), ("mux 2", "multiplexer 2"),
    ("mux 3", "multiplexer 3"), ("mux 4", "multiplexer 4"),
    ("multiplexer", "multiplexer 1"),
    ("fx loop", "effects loop"), ("fxloop", "effects loop"),
    ("loop l", "effects loop"), ("loop r", "effects loop"),

    // routing utility
    ("in 1", "input 1"), ("in 2", "input 2"),
    ("in 3", "input 3"), ("in 4", "input 4"), ("in 5", "input 5"),
    ("input", "input 1"),
    ("out 1", "output 1"), ("out 2", "output 2"),
    ("out 3", "output 3"), ("out 4", "output 4"),
    ("output", "output 1"),
    ("mix 1", "mixer 1"), ("mix 2", "mixer 2"),
    ("mix 3", "mixer 3"), ("mix 4", "mixer 4"),
    ("mixer", "mixer 1"),
    ("ret 1", "return 1"), ("ret 2", "return 2"),
    ("ret 3", "return 3"), ("ret 4", "return 4"),
    ("fb send", "feedback send"), ("feedback", "feedback send"),
    ("fb return", "feedback return"), ("fb ret", "feedback return"),
    ("send", "send 1"), ("return", "return 1"),
    ("scene midi block", "scene midi"), ("midi block", "scene midi"),
];

pub static SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    SYNONYM_LIST.iter().cloned().collect()
});
