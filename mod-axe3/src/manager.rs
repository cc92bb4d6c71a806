use std::collections::HashMap;
use std::time::Duration;
use bytes::Bytes;
use log::*;

use axe_core::device::{AxeDevice, AxeModel, LooperButton, LooperFlags, Presence};
use axe_core::event::*;
use axe_core::midi::MidiMessage;
use axe_core::patch::{MainDisplayRef, PatchRef};
use axe_core::timer::{DebounceTimer, PollTimer};

use crate::config::{NUM_PRESETS, NUM_SCENES};
use crate::midi::{AxeMessage, BlockStatus, CURRENT, HEADER};
use crate::names::normalize;
use crate::registry::{EffectRegistry, MAX_CHANNELS};

const NAME_SYNC_DELAY: Duration = Duration::from_millis(300);
const EFFECTS_SYNC_DELAY: Duration = Duration::from_millis(300);
const LOOPER_SYNC_DELAY: Duration = Duration::from_millis(250);
const POLL_PERIOD: Duration = Duration::from_secs(5);

/// Axe-Fx III device manager: owns the effect registry and all preset,
/// scene and looper state mirrored from the device, and answers both
/// device traffic and bus requests. All methods run on the manager task;
/// outgoing MIDI leaves as `AppEvent::MidiOut` on the bus.
pub struct Axe3Manager {
    registry: EffectRegistry,
    tx: EventSender,
    midi_channel: u8,

    main_display: Option<MainDisplayRef>,
    tempo_patch: Option<PatchRef>,
    tempo_active: bool,
    scene_patches: [Option<PatchRef>; NUM_SCENES],
    looper_patches: HashMap<LooperButton, PatchRef>,

    firmware: Option<(u8, u8)>,
    current_preset: i32,
    current_preset_name: String,
    current_scene: i32,
    current_scene_name: String,
    scene_names: [String; NUM_SCENES],

    looper_flags: LooperFlags,
    looper_present: Presence,
    looper_state_requested: bool,

    /// Preset-name queries in flight that must be treated as a change
    /// even when the preset number comes back the same
    pending_preset_requests: u32,
    /// Scene currently being enumerated, or -1 when no enumeration runs
    scene_name_request_idx: i32,
    /// Set on a preset change; the next current-scene answer kicks off
    /// the all-scenes name enumeration
    scene_enumeration_pending: bool,

    name_sync: DebounceTimer,
    effects_sync: DebounceTimer,
    looper_sync: DebounceTimer,
    poll: Option<PollTimer>,
}

impl Axe3Manager {
    pub fn new(tx: EventSender, midi_channel: u8) -> Self {
        Self::with_registry(tx, midi_channel, EffectRegistry::new())
    }

    fn with_registry(tx: EventSender, midi_channel: u8, registry: EffectRegistry) -> Self {
        let poll = PollTimer::start(
            POLL_PERIOD, tx.clone(), AppEvent::Sync(SyncRequest::Poll));
        Axe3Manager {
            registry,
            midi_channel,
            main_display: None,
            tempo_patch: None,
            tempo_active: false,
            scene_patches: Default::default(),
            looper_patches: HashMap::new(),
            firmware: None,
            current_preset: -1,
            current_preset_name: String::new(),
            current_scene: -1,
            current_scene_name: String::new(),
            scene_names: Default::default(),
            looper_flags: LooperFlags::empty(),
            looper_present: Presence::Unknown,
            looper_state_requested: false,
            pending_preset_requests: 0,
            scene_name_request_idx: -1,
            scene_enumeration_pending: false,
            name_sync: DebounceTimer::new(NAME_SYNC_DELAY, tx.clone()),
            effects_sync: DebounceTimer::new(EFFECTS_SYNC_DELAY, tx.clone()),
            looper_sync: DebounceTimer::new(LOOPER_SYNC_DELAY, tx.clone()),
            poll: Some(poll),
            tx,
        }
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    // --- sending --------------------------------------------------

    fn send_bytes(&self, bytes: Vec<u8>) {
        if bytes.is_empty() { return }
        self.tx.send_or_warn(AppEvent::MidiOut(Bytes::from(bytes)));
    }

    fn send_sysex(&self, msg: AxeMessage) {
        self.send_bytes(msg.to_bytes());
    }

    /// A query sent before the device ever answered is replaced by a
    /// firmware version probe, so that detection always comes first.
    fn send_query(&self, msg: AxeMessage) {
        if self.firmware.is_none() {
            self.send_sysex(AxeMessage::FirmwareVersionRequest);
        } else {
            self.send_sysex(msg);
        }
    }

    fn request_preset_name(&mut self, silent: bool) {
        if !silent && self.firmware.is_some() {
            self.pending_preset_requests += 1;
        }
        self.send_query(AxeMessage::PresetNameRequest);
    }

    fn request_looper_state(&mut self) {
        self.looper_state_requested = true;
        self.send_query(AxeMessage::LooperStateRequest);
    }

    fn sync_name_and_effects(&mut self) {
        self.request_preset_name(false);
        self.send_query(AxeMessage::StatusDumpRequest);
    }

    // --- display --------------------------------------------------

    fn refresh_display(&self) {
        let Some(display) = self.main_display.as_ref() else { return };
        display.clear();
        if self.current_preset < 0 { return }

        let mut text = format!("{:03} {}", self.current_preset, self.current_preset_name);
        if self.current_scene >= 0 && !self.current_scene_name.is_empty() {
            text += &format!(" / {}", self.current_scene_name);
        }
        display.text_out(&text);
    }

    // --- receive handlers -----------------------------------------

    fn receive(&mut self, msg: AxeMessage) {
        match msg {
            AxeMessage::FirmwareVersion { major, minor } =>
                self.receive_firmware_version(major, minor),
            AxeMessage::PresetName { preset, name } =>
                self.receive_preset_name(preset, name),
            AxeMessage::SceneName { scene, name } =>
                self.receive_scene_name(scene, name),
            AxeMessage::Scene { scene } =>
                self.update_scene_status(scene, false),
            AxeMessage::StatusDump { blocks } =>
                self.receive_status_dump(blocks),
            AxeMessage::LooperState { flags } =>
                self.receive_looper_state(flags),
            AxeMessage::TempoBeat =>
                self.receive_tempo_beat(),
            AxeMessage::Ack { code } =>
                self.receive_ack(code),
            AxeMessage::Editor { id } =>
                trace!("ignoring editor traffic {:#04x}", id),
            other =>
                trace!("ignoring echoed message {:?}", other),
        }
    }

    fn receive_firmware_version(&mut self, major: u8, minor: u8) {
        if self.firmware.is_some() {
            trace!("firmware version already known");
            return;
        }
        self.firmware = Some((major, minor));
        let version = format!("{}.{:02}", major, minor);
        info!("Connected: {} firmware {}", self.model().display_name(), version);

        if let Some(display) = self.main_display.as_ref() {
            display.text_out(&format!("{} firmware {}", self.model().display_name(), version));
        }
        self.tx.send_or_warn(AppEvent::DeviceDetected(DeviceDetectedEvent {
            name: self.model().display_name().into(),
            version,
        }));

        self.request_looper_state();
        self.sync_name_and_effects();
    }

    fn receive_preset_name(&mut self, preset: u16, name: String) {
        let solicited = self.pending_preset_requests > 0;
        if solicited {
            self.pending_preset_requests -= 1;
        }
        let changed = solicited
            || self.current_preset != preset as i32
            || self.current_preset_name != name;
        if !changed { return }

        self.current_preset = preset as i32;
        self.current_preset_name = name.clone();
        self.tx.send_or_warn(AppEvent::PresetChange(PresetChangeEvent { preset, name }));
        self.refresh_display();

        // re-read the active scene first; its answer pulls in the status
        // dump and then enumerates all scene names of the new preset
        self.scene_name_request_idx = -1;
        self.scene_enumeration_pending = true;
        self.send_query(AxeMessage::SceneNameRequest { scene: CURRENT });
    }

    fn receive_scene_name(&mut self, scene: u8, name: String) {
        if self.scene_name_request_idx < 0 {
            // answer to a current-scene query after a scene or preset switch
            if scene as usize >= NUM_SCENES {
                warn!("scene {} out of range", scene);
                return;
            }
            self.set_current_scene(scene);
            self.current_scene_name = name.clone();
            self.scene_names[scene as usize] = name.clone();
            if let Some(patch) = &self.scene_patches[scene as usize] {
                patch.set_switch_text(&name);
            }
            self.send_query(AxeMessage::StatusDumpRequest);
            self.refresh_display();
            self.tx.send_or_warn(AppEvent::SceneChange(SceneChangeEvent { scene, name }));

            if self.scene_enumeration_pending {
                self.scene_enumeration_pending = false;
                self.scene_name_request_idx = 0;
                self.send_query(AxeMessage::SceneNameRequest { scene: 0 });
            }
            return;
        }

        // enumeration chain; an answer for any other scene is not part of
        // this run, so drop the whole run rather than mislabel the
        // remaining patches with shifted names
        let idx = self.scene_name_request_idx as usize;
        if scene as usize != idx {
            debug!("scene name {} arrived while requesting {}, aborting", scene, idx);
            self.scene_name_request_idx = -1;
            return;
        }
        self.scene_names[idx] = name.clone();
        if let Some(patch) = &self.scene_patches[idx] {
            patch.set_switch_text(&name);
        }
        if idx as i32 == self.current_scene {
            self.current_scene_name = name;
        }

        self.scene_name_request_idx += 1;
        if self.scene_name_request_idx as usize == NUM_SCENES {
            self.scene_name_request_idx = -1;
            self.refresh_display();
        } else {
            self.send_query(AxeMessage::SceneNameRequest {
                scene: self.scene_name_request_idx as u8
            });
        }
    }

    fn receive_status_dump(&mut self, blocks: Vec<BlockStatus>) {
        for block in self.registry.iter_mut() {
            block.present_in_preset = false;
        }

        let mut looper_seen = false;
        for status in blocks {
            let Some(block) = self.registry.lookup_by_id_mut(status.id) else {
                debug!("status dump for unknown block id {:#06x}", status.id);
                continue;
            };
            block.present_in_preset = true;
            block.current_channel = status.channel.min(MAX_CHANNELS as u8 - 1);
            block.max_channels = status.max_channels.clamp(1, MAX_CHANNELS as u8);
            for patch in &block.patches {
                patch.update_state(!status.bypassed);
            }
            for (i, slot) in block.channel_select_patches.iter().enumerate() {
                if let Some(patch) = slot {
                    patch.update_state(i as u8 == block.current_channel);
                }
            }
            if block.normalized_name == "looper" {
                looper_seen = true;
            }
        }

        for block in self.registry.iter() {
            if block.present_in_preset { continue }
            for patch in &block.patches {
                patch.disable();
            }
            for patch in block.channel_select_patches.iter().flatten() {
                patch.disable();
            }
        }

        self.update_looper_presence(looper_seen);
    }

    fn update_looper_presence(&mut self, looper_seen: bool) {
        let presence = if looper_seen { Presence::Present } else { Presence::Absent };
        if presence == self.looper_present { return }
        self.looper_present = presence;

        match presence {
            Presence::Present => {
                for patch in self.looper_patches.values() {
                    patch.update_state(false);
                }
                self.request_looper_state();
            }
            Presence::Absent => {
                self.looper_flags = LooperFlags::empty();
                for patch in self.looper_patches.values() {
                    if patch.supports_disabled_state() {
                        patch.disable();
                    } else {
                        patch.update_state(false);
                    }
                }
            }
            Presence::Unknown => {}
        }
    }

    fn receive_looper_state(&mut self, flags: LooperFlags) {
        if !self.looper_state_requested {
            // a button echo; query again once the transport settles
            self.delayed_looper_sync();
            return;
        }
        self.looper_state_requested = false;

        let prev = self.looper_flags;
        self.looper_flags = flags;

        let set = |button: LooperButton, active: bool| {
            if let Some(patch) = self.looper_patches.get(&button) {
                patch.update_state(active);
            }
        };
        set(LooperButton::Record, flags.contains(LooperFlags::RECORD));
        set(LooperButton::Play, flags.contains(LooperFlags::PLAY));
        set(LooperButton::Once, flags.contains(LooperFlags::ONCE));
        // reverse/half LEDs only move on an actual transition
        for (button, flag) in [
            (LooperButton::Reverse, LooperFlags::REVERSE),
            (LooperButton::Half, LooperFlags::HALF),
        ] {
            if prev.contains(flag) != flags.contains(flag) {
                set(button, flags.contains(flag));
            }
        }

        if prev == flags { return }
        let text = self.looper_phrase();
        if let Some(display) = self.main_display.as_ref() {
            display.transient_text_out(&text);
        }
        self.tx.send_or_warn(AppEvent::LooperChange(LooperChangeEvent { text }));
    }

    fn looper_phrase(&self) -> String {
        let parts = [
            (LooperFlags::RECORD, "recording"),
            (LooperFlags::PLAY, "playing"),
            (LooperFlags::OVERDUB, "overdub"),
            (LooperFlags::ONCE, "once"),
            (LooperFlags::REVERSE, "reverse"),
            (LooperFlags::HALF, "half-speed"),
        ];
        let words = parts.iter()
            .filter(|(flag, _)| self.looper_flags.contains(*flag))
            .map(|(_, word)| *word)
            .collect::<Vec<_>>();
        if words.is_empty() {
            "looper stopped".into()
        } else {
            words.join(", ")
        }
    }

    fn receive_tempo_beat(&mut self) {
        self.tempo_active = !self.tempo_active;
        if let Some(patch) = &self.tempo_patch {
            patch.update_state(self.tempo_active);
        }
    }

    fn receive_ack(&mut self, code: u8) {
        use crate::config::msg;
        match code {
            msg::TAP_TEMPO | msg::TUNER | msg::LOOPER_STATE | msg::SCENE =>
                trace!("command {:#04x} acknowledged", code),
            c if msg::EDITOR.contains(&c) =>
                trace!("editor command {:#04x} acknowledged", c),
            other =>
                debug!("unexpected ack sub-code {:#04x}", other),
        }
    }

    // --- scenes ---------------------------------------------------

    fn set_current_scene(&mut self, scene: u8) {
        self.current_scene = scene as i32;
        self.current_scene_name = self.scene_names[scene as usize].clone();
        for (i, slot) in self.scene_patches.iter().enumerate() {
            if let Some(patch) = slot {
                patch.update_state(i == scene as usize);
            }
        }
    }

    fn change_preset(&mut self, delta: i32) {
        let current = self.current_preset.max(0);
        let next = (current + delta).rem_euclid(NUM_PRESETS);
        debug!("switching to preset {}", next);

        let channel = self.midi_channel;
        self.send_bytes(MidiMessage::BankSelect {
            channel, bank: (next >> 7) as u8
        }.to_bytes());
        self.send_bytes(MidiMessage::ProgramChange {
            channel, program: (next & 0x7f) as u8
        }.to_bytes());

        self.delayed_name_sync(true);
        self.delayed_effects_sync();
    }

    fn change_scene(&mut self, delta: i32) {
        let current = self.current_scene.max(0);
        let next = (current + delta).rem_euclid(NUM_SCENES as i32);
        self.update_scene_status(next as u8, true);
    }
}

impl AxeDevice for Axe3Manager {
    fn model(&self) -> AxeModel {
        AxeModel::Three
    }

    fn channel(&self) -> u8 {
        self.midi_channel
    }

    fn set_main_display(&mut self, display: MainDisplayRef) {
        self.main_display = Some(display);
    }

    fn set_tempo_patch(&mut self, patch: PatchRef) {
        if self.tempo_patch.is_some() {
            warn!("tempo patch {:?} replaces an earlier binding", patch.name());
        }
        self.tempo_patch = Some(patch);
    }

    fn set_scene_patch(&mut self, scene: usize, patch: PatchRef) {
        if !(1..=NUM_SCENES).contains(&scene) {
            warn!("scene {} out of range for patch {:?}", scene, patch.name());
            return;
        }
        let idx = scene - 1;
        if self.scene_patches[idx].is_some() {
            warn!("scene {} already bound, replacing with {:?}", scene, patch.name());
        }
        if !self.scene_names[idx].is_empty() {
            patch.set_switch_text(&self.scene_names[idx]);
        }
        self.scene_patches[idx] = Some(patch);
    }

    fn set_sync_patch(&mut self, patch: PatchRef, effect_id: Option<u16>, channel: Option<u8>) {
        let name = patch.name();
        let block = match effect_id {
            Some(id) => self.registry.lookup_by_id_mut(id),
            None => {
                let normalized = normalize(&name);
                self.registry.lookup_by_name_mut(&normalized)
            }
        };
        let Some(block) = block else {
            warn!("no effect block for patch {:?}", name);
            return;
        };

        match channel {
            None => block.patches.push(patch),
            Some(c) if (c as usize) < MAX_CHANNELS => {
                if block.channel_select_patches[c as usize].is_some() {
                    warn!("channel {} of {:?} already bound, replacing", c, block.name);
                }
                block.channel_select_patches[c as usize] = Some(patch);
            }
            Some(c) => {
                warn!("channel {} out of range for patch {:?}", c, name);
            }
        }
    }

    fn set_looper_patch(&mut self, patch: PatchRef) {
        let name = normalize(&patch.name());
        let Some(button) = LooperButton::from_name(&name) else {
            warn!("no looper button for patch {:?}", patch.name());
            return;
        };
        if self.looper_patches.contains_key(&button) {
            warn!("looper {:?} already bound, ignoring {:?}", button, patch.name());
            return;
        }
        self.looper_patches.insert(button, patch);
    }

    fn force_refresh(&mut self) {
        self.request_looper_state();
        self.sync_name_and_effects();
    }

    fn delayed_name_sync(&mut self, force: bool) {
        self.name_sync.reset(AppEvent::Sync(SyncRequest::PresetName { force }));
    }

    fn delayed_effects_sync(&mut self) {
        self.effects_sync.reset(AppEvent::Sync(SyncRequest::Effects));
    }

    fn delayed_looper_sync(&mut self) {
        self.looper_sync.reset(AppEvent::Sync(SyncRequest::Looper));
    }

    fn increment_preset(&mut self) {
        self.change_preset(1);
    }

    fn decrement_preset(&mut self) {
        self.change_preset(-1);
    }

    fn reload_current_preset(&mut self) {
        self.change_preset(0);
    }

    fn increment_scene(&mut self) {
        self.change_scene(1);
    }

    fn decrement_scene(&mut self) {
        self.change_scene(-1);
    }

    fn update_scene_status(&mut self, scene: u8, user_action: bool) {
        if scene as usize >= NUM_SCENES {
            warn!("scene {} out of range", scene);
            return;
        }
        self.set_current_scene(scene);
        if user_action {
            self.send_sysex(AxeMessage::SceneSelect { scene });
        }
        self.send_query(AxeMessage::SceneNameRequest { scene: CURRENT });
    }

    fn receive_sysex(&mut self, bytes: &[u8]) -> bool {
        if !bytes.starts_with(&HEADER) {
            return false;
        }
        match AxeMessage::from_bytes(bytes) {
            Ok(msg) => self.receive(msg),
            Err(err) => debug!("unrecognized sysex: {}", err),
        }
        true
    }

    fn handle_app_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::MidiIn(bytes) => {
                self.receive_sysex(bytes);
            }
            AppEvent::Sync(SyncRequest::PresetName { force }) =>
                self.request_preset_name(!force),
            AppEvent::Sync(SyncRequest::Effects) =>
                self.send_query(AxeMessage::StatusDumpRequest),
            AppEvent::Sync(SyncRequest::Looper) =>
                self.request_looper_state(),
            AppEvent::Sync(SyncRequest::Poll) =>
                self.request_preset_name(true),
            AppEvent::Shutdown =>
                self.shutdown(),
            _ => {}
        }
    }

    fn shutdown(&mut self) {
        self.name_sync.cancel();
        self.effects_sync.cancel();
        self.looper_sync.cancel();
        if let Some(mut poll) = self.poll.take() {
            poll.cancel();
        }

        self.main_display = None;
        self.tempo_patch = None;
        self.scene_patches = Default::default();
        self.looper_patches.clear();
        for block in self.registry.iter_mut() {
            block.clear_patches();
        }

        self.firmware = None;
        self.current_preset = -1;
        self.current_preset_name.clear();
        self.current_scene = -1;
        self.current_scene_name.clear();
        self.scene_names = Default::default();
        self.looper_flags = LooperFlags::empty();
        self.looper_present = Presence::Unknown;
        self.looper_state_requested = false;
        self.pending_preset_requests = 0;
        self.scene_name_request_idx = -1;
        self.scene_enumeration_pending = false;
    }
}
