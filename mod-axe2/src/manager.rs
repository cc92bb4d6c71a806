use std::collections::HashMap;
use std::time::Duration;
use bytes::Bytes;
use log::*;

use axe_core::device::{AxeDevice, AxeModel, LooperButton, LooperFlags, Presence};
use axe_core::event::*;
use axe_core::midi::MidiMessage;
use axe_core::patch::{MainDisplayRef, PatchRef};
use axe_core::timer::{DebounceTimer, PollTimer};

use crate::config::{cc, NUM_PRESETS, NUM_SCENES};
use crate::midi::{is_legacy_frame, Axe2Message, EffectState};
use crate::names::normalize;
use crate::registry::{EffectRegistry, NUM_CHANNELS};

const NAME_SYNC_DELAY: Duration = Duration::from_millis(300);
const EFFECTS_SYNC_DELAY: Duration = Duration::from_millis(300);
const POLL_PERIOD: Duration = Duration::from_secs(5);

/// Axe-Fx II device manager. Same shape as the third-generation one, but
/// commands ride on control changes, scene names do not exist and looper
/// state is push-only, so there is nothing to query for it.
pub struct Axe2Manager {
    registry: EffectRegistry,
    tx: EventSender,
    midi_channel: u8,
    model: AxeModel,

    main_display: Option<MainDisplayRef>,
    tempo_patch: Option<PatchRef>,
    tempo_active: bool,
    scene_patches: [Option<PatchRef>; NUM_SCENES],
    looper_patches: HashMap<LooperButton, PatchRef>,

    firmware: Option<(u8, u8)>,
    current_preset: i32,
    current_preset_name: String,
    current_scene: i32,

    looper_flags: LooperFlags,
    looper_present: Presence,

    pending_preset_requests: u32,

    name_sync: DebounceTimer,
    effects_sync: DebounceTimer,
    poll: Option<PollTimer>,
}

impl Axe2Manager {
    pub fn new(tx: EventSender, midi_channel: u8) -> Self {
        Self::new_with_model(tx, midi_channel, AxeModel::Two)
    }

    /// The Standard and Ultra speak the same dialect under their own
    /// sysex model bytes.
    pub fn new_with_model(tx: EventSender, midi_channel: u8, model: AxeModel) -> Self {
        Self::with_registry(tx, midi_channel, model, EffectRegistry::new())
    }

    fn with_registry(tx: EventSender, midi_channel: u8, model: AxeModel,
        registry: EffectRegistry) -> Self
    {
        let poll = PollTimer::start(
            POLL_PERIOD, tx.clone(), AppEvent::Sync(SyncRequest::Poll));
        Axe2Manager {
            registry,
            midi_channel,
            model,
            main_display: None,
            tempo_patch: None,
            tempo_active: false,
            scene_patches: Default::default(),
            looper_patches: HashMap::new(),
            firmware: None,
            current_preset: -1,
            current_preset_name: String::new(),
            current_scene: -1,
            looper_flags: LooperFlags::empty(),
            looper_present: Presence::Unknown,
            pending_preset_requests: 0,
            name_sync: DebounceTimer::new(NAME_SYNC_DELAY, tx.clone()),
            effects_sync: DebounceTimer::new(EFFECTS_SYNC_DELAY, tx.clone()),
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

    fn send_sysex(&self, msg: Axe2Message) {
        self.send_bytes(msg.to_bytes_for(self.model.sysex_model_byte()));
    }

    fn send_query(&self, msg: Axe2Message) {
        if self.firmware.is_none() {
            self.send_sysex(Axe2Message::FirmwareVersionRequest);
        } else {
            self.send_sysex(msg);
        }
    }

    fn request_preset_name(&mut self, silent: bool) {
        if !silent && self.firmware.is_some() {
            self.pending_preset_requests += 1;
        }
        self.send_query(Axe2Message::PresetNameRequest);
    }

    fn sync_name_and_effects(&mut self) {
        self.request_preset_name(false);
        self.send_query(Axe2Message::PresetEffectsRequest);
    }

    fn refresh_display(&self) {
        let Some(display) = self.main_display.as_ref() else { return };
        display.clear();
        if self.current_preset < 0 && self.current_preset_name.is_empty() { return }

        let mut text = format!("{:03} {}",
            self.current_preset.max(0), self.current_preset_name);
        if self.current_scene >= 0 {
            text += &format!(" / scene {}", self.current_scene + 1);
        }
        display.text_out(&text);
    }

    // --- receive handlers -----------------------------------------

    fn receive(&mut self, msg: Axe2Message) {
        match msg {
            Axe2Message::FirmwareVersion { major, minor } =>
                self.receive_firmware_version(major, minor),
            Axe2Message::PresetName { name, complete } =>
                self.receive_preset_name(name, complete),
            Axe2Message::PresetChange { preset } =>
                self.receive_preset_change(preset),
            Axe2Message::PresetEffects { blocks } =>
                self.receive_preset_effects(blocks),
            Axe2Message::LooperState { flags } =>
                self.receive_looper_state(flags),
            Axe2Message::TempoBeat =>
                self.receive_tempo_beat(),
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

        self.sync_name_and_effects();
    }

    fn receive_preset_name(&mut self, name: String, complete: bool) {
        let solicited = self.pending_preset_requests > 0;
        if solicited {
            self.pending_preset_requests -= 1;
        }
        // the effect states belong to whatever preset answered, complete
        // name or not
        self.send_query(Axe2Message::PresetEffectsRequest);

        if !complete {
            debug!("truncated preset name {:?}, re-querying", name);
            self.delayed_name_sync(true);
            return;
        }

        let changed = solicited || self.current_preset_name != name;
        if !changed { return }

        self.current_preset_name = name.clone();
        self.tx.send_or_warn(AppEvent::PresetChange(PresetChangeEvent {
            preset: self.current_preset.max(0) as u16,
            name,
        }));
        self.refresh_display();
    }

    fn receive_preset_change(&mut self, preset: u16) {
        if self.current_preset == preset as i32 { return }
        debug!("device switched to preset {}", preset);
        self.current_preset = preset as i32;
        self.delayed_name_sync(true);
        self.delayed_effects_sync();
    }

    fn receive_preset_effects(&mut self, blocks: Vec<EffectState>) {
        for block in self.registry.iter_mut() {
            block.present_in_preset = false;
        }

        let mut looper_seen = false;
        for state in blocks {
            let Some(block) = self.registry.lookup_by_id_mut(state.id) else {
                debug!("effect state for unknown block id {}", state.id);
                continue;
            };
            block.present_in_preset = true;
            block.current_channel = state.y_active as u8;
            for patch in &block.patches {
                patch.update_state(!state.bypassed);
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

    // --- navigation -----------------------------------------------

    fn set_current_scene(&mut self, scene: u8) {
        self.current_scene = scene as i32;
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
        self.current_preset = next;

        self.delayed_name_sync(true);
        self.delayed_effects_sync();
    }

    fn change_scene(&mut self, delta: i32) {
        let current = self.current_scene.max(0);
        let next = (current + delta).rem_euclid(NUM_SCENES as i32);
        self.update_scene_status(next as u8, true);
    }
}

impl AxeDevice for Axe2Manager {
    fn model(&self) -> AxeModel {
        self.model
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
        if self.scene_patches[scene - 1].is_some() {
            warn!("scene {} already bound, replacing with {:?}", scene, patch.name());
        }
        // no scene names on this generation, label by number
        patch.set_switch_text(&format!("Scene {}", scene));
        self.scene_patches[scene - 1] = Some(patch);
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
            Some(c) if (c as usize) < NUM_CHANNELS => {
                if block.xy_cc.is_none() {
                    warn!("block {:?} has no X/Y switch", block.name);
                }
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
        self.sync_name_and_effects();
    }

    fn delayed_name_sync(&mut self, force: bool) {
        self.name_sync.reset(AppEvent::Sync(SyncRequest::PresetName { force }));
    }

    fn delayed_effects_sync(&mut self) {
        self.effects_sync.reset(AppEvent::Sync(SyncRequest::Effects));
    }

    fn delayed_looper_sync(&mut self) {
        // looper state is push-only on this generation
        trace!("no looper query on this generation");
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
            self.send_bytes(MidiMessage::ControlChange {
                channel: self.midi_channel,
                control: cc::SCENE_SELECT,
                value: scene,
            }.to_bytes());
        }
        self.refresh_display();
    }

    fn receive_sysex(&mut self, bytes: &[u8]) -> bool {
        if !is_legacy_frame(bytes) {
            return false;
        }
        match Axe2Message::from_bytes(bytes) {
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
                self.send_query(Axe2Message::PresetEffectsRequest),
            AppEvent::Sync(SyncRequest::Looper) => {}
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
        self.looper_flags = LooperFlags::empty();
        self.looper_present = Presence::Unknown;
        self.pending_preset_requests = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::sync::broadcast;
    use axe_core::patch::{MainDisplay, Patch, PatchCaps};
    use crate::config::msg;
    use crate::midi::HEADER;

    struct MockPatch {
        name: String,
        states: Mutex<Vec<bool>>,
        disables: Mutex<u32>,
        texts: Mutex<Vec<String>>,
    }

    impl MockPatch {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(MockPatch {
                name: name.into(),
                states: Mutex::new(vec![]),
                disables: Mutex::new(0),
                texts: Mutex::new(vec![]),
            })
        }

        fn states(&self) -> Vec<bool> {
            self.states.lock().unwrap().clone()
        }

        fn disables(&self) -> u32 {
            *self.disables.lock().unwrap()
        }

        fn texts(&self) -> Vec<String> {
            self.texts.lock().unwrap().clone()
        }
    }

    impl Patch for MockPatch {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn caps(&self) -> PatchCaps {
            PatchCaps::TOGGLE
        }

        fn is_active(&self) -> bool {
            self.states.lock().unwrap().last().copied().unwrap_or(false)
        }

        fn update_state(&self, active: bool) {
            self.states.lock().unwrap().push(active);
        }

        fn disable(&self) {
            *self.disables.lock().unwrap() += 1;
        }

        fn set_switch_text(&self, text: &str) {
            self.texts.lock().unwrap().push(text.into());
        }
    }

    #[derive(Default)]
    struct MockDisplay {
        lines: Mutex<Vec<String>>,
        transients: Mutex<Vec<String>>,
        clears: Mutex<u32>,
    }

    impl MainDisplay for MockDisplay {
        fn text_out(&self, text: &str) {
            self.lines.lock().unwrap().push(text.into());
        }

        fn transient_text_out(&self, text: &str) {
            self.transients.lock().unwrap().push(text.into());
        }

        fn clear(&self) {
            *self.clears.lock().unwrap() += 1;
        }
    }

    fn setup() -> (Axe2Manager, broadcast::Receiver<AppEvent>) {
        let (tx, rx) = broadcast::channel(256);
        let manager = Axe2Manager::new(tx, 0);
        (manager, rx)
    }

    fn midi_out(rx: &mut broadcast::Receiver<AppEvent>) -> Vec<Vec<u8>> {
        let mut out = vec![];
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::MidiOut(bytes) = event {
                out.push(bytes.to_vec());
            }
        }
        out
    }

    fn events(rx: &mut broadcast::Receiver<AppEvent>) -> Vec<AppEvent> {
        let mut out = vec![];
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    fn connect(manager: &mut Axe2Manager) {
        let bytes = Axe2Message::FirmwareVersion { major: 18, minor: 13 }.to_bytes();
        assert!(manager.receive_sysex(&bytes));
    }

    fn feed(manager: &mut Axe2Manager, msg: Axe2Message) {
        assert!(manager.receive_sysex(&msg.to_bytes()));
    }

    #[tokio::test(start_paused = true)]
    async fn detection_requests_name_and_effects() {
        let (mut manager, mut rx) = setup();
        manager.handle_app_event(&AppEvent::Sync(SyncRequest::Poll));
        assert_eq!(midi_out(&mut rx),
                   vec![Axe2Message::FirmwareVersionRequest.to_bytes()]);

        connect(&mut manager);
        let out = midi_out(&mut rx);
        assert!(out.contains(&Axe2Message::PresetNameRequest.to_bytes()));
        assert!(out.contains(&Axe2Message::PresetEffectsRequest.to_bytes()));
        assert_eq!(manager.pending_preset_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn truncated_name_still_requests_effects() {
        let (mut manager, mut rx) = setup();
        connect(&mut manager);
        midi_out(&mut rx);

        // a short frame straight off the wire
        let mut short = vec![];
        short.extend_from_slice(&HEADER);
        short.push(msg::PRESET_NAME);
        short.extend_from_slice(b"Solo Boo");
        short.push(axe_core::midi::checksum(&short));
        short.push(0xf7);
        assert!(manager.receive_sysex(&short));

        let out = midi_out(&mut rx);
        assert_eq!(out, vec![Axe2Message::PresetEffectsRequest.to_bytes()]);
        // the truncated name is never stored, a re-query is scheduled
        assert!(manager.current_preset_name.is_empty());
        assert!(manager.name_sync.is_scheduled());
    }

    #[tokio::test(start_paused = true)]
    async fn complete_name_updates_state_and_display() {
        let (mut manager, mut rx) = setup();
        let display = Arc::new(MockDisplay::default());
        manager.set_main_display(display.clone());
        connect(&mut manager);
        events(&mut rx);

        feed(&mut manager, Axe2Message::PresetName { name: "Solo Boost".into(), complete: true });
        assert_eq!(manager.current_preset_name, "Solo Boost");
        let changed = events(&mut rx).into_iter().any(|e| matches!(e,
            AppEvent::PresetChange(p) if p.name == "Solo Boost"));
        assert!(changed);
        assert!(display.lines.lock().unwrap().last().unwrap().contains("Solo Boost"));
    }

    #[tokio::test(start_paused = true)]
    async fn preset_effects_drive_patches_and_xy() {
        let (mut manager, mut rx) = setup();
        let amp = MockPatch::new("Amp 1");
        let amp_x = MockPatch::new("Amp 1 X");
        let amp_y = MockPatch::new("Amp 1 Y");
        let delay = MockPatch::new("Looper 1");
        manager.set_sync_patch(amp.clone(), None, None);
        manager.set_sync_patch(amp_x.clone(), Some(106), Some(0));
        manager.set_sync_patch(amp_y.clone(), Some(106), Some(1));
        manager.set_sync_patch(delay.clone(), None, None);
        connect(&mut manager);
        midi_out(&mut rx);

        // amp engaged on Y; delay 1 not in the preset
        feed(&mut manager, Axe2Message::PresetEffects { blocks: vec![
            EffectState { id: 106, bypassed: false, y_active: true },
        ]});

        assert_eq!(amp.states(), vec![true]);
        assert_eq!(amp_x.states(), vec![false]);
        assert_eq!(amp_y.states(), vec![true]);
        assert_eq!(delay.disables(), 1);
        assert!(delay.states().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn xy_patches_resolve_through_legacy_names() {
        let (mut manager, _rx) = setup();
        let patch = MockPatch::new("Looper 1 X");
        // "looper 1 x" does not normalize to a block; bind by explicit id
        manager.set_sync_patch(patch.clone(), Some(112), Some(0));
        let delay = manager.registry.lookup_by_id(112).unwrap();
        assert!(delay.channel_select_patches[0].is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn device_preset_switch_schedules_syncs() {
        let (mut manager, mut rx) = setup();
        connect(&mut manager);
        midi_out(&mut rx);

        feed(&mut manager, Axe2Message::PresetChange { preset: 42 });
        assert_eq!(manager.current_preset, 42);
        assert!(manager.name_sync.is_scheduled());
        assert!(manager.effects_sync.is_scheduled());
        // nothing leaves until the debounce window closes
        assert!(midi_out(&mut rx).is_empty());

        // let the timer tasks arm their sleeps before advancing the clock
        tokio::task::yield_now().await;
        tokio::time::advance(NAME_SYNC_DELAY + Duration::from_millis(50)).await;
        tokio::task::yield_now().await;
        for event in events(&mut rx) {
            manager.handle_app_event(&event);
        }
        let out = midi_out(&mut rx);
        assert!(out.contains(&Axe2Message::PresetNameRequest.to_bytes()));
        assert!(out.contains(&Axe2Message::PresetEffectsRequest.to_bytes()));
    }

    #[tokio::test(start_paused = true)]
    async fn user_scene_switch_rides_on_cc() {
        let (mut manager, mut rx) = setup();
        let scene2 = MockPatch::new("Scene 2");
        manager.set_scene_patch(2, scene2.clone());
        assert_eq!(scene2.texts(), vec!["Scene 2"]);
        connect(&mut manager);
        midi_out(&mut rx);

        manager.update_scene_status(0, true);
        manager.increment_scene();
        let out = midi_out(&mut rx);
        assert_eq!(out, vec![
            vec![0xb0, cc::SCENE_SELECT, 0],
            vec![0xb0, cc::SCENE_SELECT, 1],
        ]);
        assert_eq!(scene2.states(), vec![false, true]);

        // wraps around
        manager.current_scene = 7;
        manager.increment_scene();
        assert_eq!(manager.current_scene, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pushed_looper_state_applies_directly() {
        let (mut manager, mut rx) = setup();
        let record = MockPatch::new("Looper Record");
        let reverse = MockPatch::new("Looper Reverse");
        manager.set_looper_patch(record.clone());
        manager.set_looper_patch(reverse.clone());
        let display = Arc::new(MockDisplay::default());
        manager.set_main_display(display.clone());
        connect(&mut manager);
        events(&mut rx);

        feed(&mut manager, Axe2Message::LooperState {
            flags: LooperFlags::RECORD | LooperFlags::OVERDUB
        });
        assert_eq!(record.states(), vec![true]);
        assert!(reverse.states().is_empty());
        assert_eq!(display.transients.lock().unwrap().last().unwrap(),
                   "recording, overdub");
    }

    #[tokio::test(start_paused = true)]
    async fn preset_navigation_sends_bank_and_program() {
        let (mut manager, mut rx) = setup();
        connect(&mut manager);
        manager.current_preset = 383;
        midi_out(&mut rx);

        manager.increment_preset();
        let out = midi_out(&mut rx);
        assert_eq!(out, vec![vec![0xb0, 0x00, 0x03], vec![0xc0, 0x00]]);

        // wraps below zero to the last preset
        manager.current_preset = 0;
        manager.decrement_preset();
        let out = midi_out(&mut rx);
        // 999 = bank 7, program 103
        assert_eq!(out, vec![vec![0xb0, 0x00, 0x07], vec![0xc0, 0x67]]);
    }

    #[tokio::test(start_paused = true)]
    async fn ultra_manager_speaks_with_its_own_model_byte() {
        let (tx, mut rx) = broadcast::channel(256);
        let mut manager = Axe2Manager::new_with_model(tx, 0, AxeModel::Ultra);

        let probe = Axe2Message::FirmwareVersion { major: 11, minor: 3 }.to_bytes_for(0x01);
        assert!(manager.receive_sysex(&probe));
        assert_eq!(manager.model(), AxeModel::Ultra);

        let out = midi_out(&mut rx);
        assert!(!out.is_empty());
        for bytes in out {
            assert_eq!(bytes[4], 0x01);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_clears_bindings_and_is_idempotent() {
        let (mut manager, mut rx) = setup();
        let amp = MockPatch::new("Amp 1");
        manager.set_sync_patch(amp.clone(), None, None);
        connect(&mut manager);
        midi_out(&mut rx);

        manager.shutdown();
        manager.shutdown();

        assert!(manager.firmware.is_none());
        assert!(manager.registry.lookup_by_id(106).unwrap().patches.is_empty());

        tokio::time::advance(POLL_PERIOD * 3).await;
        tokio::task::yield_now().await;
        let polls = events(&mut rx).into_iter().filter(|e| matches!(e,
            AppEvent::Sync(SyncRequest::Poll))).count();
        assert_eq!(polls, 0);
    }
}
