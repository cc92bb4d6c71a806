use bytes::Bytes;
use log::warn;
use tokio::sync::broadcast;

/// A debounced/polled query request, delivered back to the manager
/// through the event bus when the owning timer fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncRequest {
    PresetName { force: bool },
    Effects,
    Looper,
    Poll,
}

#[derive(Clone, Debug)]
pub struct PresetChangeEvent {
    pub preset: u16,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct SceneChangeEvent {
    pub scene: u8,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct LooperChangeEvent {
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct DeviceDetectedEvent {
    pub name: String,
    pub version: String,
}

// -------------------------------------------------------------

#[derive(Clone, Debug)]
pub enum AppEvent {
    MidiIn(Bytes),
    MidiOut(Bytes),

    Sync(SyncRequest),

    PresetChange(PresetChangeEvent),
    SceneChange(SceneChangeEvent),
    LooperChange(LooperChangeEvent),

    DeviceDetected(DeviceDetectedEvent),
    Shutdown,
}

pub type EventSender = broadcast::Sender<AppEvent>;

pub trait EventSenderExt {
    fn send_or_warn(&self, msg: AppEvent);
}

impl EventSenderExt for EventSender {
    fn send_or_warn(&self, msg: AppEvent) {
        self.send(msg).unwrap_or_else(|err| {
            warn!("Message cannot be sent: {:?}", err.0);
            0
        });
    }
}
