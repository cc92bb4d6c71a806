use midir::*;
use anyhow::*;
use regex::Regex;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::sleep;
use log::*;

#[async_trait]
pub trait MidiIn {
    fn name(&self) -> String;
    async fn recv(&mut self) -> Option<Vec<u8>>;
    fn close(&mut self);
}

pub trait MidiOut {
    fn name(&self) -> String;
    fn send(&mut self, bytes: &[u8]) -> Result<()>;
    fn close(&mut self);
}

pub type BoxedMidiIn = Box<dyn MidiIn + Send>;
pub type BoxedMidiOut = Box<dyn MidiOut + Send>;

pub fn box_midi_in<T: MidiIn + Send + 'static>(x: T) -> BoxedMidiIn {
    Box::new(x)
}

pub fn box_midi_out<T: MidiOut + Send + 'static>(x: T) -> BoxedMidiOut {
    Box::new(x)
}

/// A MIDI out transport shared between the device manager, the navigation
/// engine and direct-mode commands. The mutex spans a single send only;
/// no caller may assume exclusive ownership across calls.
#[derive(Clone)]
pub struct SharedMidiOut {
    inner: Arc<Mutex<BoxedMidiOut>>,
}

impl SharedMidiOut {
    pub fn new(out: BoxedMidiOut) -> Self {
        SharedMidiOut { inner: Arc::new(Mutex::new(out)) }
    }

    pub fn send(&self, bytes: &[u8]) -> Result<()> {
        let mut out = self.inner.lock().unwrap();
        out.send(bytes)
    }

    pub fn close(&self) {
        self.inner.lock().unwrap().close();
    }
}

pub struct MidiInPort {
    name: String,
    conn: Option<MidiInputConnection<()>>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>
}

impl MidiInPort {
    fn _new() -> Result<MidiInput> {
        let mut midi_in = MidiInput::new("axe midi in")?;
        midi_in.ignore(Ignore::None);

        for (i, port) in midi_in.ports().iter().enumerate() {
            debug!("midi in {}: {:?}", i, midi_in.port_name(port)?);
        }

        Ok(midi_in)
    }

    fn _new_for_port(midi_in: MidiInput, port: MidiInputPort) -> Result<Self> {
        let name = midi_in.port_name(&port)
            .map_err(|e| anyhow!("Failed to get MIDI input port name: {}", e))?;

        let (tx, rx) = mpsc::unbounded_channel();

        // The callback runs on the MIDI driver's thread; bytes are
        // marshaled to the single manager task through the channel and
        // the manager is never called from here.
        let n = name.clone();
        let conn = midi_in.connect(&port, "axe midi in conn", move |ts, data, _| {
            trace!("<< {:02x?} len={} ts={}", data, data.len(), ts);
            tx.send(Vec::from(data))
                .unwrap_or_else(|_| {
                    error!("midi input ({}): failed to send data to the application", n);
                });
        }, ())
            .map_err(|e| anyhow!("Midi connection error: {:?}", e))?;

        Ok(MidiInPort { name, conn: Some(conn), rx })
    }
}

#[async_trait]
impl MidiIn for MidiInPort {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    fn close(&mut self) {
        self.conn.take().map(|conn| {
            debug!("closing in");
            conn.close();
            debug!("closed in");
        });
        self.rx.close();
    }
}

impl Drop for MidiInPort {
    fn drop(&mut self) {
        self.close();
    }
}


pub struct MidiOutPort {
    name: String,
    conn: Option<MidiOutputConnection>,
}

impl MidiOutPort {
    fn _new() -> Result<MidiOutput> {
        let midi_out = MidiOutput::new("axe midi out")?;

        for (i, port) in midi_out.ports().iter().enumerate() {
            debug!("midi out {}: {:?}", i, midi_out.port_name(port)?);
        }

        Ok(midi_out)
    }

    fn _new_for_port(midi_out: MidiOutput, port: MidiOutputPort) -> Result<Self> {
        let name = midi_out.port_name(&port)
            .map_err(|e| anyhow!("Failed to get MIDI output port name: {}", e))?;
        let conn = midi_out.connect(&port, "axe midi out conn")
            .map_err(|e| anyhow!("Midi connection error: {:?}", e))?;

        Ok(MidiOutPort { name, conn: Some(conn) })
    }
}

impl MidiOut for MidiOutPort {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        trace!(">> {:02x?} len={}", bytes, bytes.len());
        if let Some(conn) = self.conn.as_mut() {
            conn.send(bytes)
                .map_err(|e| anyhow!("Midi send error: {:?}", e))
        } else {
            Err(anyhow!("Send error: connection already closed"))
        }
    }

    fn close(&mut self) {
        self.conn.take().map(|conn| {
            debug!("closing out");
            conn.close();
            debug!("closed out");
        });
    }
}

impl Drop for MidiOutPort {
    fn drop(&mut self) {
        self.close()
    }
}


pub trait MidiOpen {
    type Class: MidiIO<Port = Self::Port>;
    type Port;
    type Out;
    const DIR: &'static str;

    fn _new() -> Result<Self::Class>;
    fn _new_for_port(class: Self::Class, port: Self::Port) -> Result<Self::Out>;

    fn new(port_idx: Option<usize>) -> Result<Self::Out> {
        let class = Self::_new()?;

        let port_n: usize = port_idx.unwrap_or(0);
        let port = class.ports().into_iter().nth(port_n)
            .with_context(|| format!("MIDI {} port {} not found", Self::DIR, port_n))?;

        Self::_new_for_port(class, port)
    }

    /// Open by an address string: either a plain port index or an
    /// ALSA-style "client:port" suffix of the port name.
    fn new_for_address(port_addr: &str) -> Result<Self::Out> {
        let class = Self::_new()?;

        let port_n_re = Regex::new(r"^\d+$").unwrap();
        let port_id_re = Regex::new(r"\d+:\d+").unwrap();

        if port_n_re.is_match(port_addr) {
            let n = usize::from_str(port_addr)
                .with_context(|| format!("Unrecognized MIDI port index {:?}", port_addr))?;
            return Self::new(Some(n));
        }
        if !port_id_re.is_match(port_addr) {
            bail!("Unrecognized MIDI port address {:?}", port_addr);
        }

        let mut found = None;
        for port in class.ports().into_iter() {
            let name = class.port_name(&port)?;
            if name.ends_with(port_addr) {
                found = Some(port);
            }
        }
        let Some(port) = found else {
            bail!("MIDI {} port for address {:?} not found!", Self::DIR, port_addr);
        };

        Self::_new_for_port(class, port)
    }

    fn new_for_name(port_name: &str) -> Result<Self::Out> {
        let class = Self::_new()?;

        let mut found = None;
        for port in class.ports().into_iter() {
            let name = class.port_name(&port)?;
            if name == port_name {
                found = Some(port);
            }
        }
        let Some(port) = found else {
            bail!("MIDI {} port for name {:?} not found!", Self::DIR, port_name);
        };

        Self::_new_for_port(class, port)
    }
}

impl MidiOpen for MidiInPort {
    type Class = MidiInput;
    type Port = MidiInputPort;
    type Out = MidiInPort;
    const DIR: &'static str = "input";

    fn _new() -> Result<Self::Class> {
        MidiInPort::_new()
    }

    fn _new_for_port(class: Self::Class, port: Self::Port) -> Result<Self::Out> {
        MidiInPort::_new_for_port(class, port)
    }
}

impl MidiOpen for MidiOutPort {
    type Class = MidiOutput;
    type Port = MidiOutputPort;
    type Out = MidiOutPort;
    const DIR: &'static str = "output";

    fn _new() -> Result<Self::Class> {
        MidiOutPort::_new()
    }

    fn _new_for_port(class: Self::Class, port: Self::Port) -> Result<Self::Out> {
        MidiOutPort::_new_for_port(class, port)
    }
}


pub trait MidiPorts {
    fn all_ports() -> Result<Vec<String>>;
    fn ports() -> Result<Vec<String>>;
}

impl MidiPorts for MidiInPort {
    fn all_ports() -> Result<Vec<String>> {
        let midi = MidiInPort::_new()?;
        list_ports(midi)
    }

    fn ports() -> Result<Vec<String>> {
        Self::all_ports()
            .map(|v| v.into_iter()
                .filter(|name| !name.starts_with("axe midi out:"))
                .collect()
            )
    }
}

impl MidiPorts for MidiOutPort {
    fn all_ports() -> Result<Vec<String>> {
        let midi = MidiOutPort::_new()?;
        list_ports(midi)
    }

    fn ports() -> Result<Vec<String>> {
        Self::all_ports()
            .map(|v| v.into_iter()
                .filter(|name| !name.starts_with("axe midi in:"))
                .collect()
            )
    }
}

fn list_ports<T: MidiIO>(midi: T) -> Result<Vec<String>> {
    let port_names: Result<Vec<_>, _> =
        midi.ports().iter()
            .map(|port| midi.port_name(port))
            .collect::<Result<Vec<_>, _>>();
    port_names.map_err(|err| anyhow!("Error getting port names: {}", err))
}

const PROBE_DELAY: Duration = Duration::from_millis(1000);

/// Send a probe request on the out port and wait for a response that the
/// classifier recognizes. Returns None if nothing matching arrived within
/// the probe window.
pub async fn probe<T, F>(in_port: &mut BoxedMidiIn, out_port: &mut BoxedMidiOut,
                         request: &[u8], classify: F) -> Result<Option<T>>
    where F: Fn(&[u8]) -> Option<T>
{
    out_port.send(request)?;

    let delay = sleep(PROBE_DELAY);
    tokio::pin!(delay);
    loop {
        tokio::select! {
            data = in_port.recv() => {
                match data {
                    Some(bytes) => {
                        if let Some(found) = classify(&bytes) {
                            return Ok(Some(found));
                        }
                    }
                    None => return Ok(None)
                }
            }
            _ = &mut delay => return Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeIn {
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
    }

    #[async_trait]
    impl MidiIn for FakeIn {
        fn name(&self) -> String {
            "fake in".into()
        }

        async fn recv(&mut self) -> Option<Vec<u8>> {
            self.rx.recv().await
        }

        fn close(&mut self) {
            self.rx.close();
        }
    }

    struct FakeOut {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    impl MidiOut for FakeOut {
        fn name(&self) -> String {
            "fake out".into()
        }

        fn send(&mut self, bytes: &[u8]) -> Result<()> {
            self.sent.lock().unwrap().push(bytes.to_vec());
            Ok(())
        }

        fn close(&mut self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn probe_skips_noise_and_returns_the_classified_frame() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(vec![0x90, 0x40, 0x7f]).unwrap();
        tx.send(vec![0xf0, 0x10, 0xf7]).unwrap();
        let mut in_port = box_midi_in(FakeIn { rx });

        let sent = Arc::new(Mutex::new(vec![]));
        let mut out_port = box_midi_out(FakeOut { sent: sent.clone() });

        let request = [0xf0u8, 0x08, 0xf7];
        let found = probe(&mut in_port, &mut out_port, &request,
            |bytes| bytes.starts_with(&[0xf0, 0x10]).then(|| bytes.to_vec())).await.unwrap();

        assert_eq!(found, Some(vec![0xf0, 0x10, 0xf7]));
        assert_eq!(sent.lock().unwrap().as_slice(), &[request.to_vec()]);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_times_out_on_silence() {
        let (_tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let mut in_port = box_midi_in(FakeIn { rx });
        let mut out_port = box_midi_out(FakeOut { sent: Arc::new(Mutex::new(vec![])) });

        let found = probe(&mut in_port, &mut out_port, &[0xf0, 0x08, 0xf7],
            |bytes| bytes.first().copied()).await.unwrap();
        assert_eq!(found, None);
    }
}
