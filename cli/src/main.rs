pub mod opts;

use std::sync::Arc;
use anyhow::{bail, Context, Result};
use bytes::Bytes;
use log::*;
use tokio::sync::broadcast;

use axe_core::device::{AxeDevice, AxeModel, BoxedAxeDevice};
use axe_core::event::{AppEvent, EventSenderExt, SyncRequest};
use axe_core::midi_io::*;
use axe_core::patch::MainDisplay;
use axe_mod_axe2::midi::Axe2Message;
use axe_mod_axe2::Axe2Manager;
use axe_mod_axe3::midi::AxeMessage;
use axe_mod_axe3::Axe3Manager;

use opts::*;

/// The console stands in for a controller's LCD: status lines go to the
/// log, nothing persists, so clear is a no-op.
struct ConsoleDisplay;

impl MainDisplay for ConsoleDisplay {
    fn text_out(&self, text: &str) {
        info!("[display] {}", text);
    }

    fn transient_text_out(&self, text: &str) {
        info!("[display] {}", text);
    }

    fn clear(&self) {}
}

fn open_in(addr: Option<&str>) -> Result<BoxedMidiIn> {
    let port = match addr {
        None => MidiInPort::new(None)?,
        Some(addr) => MidiInPort::new_for_address(addr)
            .or_else(|_| MidiInPort::new_for_name(addr))?,
    };
    Ok(box_midi_in(port))
}

fn open_out(addr: Option<&str>) -> Result<BoxedMidiOut> {
    let port = match addr {
        None => MidiOutPort::new(None)?,
        Some(addr) => MidiOutPort::new_for_address(addr)
            .or_else(|_| MidiOutPort::new_for_name(addr))?,
    };
    Ok(box_midi_out(port))
}

#[tokio::main]
async fn main() -> Result<()> {
    simple_logger::init()?;
    let opts: Opts = Opts::parse();

    if opts.list {
        for name in MidiInPort::ports()? {
            println!("in:  {}", name);
        }
        for name in MidiOutPort::ports()? {
            println!("out: {}", name);
        }
        return Ok(());
    }

    if !(1..=16).contains(&opts.channel) {
        bail!("MIDI channel must be 1..=16");
    }
    let channel = opts.channel - 1;

    let mut midi_in = open_in(opts.input.as_deref())
        .context("Failed to open MIDI input")?;
    let mut midi_out = open_out(opts.output.as_deref())
        .context("Failed to open MIDI output")?;
    info!("MIDI in: {}", midi_in.name());

    let (tx, mut rx) = broadcast::channel::<AppEvent>(512);

    let mut device: BoxedAxeDevice = match opts.model.to_lowercase().as_str() {
        "std" | "standard" =>
            Box::new(Axe2Manager::new_with_model(tx.clone(), channel, AxeModel::Standard)),
        "ultra" =>
            Box::new(Axe2Manager::new_with_model(tx.clone(), channel, AxeModel::Ultra)),
        "ii" | "2" => Box::new(Axe2Manager::new(tx.clone(), channel)),
        "iii" | "3" => Box::new(Axe3Manager::new(tx.clone(), channel)),
        other => bail!("Unknown device model {:?}", other),
    };
    device.set_main_display(Arc::new(ConsoleDisplay));

    // ask for the firmware version once before settling into the event
    // loop; a silent device is still watched for through the poll timer
    info!("Probing for a {}", device.model().display_name());
    let request = match device.model() {
        AxeModel::Three => AxeMessage::FirmwareVersionRequest.to_bytes(),
        legacy => Axe2Message::FirmwareVersionRequest.to_bytes_for(legacy.sysex_model_byte()),
    };
    let header = request[..5].to_vec();
    let reply = probe(&mut midi_in, &mut midi_out, &request,
        |bytes| bytes.starts_with(&header).then(|| bytes.to_vec())).await?;
    match reply {
        Some(bytes) => { device.receive_sysex(&bytes); }
        None => {
            warn!("No answer from the device, watching for it");
            device.force_refresh();
        }
    }

    let midi_out = SharedMidiOut::new(midi_out);

    let tx_in = tx.clone();
    tokio::spawn(async move {
        while let Some(bytes) = midi_in.recv().await {
            tx_in.send_or_warn(AppEvent::MidiIn(Bytes::from(bytes)));
        }
        debug!("midi in closed");
    });

    let tx_sig = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tx_sig.send_or_warn(AppEvent::Shutdown);
        }
    });

    // console commands: "r" re-queries the device, "q" quits
    let tx_con = tx.clone();
    std::thread::spawn(move || {
        use std::io::BufRead;
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "r" | "refresh" => {
                    tx_con.send_or_warn(AppEvent::Sync(SyncRequest::PresetName { force: true }));
                    tx_con.send_or_warn(AppEvent::Sync(SyncRequest::Effects));
                    tx_con.send_or_warn(AppEvent::Sync(SyncRequest::Looper));
                }
                "q" | "quit" => {
                    tx_con.send_or_warn(AppEvent::Shutdown);
                    break;
                }
                "" => {}
                other => warn!("unknown command {:?}", other),
            }
        }
    });

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("event bus lagged, {} events dropped", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        match &event {
            AppEvent::MidiOut(bytes) => {
                if let Err(err) = midi_out.send(bytes) {
                    error!("MIDI send failed: {}", err);
                }
            }
            AppEvent::DeviceDetected(d) =>
                info!("Detected {} (firmware {})", d.name, d.version),
            AppEvent::Shutdown => {
                device.handle_app_event(&event);
                break;
            }
            _ => device.handle_app_event(&event),
        }
    }

    midi_out.close();
    info!("Bye");
    Ok(())
}
