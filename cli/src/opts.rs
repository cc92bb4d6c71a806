pub use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Axe-Fx preset and effect state monitor")]
pub struct Opts {
    /// MIDI input port: index, "client:port" address or full port name
    #[arg(short, long)]
    pub input: Option<String>,

    /// MIDI output port: index, "client:port" address or full port name
    #[arg(short, long)]
    pub output: Option<String>,

    /// Device model: "std", "ultra", "ii" or "iii"
    #[arg(short, long, default_value = "iii")]
    pub model: String,

    /// MIDI channel the device listens on (1..=16)
    #[arg(short, long, default_value_t = 1)]
    pub channel: u8,

    /// List available MIDI ports and exit
    #[arg(short, long)]
    pub list: bool,
}
