extern crate midir;

#[macro_use]
extern crate anyhow;

pub mod midi;
pub mod names;

pub mod event;
pub mod timer;
pub mod patch;
pub mod device;
pub mod midi_io;
