pub mod capability;
pub mod config;
pub mod names;
pub mod registry;
pub mod midi;
pub mod manager;

pub use manager::Axe2Manager;
