pub mod collector;
pub mod cpu;
pub mod fs;
pub mod platform;
pub mod process;
pub mod procfs;
pub mod registry;
pub mod sample;
pub mod sampler;
pub mod snapshot;
pub mod users;
