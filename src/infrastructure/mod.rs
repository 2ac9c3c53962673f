pub mod audio;
pub mod config;
pub mod local;
pub mod network;
