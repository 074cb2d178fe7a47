// src/core/mod.rs

//! Process-independent building blocks: argument encoding, config paths and loading.

pub mod arguments;
pub mod config_loader;
pub mod paths;
