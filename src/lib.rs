pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pages;
pub mod pipeline;
pub mod render;
pub mod trace;
pub mod tui;

pub use error::{Error, Result};
