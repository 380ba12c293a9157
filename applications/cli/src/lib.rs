//! Encore command-line surfaces
//!
//! Admin commands (import, list, annotate, remove, clear) are gated by the
//! admin session; public commands (playlist, show) only read.

pub mod commands;
pub mod config;
pub mod error;
