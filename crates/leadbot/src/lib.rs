//! Leadbot service binary support.
//!
//! Wires the lead store, the Telegram client and the HTTP API together for the
//! `leadbot` binary. Run modes:
//!
//! - `serve` (default): HTTP intake for landing-page leads plus the bot webhook
//! - `poll`: the same bot over long polling, for local development
//! - `encrypt-token`: produce an `IV:TAG:CIPHERTEXT` token for deployment

pub mod cli;
pub mod commands;
