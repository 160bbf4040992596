//! Lessons - English lesson generation service
//!
//! Generates TB Harden style English lessons by grounding a hosted chat
//! completion model in passages retrieved from a local LanceDB document
//! store, and exports lesson text as downloadable PDF files.

pub mod cli;
pub mod config;
pub mod server;
