//! Command-line management of the methodology document store

pub mod commands;
