//! Jerry songbook library - chord progression matching shared by all binaries.

pub mod catalog;
pub mod matcher;
pub mod models;
pub mod progress;
pub mod safety;
pub mod tokenize;
