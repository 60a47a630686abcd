//! Core type definitions used across the Eat Fast workspace.

pub mod id;

pub use id::*;
