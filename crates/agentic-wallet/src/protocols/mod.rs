//! Protocol messages and records built on the storage and signature layers.

pub mod connections;
