//! Interface adapters for external data formats.

pub mod csv;
