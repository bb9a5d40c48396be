//! Domain layer: SRCi data shapes, flow state and the ports adapters plug into.

pub mod card;
pub mod identity;
pub mod ports;
pub mod srci;
pub mod state;
