//! Application layer orchestrating the card network adapters.
//!
//! `ClickToPaySession` drives the shopper flow over a set of `SrcInitiator`s
//! built by the `InitiatorRegistry`; each adapter is a `SchemeInitiator`
//! configured by a `SchemeDescriptor`.

pub mod click_to_pay;
pub mod initiator;
pub mod registry;
pub mod schemes;
pub mod script;
