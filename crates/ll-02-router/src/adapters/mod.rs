//! Adapters for the router's outbound ports.

mod test_recipient;

pub use test_recipient::{ReceivedTransfer, TestLiquidityLayerMessageRecipient};
