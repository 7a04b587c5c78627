//! # LL-02: Liquidity Layer Router
//!
//! Sends a message and a token amount to a recipient on another chain as one
//! logical transfer. The message travels over the interchain transport; the
//! tokens travel over a bridge adapter. The destination router releases the
//! tokens only after both have arrived.
//!
//! ## Architecture
//!
//! - **Domain**: `TransferRequest`, the `LiquidityLayerMessage` envelope, errors
//! - **Ports**: Inbound (`LiquidityLayerRouterApi`) and Outbound (`LiquidityLayerRecipient`)
//! - **Application**: `LiquidityLayerRouter` orchestration
//! - **IPC**: transport delivery handler and error mapping
//! - **Adapters**: `TestLiquidityLayerMessageRecipient`
//!
//! ## Delivery Outcomes
//!
//! | Situation | Result | Transport action |
//! |-----------|--------|------------------|
//! | Funds settled, hook succeeds | recipient credited | delivered |
//! | Funds not yet settled | `NotSettled` | re-presented later, parked once the budget is spent |
//! | Sender not enrolled, bad envelope | protocol error | dead-lettered |
//! | Hook fails after release | funds taken back and escrowed | dead-lettered |

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use adapters::{ReceivedTransfer, TestLiquidityLayerMessageRecipient};
pub use application::service::LiquidityLayerRouter;
pub use config::RouterConfig;
pub use domain::entities::*;
pub use domain::envelope::{LiquidityLayerMessage, ENVELOPE_VERSION};
pub use domain::errors::{RecipientError, RouterError};
pub use ports::inbound::LiquidityLayerRouterApi;
pub use ports::outbound::LiquidityLayerRecipient;
