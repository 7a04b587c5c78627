//! Ports for the liquidity layer router.

pub mod inbound;
pub mod outbound;
