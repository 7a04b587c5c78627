//! Domain layer for the liquidity layer router.

pub mod entities;
pub mod envelope;
pub mod errors;
