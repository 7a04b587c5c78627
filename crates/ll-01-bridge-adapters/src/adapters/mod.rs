//! # Adapters Layer (Hexagonal Architecture)
//!
//! Vendor adapters implementing the inbound API, plus the in-memory vendor
//! bridge behind the outbound port.

mod adapter_core;
mod bridge_adapter;
mod circle;
mod mock_vendor;
mod portal;

pub use adapter_core::{AdapterCore, AdapterParams};
pub use bridge_adapter::BridgeAdapter;
pub use circle::CircleBridgeAdapter;
pub use mock_vendor::InMemoryVendorBridge;
pub use portal::PortalBridgeAdapter;
