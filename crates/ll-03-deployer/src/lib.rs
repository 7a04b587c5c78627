//! # LL-03: Liquidity Layer Deployer
//!
//! Builds a liquidity layer on top of an existing messaging deployment.
//!
//! ## Deployment Steps
//!
//! 1. Validate every chain's adapter configs against the core deployment and
//!    the vendor registry
//! 2. Create one `LiquidityLayerRouter` and its bridge adapters per chain,
//!    sharing that chain's mailbox and token ledger
//! 3. Register each router as a mailbox recipient and each adapter as a
//!    vendor settlement receiver
//! 4. Enroll every router, and every adapter of the same vendor, with its
//!    peers on the other chains
//!
//! Contract addresses are derived from `(domain, owner, contract name)`, so
//! the same config always yields the same deployment.
//!
//! ## Usage
//!
//! ```ignore
//! let file = LiquidityLayerDeploymentFile::load("liquidity-layer.toml")?;
//! let core = CoreDeployment::new(&file.domains())?;
//! let vendors = VendorRegistry::simulate(&core, &file.configs())?;
//! let app = LiquidityLayerDeployer::new(file.configs(), &core, &vendors).deploy()?;
//! ```

#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod core_deployment;
pub mod deployer;
pub mod errors;
pub mod vendors;

pub use app::{LiquidityLayerApp, LiquidityLayerContracts};
pub use config::{ChainDeployment, LiquidityLayerConfig, LiquidityLayerDeploymentFile};
pub use core_deployment::{CoreChain, CoreDeployment};
pub use deployer::{adapter_contract, LiquidityLayerDeployer, ROUTER_CONTRACT};
pub use errors::{ConfigError, DeployError};
pub use vendors::VendorRegistry;
