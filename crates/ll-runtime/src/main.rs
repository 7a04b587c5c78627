//! # Liquidity Layer Runtime
//!
//! Deploys the liquidity layer onto simulated chains and moves one transfer
//! per vendor between the first two chains.
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG`, default `info`)
//! 2. Load the deployment file (`LL_CONFIG`, else the bundled config)
//! 3. Deploy the core messaging layer, the vendors and the liquidity layer
//! 4. For each vendor: dispatch, relay before settlement, settle, relay again
//!
//! The second relay pass is the one that delivers: the first finds the
//! funds unsettled and defers the message.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use ll_01_bridge_adapters::BridgeAdapterType;
use ll_02_router::{LiquidityLayerRouterApi, TestLiquidityLayerMessageRecipient, TransferRequest};
use ll_03_deployer::{
    CoreDeployment, LiquidityLayerApp, LiquidityLayerDeployer, LiquidityLayerDeploymentFile,
    VendorRegistry,
};
use shared_transport::EventFilter;
use shared_types::{short_hex, H256, U256};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const BUNDLED_CONFIG: &str = include_str!("../config/liquidity-layer.toml");

/// Amount moved per vendor.
const DEMO_AMOUNT: u64 = 1000;

/// Load the deployment file from `LL_CONFIG` or the bundled default.
fn load_config() -> Result<LiquidityLayerDeploymentFile> {
    match std::env::var("LL_CONFIG") {
        Ok(path) => {
            info!(%path, "Loading deployment from LL_CONFIG");
            LiquidityLayerDeploymentFile::load(&path)
                .with_context(|| format!("Failed to load deployment file {path}"))
        }
        Err(_) => LiquidityLayerDeploymentFile::parse(BUNDLED_CONFIG)
            .context("Bundled deployment file is invalid"),
    }
}

/// Move `DEMO_AMOUNT` from `origin` to `destination` over `adapter_type`.
async fn run_transfer(
    core: &CoreDeployment,
    vendors: &VendorRegistry,
    app: &LiquidityLayerApp,
    origin: &str,
    destination: &str,
    adapter_type: BridgeAdapterType,
) -> Result<()> {
    let router = app.router(origin).context("origin router missing")?;
    let remote = app.router(destination).context("destination router missing")?;
    let adapter = app
        .adapter(origin, adapter_type)
        .context("origin adapter missing")?;
    let vendor = vendors
        .vendor(adapter_type)
        .context("vendor bridge missing")?;
    let origin_ledger = core.ledger(origin).context("origin ledger missing")?;
    let destination_ledger = core
        .ledger(destination)
        .context("destination ledger missing")?;

    let token = adapter.core().token();
    let sender = H256::from_low_u64_be(0x5E);
    let recipient = H256::from_low_u64_be(0xBEEF_0000 + adapter_type.tag() as u64);
    let amount = U256::from(DEMO_AMOUNT);
    let body = format!("hello over {adapter_type}").into_bytes();

    let hook = Arc::new(TestLiquidityLayerMessageRecipient::new());
    remote.register_recipient(recipient, hook.clone());

    origin_ledger.mint(token, sender, amount)?;
    origin_ledger.approve(token, sender, router.address(), amount);

    let destination_domain = app
        .domain(destination)
        .context("destination domain missing")?;
    let id = router
        .dispatch_with_tokens(
            sender,
            TransferRequest {
                destination: destination_domain,
                recipient,
                body: body.clone(),
                token,
                amount,
                adapter_type,
            },
        )
        .await
        .map_err(|e| anyhow!("dispatch failed: {e}"))?;
    info!(
        id = %short_hex(&id),
        adapter = %adapter_type,
        body = %hex::encode(&body),
        "Transfer dispatched"
    );

    let early = core.process_messages().await;
    info!(deferred = early.deferred.len(), "Relayed before settlement");

    for result in vendor.settle_all() {
        if let Err(e) = result {
            warn!(error = %e, "Vendor settlement refused");
        }
    }

    let late = core.process_messages().await;
    info!(delivered = late.delivered.len(), "Relayed after settlement");

    let credited = destination_ledger.balance_of(token, recipient);
    if credited != amount || hook.count() != 1 {
        bail!("{adapter_type} transfer incomplete: recipient holds {credited}");
    }
    info!(
        adapter = %adapter_type,
        from = origin,
        to = destination,
        %credited,
        "Transfer complete"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("===========================================");
    info!("  Liquidity Layer Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let file = load_config()?;
    let configs = file.configs();

    let core = CoreDeployment::new(&file.domains()).context("Core deployment failed")?;
    let vendors = VendorRegistry::simulate(&core, &configs).context("Vendor setup failed")?;
    let app = LiquidityLayerDeployer::new(configs, &core, &vendors)
        .deploy()
        .context("Liquidity layer deployment failed")?;

    let mut events = core.network().subscribe(EventFilter::all());

    let chains = app.chains();
    let [origin, destination, ..] = chains.as_slice() else {
        bail!("Deployment needs at least two chains, found {}", chains.len());
    };

    let adapter_types = app
        .router(origin)
        .map(|r| r.adapter_types())
        .unwrap_or_default();
    for adapter_type in adapter_types {
        if app.adapter(destination, adapter_type).is_none() {
            warn!(adapter = %adapter_type, %destination, "No peer adapter, skipping");
            continue;
        }
        run_transfer(&core, &vendors, &app, origin, destination, adapter_type).await?;
    }

    for event in events.drain() {
        info!(?event, "Transport event");
    }
    info!("Done");
    Ok(())
}
