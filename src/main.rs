use alloy_provider::ProviderBuilder;
use curve_adapter::{
    Adapter, CallContext, DeploymentConfig, ForkChain, db::EventStore,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "CURVE_ADAPTER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "curve-adapter.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = DeploymentConfig::from_file(&config_path)?;
    tracing::info!(
        path = %config_path,
        adapter = config.adapter.flavor.name(),
        rpc = %config.rpc_url,
        "Starting curve adapter"
    );

    let provider = ProviderBuilder::new().connect_http(config.rpc_url.clone());
    let chain = Arc::new(ForkChain::new(Arc::new(provider)));

    let mut adapter = Adapter::new(config.adapter.clone(), chain);
    if let Some(db_url) = &config.database_url {
        let store = EventStore::new(db_url, config.adapter.flavor.name()).await?;
        adapter = adapter.with_event_sink(Arc::new(store));
        tracing::info!(%db_url, "Persisting events");
    }

    let owner = CallContext::new(adapter.owner());
    for entry in &config.pools {
        match adapter
            .register_pool(owner, entry.address, entry.zapper)
            .await
        {
            Ok(info) => tracing::info!(
                pool = ?info.contract,
                n_coins = info.n_coins,
                lp_token = ?info.lp_token,
                gauge = ?info.gauge,
                "Pool ready"
            ),
            Err(e) => tracing::warn!(pool = ?entry.address, "Failed to register pool: {}", e),
        }
    }

    tracing::info!(
        pools = adapter.get_pools_count(),
        events = adapter.events().len(),
        "Registration complete"
    );
    Ok(())
}
