use anyhow::Context;
use tracing_subscriber::EnvFilter;

use traffic_predictor::{
    api::{self, AppState},
    config::Config,
    schema, ArtifactCache, Predictor, TrafficQuery,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traffic_predictor=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env();

    let cache = ArtifactCache::new(cfg.artifacts.clone());
    let artifacts = cache
        .get()
        .context("failed to load artifacts; refusing to start")?;
    let predictor = Predictor::new(artifacts);

    tracing::info!(
        "loaded artifacts; schema v{} feat_list[{}]: {:?}",
        schema::SCHEMA_VERSION,
        schema::FEATURE_COUNT,
        schema::FEATURE_SCHEMA
    );
    tracing::info!(
        "model {:?}; {} known locations",
        predictor.artifacts().model().describe(),
        predictor.locations().len()
    );

    // Warmup: one full pass so a broken model fails here, not on first request
    if let Some(first) = predictor.locations().first() {
        let out = predictor
            .predict(&TrafficQuery::new(18, first.clone(), false, false))
            .context("warmup prediction failed")?;
        tracing::info!("warmup ok: {}", out.summary);
    }

    let state = AppState {
        predictor,
        log_features: cfg.log_features,
    };
    let app = api::router(state);

    let addr = cfg.addr();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
