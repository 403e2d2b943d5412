use citation_gateway::config::Args;
use citation_gateway::handlers::router;
use citation_gateway::load_balancer::{LoadBalancer, health_checker, with_scheme};
use citation_gateway::rate_limit::idle_sweeper;
use citation_gateway::state::AppState;
use citation_gateway::upstream::Upstream;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "citation_gateway=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // bad limits are fatal, never a per-request error
    let quotas = args.quotas()?;
    let (idle_ttl, sweep_interval) = args.eviction(&quotas)?;
    let load_balancer = Arc::new(LoadBalancer::new(&args.backends)?);

    let client = reqwest::Client::new();
    let upstream = Upstream::new(
        client.clone(),
        with_scheme(&args.search_url),
        Arc::clone(&load_balancer),
    );
    let state = Arc::new(AppState::new(upstream, quotas));

    tokio::spawn(health_checker(
        load_balancer,
        client,
        Duration::from_secs(args.health_interval.max(1)),
    ));
    tokio::spawn(idle_sweeper(Arc::clone(&state.store), idle_ttl, sweep_interval));

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Gateway listening");
    tracing::info!(search_url = %args.search_url, "Forwarding searches");
    for op in citation_gateway::rate_limit::Operation::ALL {
        let quota = quotas.get(op);
        tracing::info!(
            operation = %op,
            max_requests = quota.max_requests(),
            window_secs = quota.window().as_secs(),
            "Rate limit configured"
        );
    }

    // peer address feeds client identification when no X-Forwarded-For is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
