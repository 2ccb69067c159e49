use std::{net::SocketAddr, sync::Arc, time::Duration};

use crate::application::http::analysis::router::analysis_routes;
use crate::application::http::health::health_routes;
use crate::application::http::history::router::history_routes;
use crate::application::http::server::app_state::AppState;
use crate::application::http::server::openapi::ApiDoc;
use crate::application::http::server::persistence_monitor::track_persistence_failures;
use crate::args::{ServeArgs, ServerArgs};

use anyhow::Context;
use axum::Router;
use axum::http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use axum_server::{Handle, tls_rustls::RustlsConfig};
use nutritot_core::{application::create_service, domain::common::NutritotConfig};
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, error, info, info_span, warn};
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Builds the state and returns the persistence worker alongside it.
pub async fn state(
    args: Arc<ServerArgs>,
    config: NutritotConfig,
) -> Result<(AppState, JoinHandle<()>), anyhow::Error> {
    let (service, worker) = create_service(config).await?;
    tokio::spawn(track_persistence_failures(
        service.outbox().subscribe_failures(),
    ));

    Ok((AppState::new(args, service), worker))
}

/// `*` anywhere in the list allows every origin.
fn allow_origin(origins: &[String]) -> Result<AllowOrigin, anyhow::Error> {
    if origins.iter().any(|origin| origin.trim() == "*") {
        return Ok(AllowOrigin::any());
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .with_context(|| format!("invalid allowed origin: {origin}"))
        })
        .collect::<Result<Vec<HeaderValue>, _>>()?;

    Ok(AllowOrigin::list(origins))
}

///  Returns the [`Router`] of this application.
pub fn router(state: AppState) -> Result<Router, anyhow::Error> {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri: String = request.uri().to_string();
            info_span!("http_request", method = ?request.method(), uri)
        },
    );

    debug!("Allowed origins: {:?}", state.args.allowed_origins);
    let allowed_origins = allow_origin(&state.args.allowed_origins)?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allowed_origins)
        .allow_headers([CONTENT_TYPE, CONTENT_LENGTH, ACCEPT]);

    let mut openapi = ApiDoc::build();
    let mut paths = openapi.paths.clone();
    paths.paths = openapi
        .paths
        .paths
        .into_iter()
        .map(|(path, item)| (format!("{}{path}", state.args.root_path), item))
        .collect();
    openapi.paths = paths;

    let root_path = state.args.root_path.clone();
    let api_docs_url = format!("{}/api-docs/openapi.json", root_path);

    let mut router = axum::Router::new()
        .merge(Scalar::with_url(
            format!("{}/scalar", root_path),
            openapi.clone(),
        ))
        .merge(
            SwaggerUi::new(format!("{}/swagger-ui", root_path))
                .url(api_docs_url.clone(), openapi.clone()),
        )
        .merge(Redoc::with_url(format!("{}/redoc", root_path), openapi))
        .merge(RapiDoc::new(api_docs_url).path(format!("{}/rapidoc", root_path)))
        .merge(analysis_routes(state.clone()))
        .merge(history_routes(state.clone()))
        .merge(health_routes(state.clone()));

    // the recorder is process-global, so it is installed at most once
    if state.args.metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route(
                &format!("{}/metrics", root_path),
                get(|| async move { metric_handle.render() }),
            )
            .layer(prometheus_layer);
    }

    Ok(router.layer(trace_layer).layer(cors).with_state(state))
}

/// Runs the server until Ctrl-C, then waits for queued history writes.
pub async fn serve(args: ServeArgs) -> Result<(), anyhow::Error> {
    let server_args = Arc::new(args.server.clone());
    let (state, worker) = state(Arc::clone(&server_args), NutritotConfig::from(args)).await?;
    let app = router(state)?;

    let addr: SocketAddr = format!("{}:{}", server_args.host, server_args.port)
        .parse()
        .context("invalid server address")?;

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    match (&server_args.tls_cert, &server_args.tls_key) {
        (Some(cert), Some(key)) => {
            // another crate may already have picked a provider
            let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
            let tls = RustlsConfig::from_pem_file(cert, key)
                .await
                .context("failed to load TLS certificate")?;

            info!(%addr, "NutriTot listening over TLS");
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        _ => {
            info!(%addr, "NutriTot listening");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    match tokio::time::timeout(SHUTDOWN_GRACE, worker).await {
        Ok(Ok(())) => info!("Pending history writes flushed"),
        Ok(Err(e)) => error!(error = %e, "Persistence worker crashed"),
        Err(_) => warn!("Timed out waiting for pending history writes"),
    }

    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }

    info!("Shutting down");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
