use crate::state::AppState;
use crate::{handlers, webhook};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let api = Router::new()
            .route("/", get(handlers::root))
            .route("/ping", get(handlers::ping))
            .route("/health", get(handlers::health))
            .route("/telegram/sync", post(handlers::sync))
            .route("/telegram/status", get(handlers::status))
            .route(
                "/historical",
                get(handlers::list_historical).delete(handlers::delete_historical),
            )
            .route("/historical/dates", get(handlers::historical_dates))
            .route("/render/:kind", get(handlers::render_report))
            .route("/telegram/setup-webhook", post(handlers::setup_webhook))
            .route("/telegram/delete-webhook", post(handlers::delete_webhook))
            .route("/telegram/send-menu", post(handlers::send_menu))
            .route("/telegram/webhook", post(webhook::telegram_webhook));

        Router::new()
            .nest("/api", api)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("FAS monitor API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
