use std::sync::Arc;

use chrono::Utc;
use fas_monitor_core::{
    load_chronological, render, render_templated, AppConfig, ReportContext, ReportKind,
    ReportView, RoundStore,
};
use fas_monitor_telegram::TelegramClient;

use crate::coordinator::SyncCoordinator;
use crate::error::ApiError;

/// Shared handle passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SyncCoordinator>,
    pub telegram: TelegramClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(coordinator: Arc<SyncCoordinator>, telegram: TelegramClient, config: AppConfig) -> Self {
        Self {
            coordinator,
            telegram,
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn rounds(&self) -> &dyn RoundStore {
        self.coordinator.rounds().as_ref()
    }

    /// Renders `kind` over a fresh read of the permanent collection.
    ///
    /// With `templated` set and a template stored for `kind`, the data rows
    /// are spliced into it.
    ///
    /// # Errors
    /// Returns [`ApiError::Storage`] if the collection cannot be read.
    pub async fn render_report(
        &self,
        kind: ReportKind,
        view: ReportView,
        raw_data_only: bool,
        templated: bool,
    ) -> Result<String, ApiError> {
        let records = load_chronological(self.rounds()).await?;
        let (threshold, last_sync, template) = self
            .coordinator
            .read(|s| {
                (
                    s.threshold,
                    s.last_sync,
                    s.template_for(kind).map(str::to_string),
                )
            })
            .await;

        let ctx = ReportContext::new(Utc::now().with_timezone(&self.config.monitor.offset()), threshold)
            .with_view(view)
            .raw(raw_data_only)
            .with_history_limit(self.config.monitor.history_limit)
            .with_last_sync(last_sync);

        Ok(match template {
            Some(template) if templated => render_templated(kind, &records, &ctx, &template),
            _ => render(kind, &records, &ctx),
        })
    }
}
