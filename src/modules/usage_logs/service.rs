//! Usage metering.
//!
//! Starting to use a service opens a usage log with zero duration. The
//! client then sends heartbeats carrying the seconds elapsed since the last
//! one; each is added to the log by a single atomic store update, so
//! concurrent heartbeats for the same log are never lost.

use anyhow::anyhow;
use tracing::{debug, info, instrument};

use platform_config::AppConfig;
use platform_core::{AppError, UsageLogIdentifier, with_deadline};
use platform_db::{StoreError, Stores};
use platform_models::{NewUsageLog, UsageLog, UsageLogView, UseService};

use crate::metrics::{track_heartbeat, track_usage_started};

pub struct UsageLogService;

impl UsageLogService {
    /// Opens a usage log for `user_id` on `service_id` and returns the
    /// service snapshot together with the log id heartbeats must reference.
    #[instrument(skip(stores, config))]
    pub async fn start_usage(
        stores: &Stores,
        config: &AppConfig,
        user_id: i64,
        service_id: i64,
    ) -> Result<UseService, AppError> {
        with_deadline(config.context_timeout, async {
            let log = stores
                .usage_logs
                .create(NewUsageLog {
                    user_id,
                    service_id,
                })
                .await
                .map_err(StoreError::into_app_error)?;

            let service = stores
                .services
                .get_by_id(service_id)
                .await
                .map_err(StoreError::into_app_error)?;

            track_usage_started();
            info!(log_id = log.id, user_id, service_id, "Usage started");

            Ok(UseService {
                service: service.into(),
                log_id: log.id,
            })
        })
        .await
    }

    /// Adds `duration_seconds` to the log. Negative durations are rejected
    /// so a log's total never decreases.
    #[instrument(skip(stores, config))]
    pub async fn heartbeat(
        stores: &Stores,
        config: &AppConfig,
        log_id: i64,
        duration_seconds: i64,
    ) -> Result<(), AppError> {
        if duration_seconds < 0 {
            return Err(AppError::bad_request(anyhow!(
                "duration must not be negative"
            )));
        }

        with_deadline(config.context_timeout, async {
            stores
                .usage_logs
                .add_duration(log_id, duration_seconds)
                .await
                .map_err(StoreError::into_app_error)?;

            track_heartbeat(duration_seconds);
            debug!(log_id, duration_seconds, "Heartbeat recorded");
            Ok(())
        })
        .await
    }

    #[instrument(skip(stores, config))]
    pub async fn get_logs(stores: &Stores, config: &AppConfig) -> Result<Vec<UsageLog>, AppError> {
        with_deadline(config.context_timeout, async {
            stores
                .usage_logs
                .fetch_all()
                .await
                .map_err(StoreError::into_app_error)
        })
        .await
    }

    /// Resolves `identifier` to one log (`42`) or every log of a user
    /// (`user:42`) or service (`service:7`).
    #[instrument(skip(stores, config))]
    pub async fn get_log(
        stores: &Stores,
        config: &AppConfig,
        identifier: &str,
    ) -> Result<UsageLogView, AppError> {
        let identifier = UsageLogIdentifier::parse(identifier)?;

        with_deadline(config.context_timeout, async {
            let view = match identifier {
                UsageLogIdentifier::Id(id) => stores
                    .usage_logs
                    .get_by_id(id)
                    .await
                    .map(UsageLogView::Single),
                UsageLogIdentifier::User(user_id) => stores
                    .usage_logs
                    .get_by_user(user_id)
                    .await
                    .map(UsageLogView::Many),
                UsageLogIdentifier::Service(service_id) => stores
                    .usage_logs
                    .get_by_service(service_id)
                    .await
                    .map(UsageLogView::Many),
            }
            .map_err(StoreError::into_app_error)?;

            Ok(view)
        })
        .await
    }

    #[instrument(skip(stores, config))]
    pub async fn delete_log(stores: &Stores, config: &AppConfig, id: i64) -> Result<(), AppError> {
        with_deadline(config.context_timeout, async {
            stores
                .usage_logs
                .delete(id)
                .await
                .map_err(StoreError::into_app_error)
        })
        .await
    }
}
