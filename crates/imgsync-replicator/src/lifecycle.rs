//! Lifecycle event handling.
//!
//! Create and Update replicate the image described by the resource
//! properties. Delete does nothing: the only artifacts are the copied
//! images, which stay in place.

use serde_json::Value;

use imgsync_core::{LifecycleEvent, LifecycleResponse, ReplicationProperties, RequestType, Result};

use crate::driver::ReplicationDriver;
use crate::state::ReplicationReport;

/// Result of one handled lifecycle event.
#[derive(Debug, Clone)]
pub struct LifecycleOutcome {
    /// Response for the platform.
    pub response: LifecycleResponse,

    /// What the driver did.
    pub report: ReplicationReport,
}

/// Maps lifecycle events to driver runs.
#[derive(Debug)]
pub struct LifecycleAdapter {
    driver: ReplicationDriver,
}

impl LifecycleAdapter {
    /// Creates an adapter around `driver`.
    #[must_use]
    pub const fn new(driver: ReplicationDriver) -> Self {
        Self { driver }
    }

    /// Handles one event, returning the platform response.
    ///
    /// # Errors
    ///
    /// Returns the driver's error for a failed Create or Update.
    pub async fn handle(&self, event: &LifecycleEvent) -> Result<LifecycleResponse> {
        self.handle_with_report(event).await.map(|outcome| outcome.response)
    }

    /// Handles one event, also returning the driver report.
    ///
    /// # Errors
    ///
    /// Returns the driver's error for a failed Create or Update.
    pub async fn handle_with_report(&self, event: &LifecycleEvent) -> Result<LifecycleOutcome> {
        let properties =
            Value::Object(ReplicationProperties::redacted_map(&event.resource_properties));
        tracing::info!(
            request_type = ?event.request_type,
            request_id = %event.request_id,
            logical_resource_id = %event.logical_resource_id,
            physical_resource_id = %event.physical_resource_id,
            properties = %properties,
            "handling lifecycle event"
        );

        let report = match event.request_type {
            RequestType::Delete => {
                tracing::info!("delete requested; nothing to remove");
                ReplicationReport::skipped()
            }
            RequestType::Create | RequestType::Update => {
                self.driver.run(&event.resource_properties).await?
            }
        };

        Ok(LifecycleOutcome {
            response: LifecycleResponse::new(LifecycleResponse::physical_id_for(event)),
            report,
        })
    }
}
