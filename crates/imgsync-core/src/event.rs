//! Lifecycle event input and response output.
//!
//! These mirror the custom-resource request document delivered by the
//! orchestration platform. Only the fields the handler reads are typed; the
//! response envelope (signed upload to `ResponseURL`) is the platform's
//! concern.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    /// Resource is being created.
    Create,
    /// Resource properties changed.
    Update,
    /// Resource is being deleted.
    Delete,
}

/// A lifecycle event for the managed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    /// Request type.
    pub request_type: RequestType,

    /// Unique request identifier.
    #[serde(default)]
    pub request_id: String,

    /// Stack that owns the resource.
    #[serde(default)]
    pub stack_id: String,

    /// Logical id of the resource in the template.
    #[serde(default)]
    pub logical_resource_id: String,

    /// Physical id; absent on create.
    #[serde(default)]
    pub physical_resource_id: String,

    /// Declared resource type.
    #[serde(default)]
    pub resource_type: String,

    /// Pre-signed URL for the platform response.
    #[serde(default, rename = "ResponseURL")]
    pub response_url: String,

    /// Current resource properties.
    #[serde(default)]
    pub resource_properties: Map<String, Value>,

    /// Previous resource properties (update only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Map<String, Value>>,
}

impl LifecycleEvent {
    /// Creates an event of the given type with the given properties.
    #[must_use]
    pub fn new(request_type: RequestType, resource_properties: Map<String, Value>) -> Self {
        Self {
            request_type,
            request_id: String::new(),
            stack_id: String::new(),
            logical_resource_id: String::new(),
            physical_resource_id: String::new(),
            resource_type: String::new(),
            response_url: String::new(),
            resource_properties,
            old_resource_properties: None,
        }
    }

    /// Sets the physical resource id.
    #[must_use]
    pub fn with_physical_resource_id(mut self, id: impl Into<String>) -> Self {
        self.physical_resource_id = id.into();
        self
    }
}

/// Successful lifecycle step result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleResponse {
    /// Physical resource id.
    pub physical_resource_id: String,

    /// Auxiliary output attributes.
    pub data: Map<String, Value>,
}

impl LifecycleResponse {
    /// Creates a response with no data attributes.
    #[must_use]
    pub fn new(physical_resource_id: impl Into<String>) -> Self {
        Self {
            physical_resource_id: physical_resource_id.into(),
            data: Map::new(),
        }
    }

    /// Returns the id to report, generating one when the event carried none.
    #[must_use]
    pub fn physical_id_for(event: &LifecycleEvent) -> String {
        if event.physical_resource_id.is_empty() {
            uuid::Uuid::now_v7().to_string()
        } else {
            event.physical_resource_id.clone()
        }
    }
}
