//! Shared fixtures for replicator integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use imgsync_core::{Error, MemorySecretStore, Result, SecretStore};
use imgsync_registry::{EcrTokenProvider, RegistryAuth};
use imgsync_replicator::{ReplicationDriver, ReplicatorConfig};
use imgsync_transport::{CopyRequest, ImageListSelection, ImageTransport, PolicyContext};

/// What the transport saw for one copy attempt.
#[derive(Debug, Clone)]
pub struct RecordedCopy {
    pub source: String,
    pub destination: String,
    pub arch: String,
    pub selection: ImageListSelection,
    pub source_auth: RegistryAuth,
    pub dest_auth: RegistryAuth,
    pub policy_path: PathBuf,
    pub policy_present: bool,
}

/// Transport that records every attempt and can fail a chosen one.
#[derive(Default)]
pub struct RecordingTransport {
    attempts: Mutex<Vec<RecordedCopy>>,
    fail_at: Option<usize>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fails the attempt with the given zero-based index.
    pub fn failing_at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(Vec::new()),
            fail_at: Some(index),
        })
    }

    pub fn attempts(&self) -> Vec<RecordedCopy> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageTransport for RecordingTransport {
    async fn copy(&self, request: &CopyRequest, policy: &PolicyContext) -> Result<()> {
        let mut attempts = self.attempts.lock().unwrap();
        let index = attempts.len();
        attempts.push(RecordedCopy {
            source: request.source().reference.to_string(),
            destination: request.destination().reference.to_string(),
            arch: request.arch_choice().to_string(),
            selection: request.selection(),
            source_auth: request.source().auth.clone(),
            dest_auth: request.destination().auth.clone(),
            policy_path: policy.path().to_path_buf(),
            policy_present: policy.path().exists(),
        });

        if self.fail_at == Some(index) {
            return Err(Error::Copy {
                message: "manifest unknown".to_string(),
            });
        }
        Ok(())
    }
}

/// ECR token provider returning a fixed token and recording regions.
pub struct StaticEcr {
    token: String,
    regions: Mutex<Vec<String>>,
}

impl StaticEcr {
    /// Token for `AWS:pw`.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            token: "QVdTOnB3".to_string(),
            regions: Mutex::new(Vec::new()),
        })
    }

    pub fn regions(&self) -> Vec<String> {
        self.regions.lock().unwrap().clone()
    }
}

#[async_trait]
impl EcrTokenProvider for StaticEcr {
    async fn authorization_token(&self, region: &str) -> Result<String> {
        self.regions.lock().unwrap().push(region.to_string());
        Ok(self.token.clone())
    }
}

pub const SOURCE: &str = "docker://docker.io/library/nginx:1.25";
pub const DESTINATION: &str = "docker://ghcr.io/org/nginx:1.25";
pub const ECR_DESTINATION: &str = "docker://123456789012.dkr.ecr.us-west-2.amazonaws.com/nginx:1.25";

pub fn props(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
        .collect()
}

pub fn driver_with(
    transport: Arc<RecordingTransport>,
    secrets: MemorySecretStore,
    ecr: Arc<StaticEcr>,
) -> ReplicationDriver {
    let secrets: Arc<dyn SecretStore> = Arc::new(secrets);
    ReplicationDriver::new(ReplicatorConfig::default(), transport, secrets, ecr)
}

pub fn driver(transport: Arc<RecordingTransport>) -> ReplicationDriver {
    driver_with(transport, MemorySecretStore::new(), StaticEcr::new())
}
