// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Ownership gateways for exercising the policy engine in isolation, and a
//! password verifier that records which hashes it was asked to check.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ecm_core::{
    verify_password, DependencyError, HashVerifier, RecordId, ResourceGateway, ResourceKind, UserId,
};

// =============================================================================
// Failing Gateway
// =============================================================================

/// A gateway whose every lookup fails.
#[derive(Debug, Default)]
pub struct FailingGateway;

fn offline() -> DependencyError {
    DependencyError::new("mock_gateway", "connection refused")
}

#[async_trait]
impl ResourceGateway for FailingGateway {
    async fn application_owner(&self, _id: RecordId) -> Result<Option<UserId>, DependencyError> {
        Err(offline())
    }

    async fn parent_application(
        &self,
        _kind: ResourceKind,
        _id: RecordId,
    ) -> Result<Option<RecordId>, DependencyError> {
        Err(offline())
    }

    async fn student_information_owner(
        &self,
        _id: RecordId,
    ) -> Result<Option<UserId>, DependencyError> {
        Err(offline())
    }
}

// =============================================================================
// Counting Gateway
// =============================================================================

/// Wraps a gateway and counts the lookups that reach it.
pub struct CountingGateway {
    inner: Arc<dyn ResourceGateway>,
    calls: AtomicUsize,
}

impl CountingGateway {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn ResourceGateway>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Lookups observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResourceGateway for CountingGateway {
    async fn application_owner(&self, id: RecordId) -> Result<Option<UserId>, DependencyError> {
        self.record();
        self.inner.application_owner(id).await
    }

    async fn parent_application(
        &self,
        kind: ResourceKind,
        id: RecordId,
    ) -> Result<Option<RecordId>, DependencyError> {
        self.record();
        self.inner.parent_application(kind, id).await
    }

    async fn student_information_owner(
        &self,
        id: RecordId,
    ) -> Result<Option<UserId>, DependencyError> {
        self.record();
        self.inner.student_information_owner(id).await
    }
}

// =============================================================================
// Recording Verifier
// =============================================================================

/// Password verifier that remembers every hash it checks.
#[derive(Debug, Default)]
pub struct RecordingVerifier {
    checked: parking_lot::Mutex<Vec<String>>,
}

impl RecordingVerifier {
    /// Hashes checked so far, oldest first.
    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().clone()
    }
}

impl HashVerifier for RecordingVerifier {
    fn verify(&self, hash: &str, password: &str) -> bool {
        self.checked.lock().push(hash.to_string());
        verify_password(hash, password)
    }
}
