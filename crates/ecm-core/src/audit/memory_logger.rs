// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory audit logger for tests and development.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::AuditResult;
use super::types::{AuditAction, AuditLog};
use super::AuditLogger;

/// Keeps audit entries in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the server
/// and inspect the other.
#[derive(Debug, Clone)]
pub struct InMemoryAuditLogger {
    logs: Arc<RwLock<Vec<AuditLog>>>,
    /// Maximum number of entries to keep (0 = unlimited).
    max_entries: usize,
}

impl Default for InMemoryAuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuditLogger {
    /// Creates a logger with unlimited capacity.
    pub fn new() -> Self {
        Self {
            logs: Arc::new(RwLock::new(Vec::new())),
            max_entries: 0,
        }
    }

    /// Creates a logger that drops the oldest entries beyond `max_entries`.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            logs: Arc::new(RwLock::new(Vec::with_capacity(max_entries.min(10_000)))),
            max_entries,
        }
    }

    /// Returns all entries.
    pub fn entries(&self) -> Vec<AuditLog> {
        self.logs.read().clone()
    }

    /// Returns entries matching a predicate.
    pub fn entries_where<F>(&self, predicate: F) -> Vec<AuditLog>
    where
        F: Fn(&AuditLog) -> bool,
    {
        self.logs.read().iter().filter(|l| predicate(l)).cloned().collect()
    }

    /// Returns entries for one action.
    pub fn entries_for_action(&self, action: AuditAction) -> Vec<AuditLog> {
        self.entries_where(|l| l.action == action)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    /// Returns `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.logs.read().is_empty()
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.logs.write().clear();
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        let mut logs = self.logs.write();
        if self.max_entries > 0 && logs.len() >= self.max_entries {
            logs.remove(0);
        }
        logs.push(entry);
        Ok(())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
