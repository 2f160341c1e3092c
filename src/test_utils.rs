//! Test utilities for support-tickets
//!
//! This module provides common test fixtures and utilities to reduce
//! duplication in test code across the codebase.

#![cfg(test)]

use crate::attachments::MockAttachmentStore;
use crate::core::{Status, Ticket, TicketBuilder, TicketId, UserId};
use crate::handlers::{HandlerContext, HandlerSettings};
use crate::storage::{FileStorage, MemoryStorage, TicketRepository};
use crate::store::TicketStore;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture backed by a temporary YAML storage root
pub struct TestProject {
    pub temp_dir: TempDir,
    pub data_dir: PathBuf,
    pub storage: FileStorage,
}

impl TestProject {
    /// Create a new test project with an empty storage root
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("data");
        let storage = FileStorage::open(&data_dir).expect("Failed to open storage");

        Self {
            temp_dir,
            data_dir,
            storage,
        }
    }

    /// Create a test project with one ticket per status, all owned by user 1
    pub fn with_sample_tickets() -> Self {
        let project = Self::new();

        for (id, status) in (1..).zip(Status::ALL) {
            let ticket = create_test_ticket(id, &format!("{status} ticket"), status);
            project
                .storage
                .save(&ticket)
                .expect("Failed to save ticket");
        }

        project
    }

    pub fn store(&self) -> TicketStore<FileStorage> {
        TicketStore::new(self.storage.clone())
    }
}

/// Create a test ticket owned by user 1
pub fn create_test_ticket(id: i64, subject: &str, status: Status) -> Ticket {
    TicketBuilder::new()
        .id(TicketId::new(id))
        .creator(UserId::new(1))
        .subject(subject)
        .description(format!("Description for {subject}"))
        .status(status)
        .build()
}

/// Fixed timestamp `minutes` after a reference instant
pub fn at_minute(minutes: i64) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 15, 9, 0, 0)
        .single()
        .expect("valid reference time");
    base + Duration::minutes(minutes)
}

/// Ticket store over fresh in-memory storage
pub fn fresh_store() -> TicketStore<MemoryStorage> {
    TicketStore::new(MemoryStorage::new())
}

/// Handler context over fresh in-memory storage with default settings
///
/// The attachment store is a mock without expectations; tests that upload
/// files build their own context.
pub fn fresh_context() -> HandlerContext<MemoryStorage> {
    HandlerContext::new(
        fresh_store(),
        Arc::new(MockAttachmentStore::new()),
        HandlerSettings::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = TestProject::new();
        assert!(project.data_dir.join("tickets").exists());
    }

    #[test]
    fn test_project_with_sample_tickets() {
        let project = TestProject::with_sample_tickets();
        let tickets = project.storage.load_all().unwrap();
        assert_eq!(tickets.len(), 4);
    }

    #[test]
    fn test_at_minute_is_ordered() {
        assert!(at_minute(1) > at_minute(0));
        assert_eq!(at_minute(60) - at_minute(0), Duration::hours(1));
    }
}
