//! Uploaded file storage
//!
//! Tickets and comments only keep an [`AttachmentRef`], the relative path
//! returned by an [`AttachmentStore`].

use crate::core::AttachmentRef;
use crate::error::{Result, TicketError};
use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid file name regex"));

/// What an upload is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Ticket,
    Comment,
}

impl AttachmentKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Ticket => "tickets/main/attachments",
            Self::Comment => "tickets/comments/attachments",
        }
    }

    /// Directory for uploads made at `now`, e.g. `tickets/main/attachments/2024/01`
    #[must_use]
    pub fn upload_dir(self, now: DateTime<Utc>) -> String {
        format!("{}/{:04}/{:02}", self.prefix(), now.year(), now.month())
    }
}

/// A file submitted with a form, not yet stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Where uploaded bytes end up
#[cfg_attr(test, mockall::automock)]
pub trait AttachmentStore: Send + Sync {
    /// Persist an upload and return the reference to record
    fn store(&self, kind: AttachmentKind, file_name: &str, bytes: &[u8]) -> Result<AttachmentRef>;

    /// Delete a stored upload that ended up attached to nothing
    fn remove(&self, reference: &AttachmentRef) -> Result<()>;
}

/// Reduce an uploaded file name to a safe single path component
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_CHARS.replace_all(base.trim(), "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `report.pdf` + `ab12cd3` -> `report_ab12cd3.pdf`
fn with_suffix(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{name}_{suffix}"),
    }
}

/// Attachment store writing into a local directory
#[derive(Debug, Clone)]
pub struct LocalAttachmentStore {
    root: PathBuf,
}

impl LocalAttachmentStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored attachment
    #[must_use]
    pub fn path_of(&self, reference: &AttachmentRef) -> PathBuf {
        self.root.join(reference.as_str())
    }

    fn store_at(
        &self,
        kind: AttachmentKind,
        file_name: &str,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<AttachmentRef> {
        if bytes.is_empty() {
            return Err(TicketError::invalid_field(
                "attachment",
                "The submitted file is empty.",
            ));
        }

        let dir = kind.upload_dir(now);
        fs::create_dir_all(self.root.join(&dir))?;

        let mut name = sanitize_file_name(file_name);
        if self.root.join(&dir).join(&name).exists() {
            let uuid = uuid::Uuid::new_v4().simple().to_string();
            name = with_suffix(&name, &uuid[..7]);
        }

        let relative = format!("{dir}/{name}");
        fs::write(self.root.join(&relative), bytes)?;
        info!("Stored attachment - {} ({} bytes)", relative, bytes.len());
        Ok(AttachmentRef::new(relative))
    }
}

impl AttachmentStore for LocalAttachmentStore {
    fn store(&self, kind: AttachmentKind, file_name: &str, bytes: &[u8]) -> Result<AttachmentRef> {
        self.store_at(kind, file_name, bytes, Utc::now())
    }

    fn remove(&self, reference: &AttachmentRef) -> Result<()> {
        fs::remove_file(self.path_of(reference))?;
        info!("Removed attachment - {}", reference);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::at_minute;
    use tempfile::TempDir;

    #[test]
    fn test_upload_dirs_are_date_partitioned() {
        let now = at_minute(0);
        assert_eq!(
            AttachmentKind::Ticket.upload_dir(now),
            "tickets/main/attachments/2024/01"
        );
        assert_eq!(
            AttachmentKind::Comment.upload_dir(now),
            "tickets/comments/attachments/2024/01"
        );
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("screen shot.png"), "screen_shot.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\log.txt"), "log.txt");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn test_store_writes_bytes() {
        let dir = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(dir.path());

        let reference = store
            .store_at(AttachmentKind::Ticket, "log.txt", b"boom", at_minute(0))
            .expect("Failed to store attachment");

        assert_eq!(reference.as_str(), "tickets/main/attachments/2024/01/log.txt");
        assert_eq!(fs::read(store.path_of(&reference)).unwrap(), b"boom");
    }

    #[test]
    fn test_store_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(dir.path());

        let first = store
            .store_at(AttachmentKind::Comment, "log.txt", b"one", at_minute(0))
            .unwrap();
        let second = store
            .store_at(AttachmentKind::Comment, "log.txt", b"two", at_minute(0))
            .unwrap();

        assert_ne!(first, second);
        assert!(second.file_name().starts_with("log_"));
        assert!(second.file_name().ends_with(".txt"));
        assert_eq!(fs::read(store.path_of(&first)).unwrap(), b"one");
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(dir.path());
        let reference = store.store(AttachmentKind::Ticket, "log.txt", b"boom").unwrap();

        store.remove(&reference).unwrap();
        assert!(!store.path_of(&reference).exists());
        assert!(store.remove(&reference).is_err());
    }

    #[test]
    fn test_store_rejects_empty_upload() {
        let dir = TempDir::new().unwrap();
        let store = LocalAttachmentStore::new(dir.path());
        let err = store.store(AttachmentKind::Ticket, "x.txt", b"").unwrap_err();
        assert!(matches!(err, TicketError::Validation(_)));
    }

    #[test]
    fn test_mock_store() {
        let mut mock = MockAttachmentStore::new();
        mock.expect_store()
            .withf(|kind, name, bytes| {
                *kind == AttachmentKind::Ticket && name == "a.png" && bytes == b"png"
            })
            .times(1)
            .returning(|_, name, _| Ok(AttachmentRef::new(format!("mock/{name}"))));

        let reference = mock.store(AttachmentKind::Ticket, "a.png", b"png").unwrap();
        assert_eq!(reference.as_str(), "mock/a.png");
    }
}
