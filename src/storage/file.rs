//! YAML file storage backend
//!
//! Layout under the storage root:
//!
//! ```text
//! state.yaml            id counters
//! tickets/<id>.yaml     one file per ticket
//! comments/<id>.yaml    one file per comment
//! ```
//!
//! Every record is written to a temporary file and renamed into place, so a
//! reader never observes a half-written record.

use super::repository::{CommentRepository, TicketRepository};
use crate::core::{Comment, CommentId, Ticket, TicketId};
use crate::error::{Result, TicketError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const STATE_FILE: &str = "state.yaml";
const TICKETS_DIR: &str = "tickets";
const COMMENTS_DIR: &str = "comments";

/// Persistent counters of a storage root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    pub last_ticket_id: i64,
    pub last_comment_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for StoreState {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            last_ticket_id: 0,
            last_comment_id: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage backend keeping one YAML file per record
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    /// Serializes read-modify-write cycles on `state.yaml`
    allocator: Arc<Mutex<()>>,
}

impl FileStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            allocator: Arc::new(Mutex::new(())),
        }
    }

    /// Open a storage root, creating its directories if needed
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let storage = Self::new(root);
        storage.ensure_directories()?;
        Ok(storage)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(self.root.join(TICKETS_DIR))?;
        fs::create_dir_all(self.root.join(COMMENTS_DIR))?;
        Ok(())
    }

    pub fn load_state(&self) -> Result<StoreState> {
        let path = self.root.join(STATE_FILE);
        if path.exists() {
            read_yaml(&path)
        } else {
            Ok(StoreState::default())
        }
    }

    pub fn save_state(&self, state: &StoreState) -> Result<()> {
        write_yaml(&self.root.join(STATE_FILE), state)
    }

    fn ticket_path(&self, id: TicketId) -> PathBuf {
        self.root.join(TICKETS_DIR).join(format!("{id}.yaml"))
    }

    fn comment_path(&self, id: CommentId) -> PathBuf {
        self.root.join(COMMENTS_DIR).join(format!("{id}.yaml"))
    }

    fn update_state<F>(&self, f: F) -> Result<StoreState>
    where
        F: FnOnce(&mut StoreState),
    {
        let _guard = self
            .allocator
            .lock()
            .map_err(|_| TicketError::storage("file storage allocator lock poisoned"))?;
        let mut state = self.load_state()?;
        f(&mut state);
        state.updated_at = Utc::now();
        self.save_state(&state)?;
        Ok(state)
    }

    fn load_dir<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>> {
        let dir = self.root.join(dir);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                records.push(read_yaml(&path)?);
            }
        }
        Ok(records)
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_yaml::to_string(value)?;
    let tmp = path.with_extension(format!("yaml.{}.tmp", uuid::Uuid::new_v4().simple()));
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl TicketRepository for FileStorage {
    fn next_ticket_id(&self) -> Result<TicketId> {
        let state = self.update_state(|s| s.last_ticket_id += 1)?;
        Ok(TicketId::new(state.last_ticket_id))
    }

    fn save(&self, ticket: &Ticket) -> Result<()> {
        write_yaml(&self.ticket_path(ticket.id), ticket)?;
        if self.load_state()?.last_ticket_id < ticket.id.get() {
            self.update_state(|s| s.last_ticket_id = s.last_ticket_id.max(ticket.id.get()))?;
        }
        Ok(())
    }

    fn load(&self, id: TicketId) -> Result<Ticket> {
        let path = self.ticket_path(id);
        if !path.exists() {
            return Err(TicketError::ticket_not_found(id));
        }
        read_yaml(&path)
    }

    fn load_all(&self) -> Result<Vec<Ticket>> {
        self.load_dir(TICKETS_DIR)
    }

    fn exists(&self, id: TicketId) -> Result<bool> {
        Ok(self.ticket_path(id).exists())
    }
}

impl CommentRepository for FileStorage {
    fn next_comment_id(&self) -> Result<CommentId> {
        let state = self.update_state(|s| s.last_comment_id += 1)?;
        Ok(CommentId::new(state.last_comment_id))
    }

    fn save_comment(&self, comment: &Comment) -> Result<()> {
        write_yaml(&self.comment_path(comment.id), comment)?;
        if self.load_state()?.last_comment_id < comment.id.get() {
            self.update_state(|s| s.last_comment_id = s.last_comment_id.max(comment.id.get()))?;
        }
        Ok(())
    }

    fn load_comment(&self, id: CommentId) -> Result<Comment> {
        let path = self.comment_path(id);
        if !path.exists() {
            return Err(TicketError::comment_not_found(id));
        }
        read_yaml(&path)
    }

    fn comments_for(&self, ticket_id: TicketId) -> Result<Vec<Comment>> {
        let comments: Vec<Comment> = self.load_dir(COMMENTS_DIR)?;
        Ok(comments
            .into_iter()
            .filter(|c| c.ticket_id == ticket_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CommentBuilder, Status, TicketBuilder, UserId};
    use tempfile::TempDir;

    fn create_test_ticket(id: i64, subject: &str) -> Ticket {
        TicketBuilder::new()
            .id(TicketId::new(id))
            .creator(UserId::new(1))
            .subject(subject)
            .description(format!("Description for {subject}"))
            .build()
    }

    fn storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::open(temp_dir.path().join("tickets-data")).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_ticket_repository_save_and_load() {
        let (_dir, storage) = storage();
        let ticket = create_test_ticket(1, "test-save");

        storage.save(&ticket).expect("Failed to save ticket");

        let loaded = storage.load(ticket.id).expect("Failed to load ticket");
        assert_eq!(loaded, ticket);
    }

    #[test]
    fn test_ticket_repository_load_all() {
        let (_dir, storage) = storage();
        for i in 1..=3 {
            storage
                .save(&create_test_ticket(i, &format!("test-{i}")))
                .expect("Failed to save ticket");
        }

        let loaded = storage.load_all().expect("Failed to load all tickets");
        assert_eq!(loaded.len(), 3);
    }

    #[test]
    fn test_ticket_repository_exists() {
        let (_dir, storage) = storage();
        let ticket = create_test_ticket(5, "test-exists");

        assert!(!storage.exists(ticket.id).expect("Failed to check existence"));
        storage.save(&ticket).expect("Failed to save ticket");
        assert!(storage.exists(ticket.id).expect("Failed to check existence"));
    }

    #[test]
    fn test_ticket_repository_load_missing() {
        let (_dir, storage) = storage();
        assert!(storage.load(TicketId::new(99)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_ticket_repository_find_and_count() {
        let (_dir, storage) = storage();
        let mut closed = create_test_ticket(1, "closed");
        closed.status = Status::Closed;
        storage.save(&closed).unwrap();
        storage.save(&create_test_ticket(2, "new")).unwrap();

        let found = storage
            .find(|t| t.status == Status::Closed)
            .expect("Failed to find tickets");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slug, "closed");

        let open_count = storage
            .count(|t| t.status.accepts_comments())
            .expect("Failed to count tickets");
        assert_eq!(open_count, 1);
    }

    #[test]
    fn test_id_allocation_persists_across_instances() {
        let (dir, storage) = storage();
        assert_eq!(storage.next_ticket_id().unwrap(), TicketId::new(1));
        assert_eq!(storage.next_ticket_id().unwrap(), TicketId::new(2));

        let reopened = FileStorage::open(dir.path().join("tickets-data")).unwrap();
        assert_eq!(reopened.next_ticket_id().unwrap(), TicketId::new(3));
        assert_eq!(reopened.next_comment_id().unwrap(), CommentId::new(1));
    }

    #[test]
    fn test_save_with_explicit_id_advances_allocator() {
        let (_dir, storage) = storage();
        storage.save(&create_test_ticket(10, "imported")).unwrap();
        assert_eq!(storage.next_ticket_id().unwrap(), TicketId::new(11));
    }

    #[test]
    fn test_comment_repository() {
        let (_dir, storage) = storage();
        let comment = CommentBuilder::new()
            .id(CommentId::new(1))
            .ticket(TicketId::new(7))
            .author(UserId::new(2))
            .comment("Looking into it")
            .build();
        storage.save_comment(&comment).unwrap();

        assert_eq!(storage.load_comment(comment.id).unwrap(), comment);
        assert_eq!(storage.comments_for(TicketId::new(7)).unwrap().len(), 1);
        assert!(storage.comments_for(TicketId::new(8)).unwrap().is_empty());
        assert!(
            storage
                .load_comment(CommentId::new(2))
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (_dir, storage) = storage();
        storage.save(&create_test_ticket(1, "clean")).unwrap();
        let leftovers: Vec<_> = fs::read_dir(storage.root().join(TICKETS_DIR))
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
