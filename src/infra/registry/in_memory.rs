// In-memory implementation of RegistryStore.
//
// Used by the core tests and for throwaway runs (`REGISTRY_DB_PATH=memory`)
// where nothing needs to survive a restart. The SQLite store implements the
// same trait for production.

use crate::core::registry::{Content, Identity, RegistryError, RegistryStore, Report};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::Mutex;

/// DashMap-backed registry state.
///
/// The registry service serializes writers, so the individual maps only need
/// to be safe for concurrent readers.
pub struct InMemoryRegistryStore {
    owner: Mutex<Option<Identity>>,
    /// content_id -> content
    contents: DashMap<u64, Content>,
    /// report_id -> report
    reports: DashMap<u64, Report>,
    /// (content_id, reporter) pairs that already filed a report
    reporters: DashSet<(u64, Identity)>,
    moderators: DashSet<Identity>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self {
            owner: Mutex::new(None),
            contents: DashMap::new(),
            reports: DashMap::new(),
            reporters: DashSet::new(),
            moderators: DashSet::new(),
        }
    }
}

impl Default for InMemoryRegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn get_owner(&self) -> Result<Option<Identity>, RegistryError> {
        let owner = self
            .owner
            .lock()
            .map_err(|e| RegistryError::StorageError(e.to_string()))?;
        Ok(*owner)
    }

    async fn set_owner(&self, owner: Identity) -> Result<(), RegistryError> {
        let mut slot = self
            .owner
            .lock()
            .map_err(|e| RegistryError::StorageError(e.to_string()))?;
        *slot = Some(owner);
        Ok(())
    }

    async fn content_count(&self) -> Result<u64, RegistryError> {
        Ok(self.contents.len() as u64)
    }

    async fn report_count(&self) -> Result<u64, RegistryError> {
        Ok(self.reports.len() as u64)
    }

    async fn get_content(&self, content_id: u64) -> Result<Option<Content>, RegistryError> {
        Ok(self.contents.get(&content_id).map(|c| c.clone()))
    }

    async fn get_report(&self, report_id: u64) -> Result<Option<Report>, RegistryError> {
        Ok(self.reports.get(&report_id).map(|r| r.clone()))
    }

    async fn has_reported(
        &self,
        content_id: u64,
        reporter: Identity,
    ) -> Result<bool, RegistryError> {
        Ok(self.reporters.contains(&(content_id, reporter)))
    }

    async fn is_moderator(&self, identity: Identity) -> Result<bool, RegistryError> {
        Ok(self.moderators.contains(&identity))
    }

    async fn list_moderators(&self) -> Result<Vec<Identity>, RegistryError> {
        let mut moderators: Vec<Identity> = self.moderators.iter().map(|m| *m).collect();
        moderators.sort_unstable();
        Ok(moderators)
    }

    async fn insert_content(&self, content: Content) -> Result<(), RegistryError> {
        self.contents.insert(content.id, content);
        Ok(())
    }

    async fn record_report(&self, report: Report, content: Content) -> Result<(), RegistryError> {
        self.reporters.insert((report.content_id, report.reporter));
        self.reports.insert(report.id, report);
        self.contents.insert(content.id, content);
        Ok(())
    }

    async fn update_content(&self, content: Content) -> Result<(), RegistryError> {
        if !self.contents.contains_key(&content.id) {
            return Err(RegistryError::StorageError(format!(
                "content {} was never inserted",
                content.id
            )));
        }
        self.contents.insert(content.id, content);
        Ok(())
    }

    async fn set_moderator(&self, identity: Identity, enabled: bool) -> Result<(), RegistryError> {
        if enabled {
            self.moderators.insert(identity);
        } else {
            self.moderators.remove(&identity);
        }
        Ok(())
    }
}
