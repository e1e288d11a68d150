// Moderation registry service - core business logic for content moderation.
//
// This service handles:
// - Content submission with sequential ids
// - Community reports (one per reporter per content) and threshold escalation
// - Moderator-driven status changes, with removal being terminal
// - Owner-managed moderator set
//
// NO Discord or SQL dependencies here - just pure domain logic.

use super::registry_models::{
    Content, ContentStatus, Identity, RegistryEvent, Report, REPORT_THRESHOLD, ZERO_IDENTITY,
};
use super::registry_store::RegistryStore;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};

/// Buffered audit events per subscriber before slow receivers start lagging.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// ============================================================================
// ERRORS
// ============================================================================

/// Broad classification of a registry failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Unauthorized,
    Conflict,
    Storage,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Content {0} does not exist")]
    ContentNotFound(u64),

    #[error("Report {0} does not exist")]
    ReportNotFound(u64),

    #[error("Content hash cannot be empty")]
    EmptyContentHash,

    #[error("Report reason cannot be empty")]
    EmptyReason,

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Only the owner can do this")]
    NotOwner,

    #[error("Only moderators can do this")]
    NotModerator,

    #[error("Content {0} is no longer active")]
    ContentInactive(u64),

    #[error("You have already reported this content")]
    AlreadyReported,

    #[error("You cannot report your own content")]
    CannotReportOwnContent,

    #[error("{0} is already a moderator")]
    AlreadyModerator(Identity),

    #[error("{0} is not a moderator")]
    NotAModerator(Identity),

    #[error("The owner cannot be removed as moderator")]
    CannotRemoveOwner,

    #[error("Registry is owned by {stored}, not {requested}")]
    OwnerMismatch { stored: Identity, requested: Identity },

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::ContentNotFound(_) | RegistryError::ReportNotFound(_) => {
                ErrorKind::NotFound
            }
            RegistryError::EmptyContentHash
            | RegistryError::EmptyReason
            | RegistryError::InvalidAddress => ErrorKind::InvalidInput,
            RegistryError::NotOwner | RegistryError::NotModerator => ErrorKind::Unauthorized,
            RegistryError::ContentInactive(_)
            | RegistryError::AlreadyReported
            | RegistryError::CannotReportOwnContent
            | RegistryError::AlreadyModerator(_)
            | RegistryError::NotAModerator(_)
            | RegistryError::CannotRemoveOwner
            | RegistryError::OwnerMismatch { .. } => ErrorKind::Conflict,
            RegistryError::StorageError(_) => ErrorKind::Storage,
        }
    }
}

// ============================================================================
// AUTHORIZATION
// ============================================================================

/// Capability required by a guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Moderator,
}

/// Decide whether `caller` holds `role`. The owner satisfies both roles.
pub fn is_authorized(
    role: Role,
    caller: Identity,
    owner: Identity,
    caller_is_moderator: bool,
) -> bool {
    match role {
        Role::Owner => caller == owner,
        Role::Moderator => caller == owner || caller_is_moderator,
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Community moderation registry.
///
/// Every state-changing operation holds `write_lock` from its first
/// precondition read to its last write, so id allocation and the checks that
/// guard a mutation never interleave with another operation.
///
/// The registry owns its store outright. The lock only serializes writers
/// that go through this registry, so a store must never back two of them.
pub struct ModerationRegistry<S: RegistryStore> {
    store: S,
    owner: Identity,
    write_lock: Mutex<()>,
    events: broadcast::Sender<RegistryEvent>,
}

impl<S: RegistryStore> ModerationRegistry<S> {
    /// Deploy the registry on `store` with `owner` as the permanent moderator.
    ///
    /// Reopening a store that was deployed by the same owner is fine; a
    /// different owner is rejected.
    pub async fn deploy(store: S, owner: Identity) -> Result<Self, RegistryError> {
        if owner == ZERO_IDENTITY {
            return Err(RegistryError::InvalidAddress);
        }

        match store.get_owner().await? {
            Some(stored) if stored != owner => {
                return Err(RegistryError::OwnerMismatch {
                    stored,
                    requested: owner,
                });
            }
            Some(_) => {}
            None => store.set_owner(owner).await?,
        }

        if !store.is_moderator(owner).await? {
            store.set_moderator(owner, true).await?;
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        tracing::info!(owner, "Moderation registry deployed");

        Ok(Self {
            store,
            owner,
            write_lock: Mutex::new(()),
            events,
        })
    }

    /// Receive every audit event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: RegistryEvent) {
        tracing::info!(event = event.name(), ?event, "Registry event");
        // No subscribers is fine; the event is still logged above.
        let _ = self.events.send(event);
    }

    async fn authorize(&self, role: Role, caller: Identity) -> Result<(), RegistryError> {
        let caller_is_moderator = self.store.is_moderator(caller).await?;
        if is_authorized(role, caller, self.owner, caller_is_moderator) {
            return Ok(());
        }

        tracing::warn!(caller, ?role, "Unauthorized registry call");
        Err(match role {
            Role::Owner => RegistryError::NotOwner,
            Role::Moderator => RegistryError::NotModerator,
        })
    }

    async fn load_content(&self, content_id: u64) -> Result<Content, RegistryError> {
        if content_id == 0 {
            return Err(RegistryError::ContentNotFound(content_id));
        }
        self.store
            .get_content(content_id)
            .await?
            .ok_or(RegistryError::ContentNotFound(content_id))
    }

    /// Register a content reference. Returns the new content id.
    pub async fn submit_content(
        &self,
        caller: Identity,
        content_hash: &str,
    ) -> Result<u64, RegistryError> {
        if content_hash.is_empty() {
            return Err(RegistryError::EmptyContentHash);
        }

        let _guard = self.write_lock.lock().await;

        let content_id = self.store.content_count().await? + 1;
        let content = Content::new(content_id, caller, content_hash.to_string(), Utc::now());
        self.store.insert_content(content).await?;

        self.publish(RegistryEvent::ContentSubmitted {
            content_id,
            author: caller,
            content_hash: content_hash.to_string(),
        });

        Ok(content_id)
    }

    /// File a report against active content. Returns the new report id.
    ///
    /// Reaching the report threshold while the content is still `Active`
    /// moves it to `UnderReview`.
    pub async fn report_content(
        &self,
        caller: Identity,
        content_id: u64,
        reason: &str,
    ) -> Result<u64, RegistryError> {
        let _guard = self.write_lock.lock().await;

        let mut content = self.load_content(content_id).await?;
        if !content.is_active {
            return Err(RegistryError::ContentInactive(content_id));
        }
        if self.store.has_reported(content_id, caller).await? {
            return Err(RegistryError::AlreadyReported);
        }
        if content.author == caller {
            return Err(RegistryError::CannotReportOwnContent);
        }
        if reason.is_empty() {
            return Err(RegistryError::EmptyReason);
        }

        let report_id = self.store.report_count().await? + 1;
        content.report_count = content.report_count.saturating_add(1);

        if content.report_count >= REPORT_THRESHOLD && content.status == ContentStatus::Active {
            content.status = ContentStatus::UnderReview;
            tracing::info!(
                content_id,
                report_count = content.report_count,
                "Report threshold reached, content moved to review"
            );
        }

        let report = Report {
            id: report_id,
            content_id,
            reporter: caller,
            reason: reason.to_string(),
            timestamp: Utc::now(),
            is_processed: false,
        };
        self.store.record_report(report, content).await?;

        self.publish(RegistryEvent::ContentReported {
            content_id,
            reporter: caller,
            reason: reason.to_string(),
        });

        Ok(report_id)
    }

    /// Set the status of active content. `Removed` deactivates it for good.
    pub async fn moderate_content(
        &self,
        caller: Identity,
        content_id: u64,
        new_status: ContentStatus,
    ) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock().await;

        self.authorize(Role::Moderator, caller).await?;

        let mut content = self.load_content(content_id).await?;
        if !content.is_active {
            return Err(RegistryError::ContentInactive(content_id));
        }

        content.status = new_status;
        if new_status == ContentStatus::Removed {
            content.is_active = false;
        }
        self.store.update_content(content).await?;

        self.publish(RegistryEvent::ContentModerated {
            content_id,
            new_status,
            moderator: caller,
        });

        Ok(())
    }

    pub async fn add_moderator(
        &self,
        caller: Identity,
        address: Identity,
    ) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock().await;

        self.authorize(Role::Owner, caller).await?;

        if address == ZERO_IDENTITY {
            return Err(RegistryError::InvalidAddress);
        }
        if self.store.is_moderator(address).await? {
            return Err(RegistryError::AlreadyModerator(address));
        }

        self.store.set_moderator(address, true).await?;
        self.publish(RegistryEvent::ModeratorAdded { moderator: address });

        Ok(())
    }

    pub async fn remove_moderator(
        &self,
        caller: Identity,
        address: Identity,
    ) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock().await;

        self.authorize(Role::Owner, caller).await?;

        if address == self.owner {
            return Err(RegistryError::CannotRemoveOwner);
        }
        if !self.store.is_moderator(address).await? {
            return Err(RegistryError::NotAModerator(address));
        }

        self.store.set_moderator(address, false).await?;
        self.publish(RegistryEvent::ModeratorRemoved { moderator: address });

        Ok(())
    }

    pub async fn get_content(&self, content_id: u64) -> Result<Content, RegistryError> {
        self.load_content(content_id).await
    }

    pub async fn get_report(&self, report_id: u64) -> Result<Report, RegistryError> {
        if report_id == 0 {
            return Err(RegistryError::ReportNotFound(report_id));
        }
        self.store
            .get_report(report_id)
            .await?
            .ok_or(RegistryError::ReportNotFound(report_id))
    }

    /// True while the content is `UnderReview` or `Flagged`.
    pub async fn needs_moderation(&self, content_id: u64) -> Result<bool, RegistryError> {
        let content = self.load_content(content_id).await?;
        Ok(content.status.needs_moderation())
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub async fn is_moderator(&self, identity: Identity) -> Result<bool, RegistryError> {
        if identity == self.owner {
            return Ok(true);
        }
        self.store.is_moderator(identity).await
    }

    pub async fn moderators(&self) -> Result<Vec<Identity>, RegistryError> {
        self.store.list_moderators().await
    }

    pub async fn content_count(&self) -> Result<u64, RegistryError> {
        self.store.content_count().await
    }

    pub async fn report_count(&self) -> Result<u64, RegistryError> {
        self.store.report_count().await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::registry::InMemoryRegistryStore;
    use std::sync::Arc;
    use tokio::sync::broadcast::error::TryRecvError;

    const OWNER: Identity = 1;
    const AUTHOR: Identity = 10;
    const MODERATOR: Identity = 20;

    async fn deploy() -> ModerationRegistry<InMemoryRegistryStore> {
        ModerationRegistry::deploy(InMemoryRegistryStore::new(), OWNER)
            .await
            .unwrap()
    }

    #[test]
    fn test_authorization_predicate() {
        assert!(is_authorized(Role::Owner, OWNER, OWNER, true));
        assert!(!is_authorized(Role::Owner, MODERATOR, OWNER, true));
        assert!(is_authorized(Role::Moderator, OWNER, OWNER, false));
        assert!(is_authorized(Role::Moderator, MODERATOR, OWNER, true));
        assert!(!is_authorized(Role::Moderator, AUTHOR, OWNER, false));
    }

    #[tokio::test]
    async fn test_deploy_makes_owner_a_moderator() {
        let registry = deploy().await;

        assert_eq!(registry.owner(), OWNER);
        assert!(registry.is_moderator(OWNER).await.unwrap());
        assert_eq!(registry.moderators().await.unwrap(), vec![OWNER]);
    }

    #[tokio::test]
    async fn test_deploy_rejects_zero_owner() {
        let err = ModerationRegistry::deploy(InMemoryRegistryStore::new(), ZERO_IDENTITY)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::InvalidAddress));
    }

    #[tokio::test]
    async fn test_content_ids_are_sequential() {
        let registry = deploy().await;

        for expected in 1..=5u64 {
            let id = registry
                .submit_content(AUTHOR, &format!("Qm{}", expected))
                .await
                .unwrap();
            assert_eq!(id, expected);
        }
        assert_eq!(registry.content_count().await.unwrap(), 5);

        let content = registry.get_content(3).await.unwrap();
        assert_eq!(content.author, AUTHOR);
        assert_eq!(content.content_hash, "Qm3");
        assert_eq!(content.status, ContentStatus::Active);
        assert!(content.is_active);
        assert_eq!(content.report_count, 0);
    }

    #[tokio::test]
    async fn test_empty_hash_rejected() {
        let registry = deploy().await;

        let err = registry.submit_content(AUTHOR, "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(registry.content_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_lookups() {
        let registry = deploy().await;
        registry.submit_content(AUTHOR, "QmAbc").await.unwrap();

        for id in [0, 2] {
            assert_eq!(
                registry.get_content(id).await.unwrap_err().kind(),
                ErrorKind::NotFound
            );
            assert_eq!(
                registry.needs_moderation(id).await.unwrap_err().kind(),
                ErrorKind::NotFound
            );
        }
        assert!(matches!(
            registry.get_report(1).await.unwrap_err(),
            RegistryError::ReportNotFound(1)
        ));
    }

    #[tokio::test]
    async fn test_report_preconditions_in_order() {
        let registry = deploy().await;
        let id = registry.submit_content(AUTHOR, "QmAbc").await.unwrap();

        assert!(matches!(
            registry.report_content(100, 99, "spam").await.unwrap_err(),
            RegistryError::ContentNotFound(99)
        ));

        // Self-report is rejected before the empty-reason check
        assert!(matches!(
            registry.report_content(AUTHOR, id, "").await.unwrap_err(),
            RegistryError::CannotReportOwnContent
        ));

        assert!(matches!(
            registry.report_content(100, id, "").await.unwrap_err(),
            RegistryError::EmptyReason
        ));

        let report_id = registry.report_content(100, id, "spam").await.unwrap();
        assert_eq!(report_id, 1);

        let err = registry
            .report_content(100, id, "still spam")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyReported));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let report = registry.get_report(report_id).await.unwrap();
        assert_eq!(report.content_id, id);
        assert_eq!(report.reporter, 100);
        assert_eq!(report.reason, "spam");
        assert!(!report.is_processed);
        assert_eq!(registry.get_content(id).await.unwrap().report_count, 1);
    }

    #[tokio::test]
    async fn test_threshold_moves_content_under_review_once() {
        let registry = deploy().await;
        let id = registry.submit_content(AUTHOR, "QmAbc").await.unwrap();

        for reporter in 100..102 {
            registry.report_content(reporter, id, "spam").await.unwrap();
        }
        let content = registry.get_content(id).await.unwrap();
        assert_eq!(content.status, ContentStatus::Active);
        assert!(!registry.needs_moderation(id).await.unwrap());

        registry.report_content(102, id, "spam").await.unwrap();
        let content = registry.get_content(id).await.unwrap();
        assert_eq!(content.status, ContentStatus::UnderReview);
        assert_eq!(content.report_count, 3);
        assert!(registry.needs_moderation(id).await.unwrap());

        registry.report_content(103, id, "spam").await.unwrap();
        let content = registry.get_content(id).await.unwrap();
        assert_eq!(content.status, ContentStatus::UnderReview);
        assert_eq!(content.report_count, 4);
    }

    #[tokio::test]
    async fn test_content_returned_to_active_escalates_on_next_report() {
        let registry = deploy().await;
        let id = registry.submit_content(AUTHOR, "QmAbc").await.unwrap();

        for reporter in 100..103 {
            registry.report_content(reporter, id, "spam").await.unwrap();
        }
        assert_eq!(
            registry.get_content(id).await.unwrap().status,
            ContentStatus::UnderReview
        );

        registry
            .moderate_content(OWNER, id, ContentStatus::Active)
            .await
            .unwrap();
        assert!(!registry.needs_moderation(id).await.unwrap());

        // Already past the threshold, so one more report is enough
        registry.report_content(103, id, "spam").await.unwrap();
        let content = registry.get_content(id).await.unwrap();
        assert_eq!(content.status, ContentStatus::UnderReview);
        assert_eq!(content.report_count, 4);
        assert!(registry.needs_moderation(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_reports_on_flagged_content_keep_status() {
        let registry = deploy().await;
        let id = registry.submit_content(AUTHOR, "QmAbc").await.unwrap();
        registry
            .moderate_content(OWNER, id, ContentStatus::Flagged)
            .await
            .unwrap();

        for reporter in 100..104 {
            registry.report_content(reporter, id, "spam").await.unwrap();
        }

        let content = registry.get_content(id).await.unwrap();
        assert_eq!(content.status, ContentStatus::Flagged);
        assert_eq!(content.report_count, 4);
    }

    #[tokio::test]
    async fn test_moderation_requires_moderator() {
        let registry = deploy().await;
        let id = registry.submit_content(AUTHOR, "QmAbc").await.unwrap();

        let err = registry
            .moderate_content(MODERATOR, id, ContentStatus::Flagged)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        registry.add_moderator(OWNER, MODERATOR).await.unwrap();
        registry
            .moderate_content(MODERATOR, id, ContentStatus::Flagged)
            .await
            .unwrap();
        assert!(registry.needs_moderation(id).await.unwrap());

        // Any status is accepted while the content is active
        registry
            .moderate_content(MODERATOR, id, ContentStatus::Active)
            .await
            .unwrap();
        assert_eq!(
            registry.get_content(id).await.unwrap().status,
            ContentStatus::Active
        );
    }

    #[tokio::test]
    async fn test_removal_is_terminal() {
        let registry = deploy().await;
        let id = registry.submit_content(AUTHOR, "QmAbc").await.unwrap();

        registry
            .moderate_content(OWNER, id, ContentStatus::Removed)
            .await
            .unwrap();

        let content = registry.get_content(id).await.unwrap();
        assert!(!content.is_active);
        assert_eq!(content.status, ContentStatus::Removed);
        assert!(!registry.needs_moderation(id).await.unwrap());

        assert!(matches!(
            registry.report_content(100, id, "spam").await.unwrap_err(),
            RegistryError::ContentInactive(_)
        ));
        assert!(matches!(
            registry
                .moderate_content(OWNER, id, ContentStatus::Active)
                .await
                .unwrap_err(),
            RegistryError::ContentInactive(_)
        ));
    }

    #[tokio::test]
    async fn test_moderator_management() {
        let registry = deploy().await;

        assert_eq!(
            registry
                .add_moderator(MODERATOR, 30)
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::Unauthorized
        );
        assert!(matches!(
            registry.add_moderator(OWNER, ZERO_IDENTITY).await.unwrap_err(),
            RegistryError::InvalidAddress
        ));

        registry.add_moderator(OWNER, MODERATOR).await.unwrap();
        assert!(matches!(
            registry.add_moderator(OWNER, MODERATOR).await.unwrap_err(),
            RegistryError::AlreadyModerator(MODERATOR)
        ));

        // Moderators cannot manage the set
        assert!(matches!(
            registry.remove_moderator(MODERATOR, MODERATOR).await.unwrap_err(),
            RegistryError::NotOwner
        ));

        registry.remove_moderator(OWNER, MODERATOR).await.unwrap();
        assert!(!registry.is_moderator(MODERATOR).await.unwrap());
        assert!(matches!(
            registry.remove_moderator(OWNER, MODERATOR).await.unwrap_err(),
            RegistryError::NotAModerator(MODERATOR)
        ));
    }

    #[tokio::test]
    async fn test_owner_cannot_be_removed() {
        let registry = deploy().await;

        let err = registry.remove_moderator(OWNER, OWNER).await.unwrap_err();
        assert!(matches!(err, RegistryError::CannotRemoveOwner));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(registry.is_moderator(OWNER).await.unwrap());
    }

    /// A store that was already deployed by OWNER, as it looks after a restart.
    async fn deployed_store() -> InMemoryRegistryStore {
        let store = InMemoryRegistryStore::new();
        store.set_owner(OWNER).await.unwrap();
        store.set_moderator(OWNER, true).await.unwrap();
        store.set_moderator(MODERATOR, true).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_redeploy_checks_owner() {
        let registry = ModerationRegistry::deploy(deployed_store().await, OWNER)
            .await
            .unwrap();
        assert_eq!(registry.moderators().await.unwrap(), vec![OWNER, MODERATOR]);

        let err = ModerationRegistry::deploy(deployed_store().await, 2)
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RegistryError::OwnerMismatch {
                stored: OWNER,
                requested: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_boxed_store_backs_a_registry() {
        let store: Box<dyn RegistryStore> = Box::new(InMemoryRegistryStore::new());
        let registry = ModerationRegistry::deploy(store, OWNER).await.unwrap();

        assert_eq!(registry.submit_content(AUTHOR, "QmAbc").await.unwrap(), 1);
        assert_eq!(registry.submit_content(AUTHOR, "QmDef").await.unwrap(), 2);
        assert!(registry.is_moderator(OWNER).await.unwrap());
    }

    #[tokio::test]
    async fn test_events_match_operations() {
        let registry = deploy().await;
        let mut events = registry.subscribe();

        let id = registry.submit_content(AUTHOR, "QmAbc").await.unwrap();
        registry.add_moderator(OWNER, MODERATOR).await.unwrap();
        registry.report_content(100, id, "spam").await.unwrap();
        registry
            .moderate_content(MODERATOR, id, ContentStatus::Flagged)
            .await
            .unwrap();
        registry.remove_moderator(OWNER, MODERATOR).await.unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::ContentSubmitted {
                content_id: id,
                author: AUTHOR,
                content_hash: "QmAbc".to_string(),
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::ModeratorAdded {
                moderator: MODERATOR
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::ContentReported {
                content_id: id,
                reporter: 100,
                reason: "spam".to_string(),
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::ContentModerated {
                content_id: id,
                new_status: ContentStatus::Flagged,
                moderator: MODERATOR,
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::ModeratorRemoved {
                moderator: MODERATOR
            }
        );
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_failed_operations_emit_nothing() {
        let registry = deploy().await;
        let id = registry.submit_content(AUTHOR, "QmAbc").await.unwrap();
        let mut events = registry.subscribe();

        assert!(registry.submit_content(AUTHOR, "").await.is_err());
        assert!(registry.report_content(AUTHOR, id, "mine").await.is_err());
        assert!(registry
            .moderate_content(AUTHOR, id, ContentStatus::Removed)
            .await
            .is_err());
        assert!(registry.remove_moderator(OWNER, OWNER).await.is_err());

        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
        let content = registry.get_content(id).await.unwrap();
        assert_eq!(content.report_count, 0);
        assert!(content.is_active);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_get_unique_ids() {
        let registry = Arc::new(deploy().await);

        let mut handles = Vec::new();
        for i in 0..32u64 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry
                    .submit_content(AUTHOR + i, &format!("Qm{}", i))
                    .await
                    .unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_full_moderation_scenario() {
        let registry = deploy().await;

        let id = registry.submit_content(AUTHOR, "QmAbc").await.unwrap();
        registry.add_moderator(OWNER, MODERATOR).await.unwrap();

        registry
            .report_content(100, id, "misleading")
            .await
            .unwrap();
        registry.report_content(101, id, "spam").await.unwrap();
        registry.report_content(102, id, "offensive").await.unwrap();

        let content = registry.get_content(id).await.unwrap();
        assert_eq!(content.status, ContentStatus::UnderReview);
        assert_eq!(content.report_count, 3);

        registry
            .moderate_content(MODERATOR, id, ContentStatus::Removed)
            .await
            .unwrap();
        assert!(!registry.get_content(id).await.unwrap().is_active);

        assert!(registry.report_content(103, id, "late").await.is_err());
        assert_eq!(registry.report_count().await.unwrap(), 3);
    }
}
