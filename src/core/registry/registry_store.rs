// Storage port for the registry.
//
// The service owns every rule; a store only reads and writes records.
// Ids are dense, so the record counts double as the id counters. That only
// holds while a single registry writes to the store, which is why the
// registry takes its store by value and no shared-handle impl exists.

use super::registry_models::{Content, Identity, Report};
use super::registry_service::RegistryError;
use async_trait::async_trait;

#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// The recorded owner, if the registry has been deployed on this store.
    async fn get_owner(&self) -> Result<Option<Identity>, RegistryError>;

    async fn set_owner(&self, owner: Identity) -> Result<(), RegistryError>;

    /// Number of content records, which is also the highest content id.
    async fn content_count(&self) -> Result<u64, RegistryError>;

    /// Number of reports, which is also the highest report id.
    async fn report_count(&self) -> Result<u64, RegistryError>;

    async fn get_content(&self, content_id: u64) -> Result<Option<Content>, RegistryError>;

    async fn get_report(&self, report_id: u64) -> Result<Option<Report>, RegistryError>;

    async fn has_reported(
        &self,
        content_id: u64,
        reporter: Identity,
    ) -> Result<bool, RegistryError>;

    async fn is_moderator(&self, identity: Identity) -> Result<bool, RegistryError>;

    /// All moderators, sorted ascending.
    async fn list_moderators(&self) -> Result<Vec<Identity>, RegistryError>;

    async fn insert_content(&self, content: Content) -> Result<(), RegistryError>;

    /// Persist a report, mark the reporter and save the updated content.
    /// All three writes land together or not at all.
    async fn record_report(&self, report: Report, content: Content) -> Result<(), RegistryError>;

    async fn update_content(&self, content: Content) -> Result<(), RegistryError>;

    async fn set_moderator(&self, identity: Identity, enabled: bool) -> Result<(), RegistryError>;
}

// Lets the binary pick a backend at startup (`Box<dyn RegistryStore>`).
// A box still has exactly one owner, so the registry stays the sole writer.
#[async_trait]
impl<T: RegistryStore + ?Sized> RegistryStore for Box<T> {
    async fn get_owner(&self) -> Result<Option<Identity>, RegistryError> {
        (**self).get_owner().await
    }

    async fn set_owner(&self, owner: Identity) -> Result<(), RegistryError> {
        (**self).set_owner(owner).await
    }

    async fn content_count(&self) -> Result<u64, RegistryError> {
        (**self).content_count().await
    }

    async fn report_count(&self) -> Result<u64, RegistryError> {
        (**self).report_count().await
    }

    async fn get_content(&self, content_id: u64) -> Result<Option<Content>, RegistryError> {
        (**self).get_content(content_id).await
    }

    async fn get_report(&self, report_id: u64) -> Result<Option<Report>, RegistryError> {
        (**self).get_report(report_id).await
    }

    async fn has_reported(
        &self,
        content_id: u64,
        reporter: Identity,
    ) -> Result<bool, RegistryError> {
        (**self).has_reported(content_id, reporter).await
    }

    async fn is_moderator(&self, identity: Identity) -> Result<bool, RegistryError> {
        (**self).is_moderator(identity).await
    }

    async fn list_moderators(&self) -> Result<Vec<Identity>, RegistryError> {
        (**self).list_moderators().await
    }

    async fn insert_content(&self, content: Content) -> Result<(), RegistryError> {
        (**self).insert_content(content).await
    }

    async fn record_report(&self, report: Report, content: Content) -> Result<(), RegistryError> {
        (**self).record_report(report, content).await
    }

    async fn update_content(&self, content: Content) -> Result<(), RegistryError> {
        (**self).update_content(content).await
    }

    async fn set_moderator(&self, identity: Identity, enabled: bool) -> Result<(), RegistryError> {
        (**self).set_moderator(identity, enabled).await
    }
}
