use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::form::wizard::QuoteWizard;

pub const DEFAULT_DRAFT_TTL: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_MAX_DRAFTS: usize = 5_000;

struct Draft {
    wizard: QuoteWizard,
    touched: Instant,
}

/// In-process home of the wizards being filled in, one per draft id.
///
/// Drafts are not persisted: a restart forgets them. A draft untouched for
/// longer than the TTL is gone, and at most `max_drafts` are held at once;
/// creating one more evicts the least recently touched.
pub struct DraftStore {
    drafts: RwLock<HashMap<Uuid, Draft>>,
    ttl: Duration,
    max_drafts: usize,
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_DRAFT_TTL, DEFAULT_MAX_DRAFTS)
    }
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, max_drafts: usize) -> Self {
        DraftStore { drafts: RwLock::new(HashMap::new()), ttl, max_drafts: max_drafts.max(1) }
    }

    fn expired(&self, draft: &Draft) -> bool {
        draft.touched.elapsed() >= self.ttl
    }

    pub async fn create(&self) -> (Uuid, QuoteWizard) {
        let id = Uuid::new_v4();
        let wizard = QuoteWizard::new();

        let mut drafts = self.drafts.write().await;
        let ttl = self.ttl;
        drafts.retain(|_, d| d.touched.elapsed() < ttl);
        while drafts.len() >= self.max_drafts {
            let Some(oldest) = drafts.iter().min_by_key(|(_, d)| d.touched).map(|(k, _)| *k) else {
                break;
            };
            warn!(draft_id = %oldest, "Draft limit reached, evicting least recently used draft");
            drafts.remove(&oldest);
        }
        drafts.insert(id, Draft { wizard: wizard.clone(), touched: Instant::now() });
        debug!(draft_id = %id, "Draft created");
        (id, wizard)
    }

    pub async fn get(&self, id: &Uuid) -> Option<QuoteWizard> {
        let drafts = self.drafts.read().await;
        drafts.get(id).filter(|d| !self.expired(d)).map(|d| d.wizard.clone())
    }

    /// Run `f` against the stored wizard under the write lock.
    pub async fn update<R>(&self, id: &Uuid, f: impl FnOnce(&mut QuoteWizard) -> R) -> Option<R> {
        let mut drafts = self.drafts.write().await;
        if drafts.get(id).is_some_and(|d| self.expired(d)) {
            drafts.remove(id);
            return None;
        }
        let draft = drafts.get_mut(id)?;
        draft.touched = Instant::now();
        Some(f(&mut draft.wizard))
    }

    /// Take the draft out of the store. Only one caller gets it.
    pub async fn remove(&self, id: &Uuid) -> Option<QuoteWizard> {
        let removed = self.drafts.write().await.remove(id)?;
        if self.expired(&removed) {
            return None;
        }
        debug!(draft_id = %id, "Draft removed");
        Some(removed.wizard)
    }

    /// Put a taken draft back under its id.
    pub async fn restore(&self, id: Uuid, wizard: QuoteWizard) {
        self.drafts.write().await.insert(id, Draft { wizard, touched: Instant::now() });
        debug!(draft_id = %id, "Draft restored");
    }

    /// Drop every expired draft and return how many went.
    pub async fn purge_expired(&self) -> usize {
        let mut drafts = self.drafts.write().await;
        let before = drafts.len();
        let ttl = self.ttl;
        drafts.retain(|_, d| d.touched.elapsed() < ttl);
        before - drafts.len()
    }

    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }

    /// Background task purging expired drafts every `every`.
    pub fn spawn_reaper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let purged = self.purge_expired().await;
                if purged > 0 {
                    info!(purged, "Expired form drafts dropped");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::wizard::QuoteAnswers;
    use crate::model::quote_request::ServiceType;

    #[tokio::test]
    async fn test_update_is_visible_to_later_reads() {
        let store = DraftStore::new();
        let (id, _) = store.create().await;
        store
            .update(&id, |w| w.apply(QuoteAnswers { service_type: Some(ServiceType::StorageMove), ..Default::default() }))
            .await
            .unwrap();
        let wizard = store.get(&id).await.unwrap();
        assert_eq!(wizard.answers().service_type, Some(ServiceType::StorageMove));
    }

    #[tokio::test]
    async fn test_unknown_draft() {
        let store = DraftStore::new();
        assert!(store.update(&Uuid::new_v4(), |w| w.step()).await.is_none());
        let (id, _) = store.create().await;
        assert!(store.remove(&id).await.is_some());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_remove_hands_the_draft_out_once() {
        let store = DraftStore::new();
        let (id, wizard) = store.create().await;
        assert!(store.remove(&id).await.is_some());
        assert!(store.remove(&id).await.is_none());

        store.restore(id, wizard).await;
        assert!(store.get(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_expired_drafts_are_invisible_and_purged() {
        let store = DraftStore::with_limits(Duration::ZERO, 10);
        let (id, _) = store.create().await;
        assert!(store.get(&id).await.is_none());
        assert!(store.update(&id, |w| w.step()).await.is_none());
        store.create().await;
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_limit_evicts_least_recently_touched() {
        let store = DraftStore::with_limits(DEFAULT_DRAFT_TTL, 2);
        let (first, _) = store.create().await;
        let (second, _) = store.create().await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        // Touch the first so the second becomes the oldest
        store.update(&first, |_| ()).await.unwrap();
        let (third, _) = store.create().await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(&first).await.is_some());
        assert!(store.get(&second).await.is_none());
        assert!(store.get(&third).await.is_some());
    }
}
