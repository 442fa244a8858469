//! Read-through cache in front of another template repository.
//!
//! Lookups by (application, code) are served from a `DashMap` after the first
//! hit on the inner repository. Writes go to the inner repository first and
//! then invalidate the affected key. Misses are not cached.
//!
//! Every key keeps a generation stamp. Writers stamp the key with a fresh
//! generation when they invalidate it, and a reader only fills the cache if
//! the stamp it saw before going to the inner repository is still current.
//! A lookup that raced with a delete or insert therefore never re-populates
//! the key with the template it read before the write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::enums::Application;
use super::repository::{RepositoryError, TemplateRepository};
use super::types::Template;
use crate::metrics::{TEMPLATE_CACHE_HITS_TOTAL, TEMPLATE_CACHE_MISSES_TOTAL};

type CacheKey = (Application, String);

#[derive(Debug, Default)]
struct CacheSlot {
    /// Stamp of the last write to this key, 0 if never written through us
    generation: u64,
    template: Option<Template>,
}

pub struct CachedTemplateRepository {
    inner: Arc<dyn TemplateRepository>,
    cache: DashMap<CacheKey, CacheSlot>,
    generations: AtomicU64,
}

impl CachedTemplateRepository {
    pub fn new(inner: Arc<dyn TemplateRepository>) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            generations: AtomicU64::new(0),
        }
    }

    /// Number of cached templates
    pub fn cached(&self) -> usize {
        self.cache
            .iter()
            .filter(|slot| slot.template.is_some())
            .count()
    }

    /// Drop every cached template. Generation stamps are kept.
    pub fn clear(&self) {
        for mut slot in self.cache.iter_mut() {
            slot.template = None;
        }
    }

    fn invalidate(&self, key: CacheKey) {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let mut slot = self.cache.entry(key).or_default();
        slot.generation = generation;
        slot.template = None;
    }

    /// Store `template` unless the key was written since `seen` was read.
    fn fill(&self, key: CacheKey, seen: u64, template: &Template) {
        match self.cache.entry(key) {
            Entry::Occupied(mut entry) => {
                if entry.get().generation == seen {
                    entry.get_mut().template = Some(template.clone());
                }
            }
            Entry::Vacant(entry) => {
                if seen == 0 {
                    entry.insert(CacheSlot {
                        generation: 0,
                        template: Some(template.clone()),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl TemplateRepository for CachedTemplateRepository {
    async fn insert(&self, template: Template) -> Result<Template, RepositoryError> {
        let created = self.inner.insert(template).await?;
        self.invalidate((created.application, created.code.clone()));
        Ok(created)
    }

    async fn find_by_app_and_code(
        &self,
        application: Application,
        code: &str,
    ) -> Result<Option<Template>, RepositoryError> {
        let key = (application, code.to_string());

        let seen = match self.cache.get(&key) {
            Some(slot) => match slot.template {
                Some(ref hit) => {
                    TEMPLATE_CACHE_HITS_TOTAL.inc();
                    return Ok(Some(hit.clone()));
                }
                None => slot.generation,
            },
            None => 0,
        };

        TEMPLATE_CACHE_MISSES_TOTAL.inc();
        let found = self.inner.find_by_app_and_code(application, code).await?;
        if let Some(ref template) = found {
            self.fill(key, seen, template);
        }
        Ok(found)
    }

    async fn list(
        &self,
        application: Option<Application>,
    ) -> Result<Vec<Template>, RepositoryError> {
        self.inner.list(application).await
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Template>, RepositoryError> {
        let deleted = self.inner.delete(id).await?;
        if let Some(ref template) = deleted {
            self.invalidate((template.application, template.code.clone()));
        }
        Ok(deleted)
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::enums::{FieldType, Language};
    use crate::template::memory_repository::MemoryTemplateRepository;
    use crate::template::types::{CreateContentRequest, CreateFieldRequest, CreateTemplateRequest};
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Notify;

    /// Memory repository whose next lookup stops after reading, until resumed.
    struct PausingRepository {
        inner: MemoryTemplateRepository,
        pause_next: AtomicBool,
        paused: Notify,
        resume: Notify,
    }

    impl PausingRepository {
        fn new() -> Self {
            Self {
                inner: MemoryTemplateRepository::new(),
                pause_next: AtomicBool::new(false),
                paused: Notify::new(),
                resume: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl TemplateRepository for PausingRepository {
        async fn insert(&self, template: Template) -> Result<Template, RepositoryError> {
            self.inner.insert(template).await
        }

        async fn find_by_app_and_code(
            &self,
            application: Application,
            code: &str,
        ) -> Result<Option<Template>, RepositoryError> {
            let found = self.inner.find_by_app_and_code(application, code).await;
            if self.pause_next.swap(false, Ordering::SeqCst) {
                self.paused.notify_one();
                self.resume.notified().await;
            }
            found
        }

        async fn list(
            &self,
            application: Option<Application>,
        ) -> Result<Vec<Template>, RepositoryError> {
            self.inner.list(application).await
        }

        async fn delete(&self, id: Uuid) -> Result<Option<Template>, RepositoryError> {
            self.inner.delete(id).await
        }

        fn backend_name(&self) -> &'static str {
            "pausing"
        }
    }

    fn template(code: &str) -> Template {
        CreateTemplateRequest {
            application: Application::UniqueLoginSystem,
            code: code.to_string(),
            fields: vec![CreateFieldRequest {
                field: "token".to_string(),
                description: "Reset token".to_string(),
                field_type: FieldType::String,
            }],
            contents: vec![CreateContentRequest {
                language: Language::En,
                subject: "Reset".to_string(),
                content: "<p>{{token}}</p>".to_string(),
            }],
        }
        .into()
    }

    #[tokio::test]
    async fn test_read_through() {
        let inner = Arc::new(MemoryTemplateRepository::new());
        let repo = CachedTemplateRepository::new(inner.clone());
        repo.insert(template("reset.password")).await.unwrap();
        assert_eq!(repo.cached(), 0);

        let first = repo
            .find_by_app_and_code(Application::UniqueLoginSystem, "reset.password")
            .await
            .unwrap();
        assert!(first.is_some());
        assert_eq!(repo.cached(), 1);

        let second = repo
            .find_by_app_and_code(Application::UniqueLoginSystem, "reset.password")
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let repo = CachedTemplateRepository::new(Arc::new(MemoryTemplateRepository::new()));
        let found = repo
            .find_by_app_and_code(Application::UniqueLoginSystem, "missing")
            .await
            .unwrap();
        assert!(found.is_none());
        assert_eq!(repo.cached(), 0);
    }

    #[tokio::test]
    async fn test_delete_invalidates() {
        let repo = CachedTemplateRepository::new(Arc::new(MemoryTemplateRepository::new()));
        let created = repo.insert(template("gone.soon")).await.unwrap();
        repo.find_by_app_and_code(Application::UniqueLoginSystem, "gone.soon")
            .await
            .unwrap();
        assert_eq!(repo.cached(), 1);

        repo.delete(created.id).await.unwrap();
        assert_eq!(repo.cached(), 0);
        let found = repo
            .find_by_app_and_code(Application::UniqueLoginSystem, "gone.soon")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_lookup_racing_delete_does_not_refill() {
        let inner = Arc::new(PausingRepository::new());
        let repo = Arc::new(CachedTemplateRepository::new(inner.clone()));
        let created = repo.insert(template("raced.delete")).await.unwrap();

        inner.pause_next.store(true, Ordering::SeqCst);
        let reader = {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.find_by_app_and_code(Application::UniqueLoginSystem, "raced.delete")
                    .await
                    .unwrap()
            })
        };

        // The reader holds the template it read before the delete
        inner.paused.notified().await;
        repo.delete(created.id).await.unwrap();
        inner.resume.notify_one();

        assert!(reader.await.unwrap().is_some());
        assert_eq!(repo.cached(), 0);
        let found = repo
            .find_by_app_and_code(Application::UniqueLoginSystem, "raced.delete")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_lookup_racing_reinsert_serves_new_template() {
        let inner = Arc::new(PausingRepository::new());
        let repo = Arc::new(CachedTemplateRepository::new(inner.clone()));
        let old = repo.insert(template("raced.insert")).await.unwrap();

        inner.pause_next.store(true, Ordering::SeqCst);
        let reader = {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.find_by_app_and_code(Application::UniqueLoginSystem, "raced.insert")
                    .await
                    .unwrap()
            })
        };

        inner.paused.notified().await;
        repo.delete(old.id).await.unwrap();
        let new = repo.insert(template("raced.insert")).await.unwrap();
        inner.resume.notify_one();

        assert_eq!(reader.await.unwrap().map(|t| t.id), Some(old.id));
        let found = repo
            .find_by_app_and_code(Application::UniqueLoginSystem, "raced.insert")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, new.id);
        assert_eq!(repo.cached(), 1);
    }

    #[tokio::test]
    async fn test_clear_keeps_working() {
        let repo = CachedTemplateRepository::new(Arc::new(MemoryTemplateRepository::new()));
        repo.insert(template("cleared")).await.unwrap();
        repo.find_by_app_and_code(Application::UniqueLoginSystem, "cleared")
            .await
            .unwrap();
        assert_eq!(repo.cached(), 1);

        repo.clear();
        assert_eq!(repo.cached(), 0);
        let found = repo
            .find_by_app_and_code(Application::UniqueLoginSystem, "cleared")
            .await
            .unwrap();
        assert!(found.is_some());
        assert_eq!(repo.cached(), 1);
    }
}
