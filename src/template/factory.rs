//! Template repository factory

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::TemplatesConfig;

use super::cached_repository::CachedTemplateRepository;
use super::memory_repository::MemoryTemplateRepository;
use super::postgres_repository::PostgresTemplateRepository;
use super::repository::TemplateRepository;

/// Create a template repository based on configuration.
///
/// Returns the appropriate backend implementation based on the `backend` setting:
/// - `"postgres"`: Returns a `PostgresTemplateRepository` if a PostgreSQL pool is provided
/// - `"memory"` (default): Returns a `MemoryTemplateRepository`
///
/// When `cache_enabled` is set, the backend is wrapped in a
/// `CachedTemplateRepository`.
pub fn create_template_repository(
    settings: &TemplatesConfig,
    postgres_pool: Option<PgPool>,
) -> Arc<dyn TemplateRepository> {
    let backend: Arc<dyn TemplateRepository> = match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL template repository");
                Arc::new(PostgresTemplateRepository::new(pool))
            } else {
                tracing::warn!(
                    "PostgreSQL template backend requested but no pool available, falling back to memory"
                );
                Arc::new(MemoryTemplateRepository::new())
            }
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating in-memory template repository");
            Arc::new(MemoryTemplateRepository::new())
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown template backend, falling back to memory"
            );
            Arc::new(MemoryTemplateRepository::new())
        }
    };

    if settings.cache_enabled {
        tracing::info!("Template read-through cache enabled");
        Arc::new(CachedTemplateRepository::new(backend))
    } else {
        backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend() {
        let settings = TemplatesConfig {
            backend: "memory".to_string(),
            cache_enabled: false,
            ..TemplatesConfig::default()
        };
        assert_eq!(create_template_repository(&settings, None).backend_name(), "memory");
    }

    #[test]
    fn test_postgres_without_pool_falls_back() {
        let settings = TemplatesConfig {
            backend: "postgres".to_string(),
            cache_enabled: true,
            ..TemplatesConfig::default()
        };
        assert_eq!(create_template_repository(&settings, None).backend_name(), "memory");
    }
}
