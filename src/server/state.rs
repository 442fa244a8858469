use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::email::{EmailService, Mailer};
use crate::postgres::PostgresPool;
use crate::template::{TemplateRepository, TemplateService};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub templates: Arc<TemplateService>,
    pub email: Arc<EmailService>,
    /// Present when the postgres template backend is configured
    pub postgres_pool: Option<PostgresPool>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        settings: Settings,
        repository: Arc<dyn TemplateRepository>,
        mailer: Arc<dyn Mailer>,
        postgres_pool: Option<PostgresPool>,
    ) -> Self {
        let templates = Arc::new(TemplateService::new(repository.clone()));
        let email = Arc::new(EmailService::new(repository, mailer, &settings.templates));

        Self {
            settings: Arc::new(settings),
            templates,
            email,
            postgres_pool,
            start_time: Instant::now(),
        }
    }
}
