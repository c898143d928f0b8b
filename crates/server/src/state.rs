use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::store::{ChatbotSettings, InMemoryStore, TenantStore};
use dashmap::DashMap;
use faqbot::{AnswerPipeline, FaqbotConfig, KnowledgeBase};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, std::time::Instant)>>,

    /// Tenant records (keys, website, FAQs, settings, messages)
    pub store: Arc<dyn TenantStore>,

    /// FAQ-first answer pipeline (shared across requests)
    pub pipeline: Arc<AnswerPipeline>,

    /// Prometheus exporter handle when metrics are installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state with an in-memory store seeded from the
    /// configured API keys
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline_config = match &config.pipeline_config {
            Some(path) => {
                tracing::info!(path = %path, "loading pipeline config");
                FaqbotConfig::from_file(path)?
            }
            None => FaqbotConfig::default(),
        };
        let pipeline = pipeline_config.build_pipeline()?;

        let store = InMemoryStore::new();
        for (key, external_id) in &config.api_keys {
            let tenant = store.find_or_create_tenant(external_id)?;
            store.register_api_key(&tenant.id, key)?;
        }

        Ok(Self::with_parts(config, Arc::new(store), pipeline))
    }

    /// Assemble state from an existing store and pipeline
    pub fn with_parts(
        config: ServerConfig,
        store: Arc<dyn TenantStore>,
        pipeline: AnswerPipeline,
    ) -> Self {
        Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            store,
            pipeline: Arc::new(pipeline),
            metrics_handle: None,
        }
    }

    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Resolve an API key to the owning tenant id
    pub fn tenant_for_key(&self, key: &str) -> ServerResult<Option<String>> {
        Ok(self.store.tenant_for_key(key)?)
    }

    /// Check if a key may provision tenants
    pub fn is_admin_key(&self, key: &str) -> bool {
        self.config.admin_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }

    /// Snapshot of the tenant's description and FAQs for one request
    pub fn knowledge_base(&self, tenant_id: &str) -> ServerResult<KnowledgeBase> {
        Ok(KnowledgeBase {
            website_description: self
                .store
                .website_description(tenant_id)?
                .unwrap_or_default(),
            faqs: self.store.list_faqs(tenant_id)?,
        })
    }

    /// Stored settings, or the defaults when the tenant never saved any
    pub fn settings_or_default(&self, tenant_id: &str) -> ServerResult<ChatbotSettings> {
        Ok(self.store.settings(tenant_id)?.unwrap_or_default())
    }
}
