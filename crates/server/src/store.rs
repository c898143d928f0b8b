//! Tenant persistence.
//!
//! Handlers only talk to [`TenantStore`]; [`InMemoryStore`] backs it with
//! `DashMap`s keyed by tenant id. Every FAQ, settings and message operation is
//! scoped by the caller's tenant id, so one tenant can never read or modify
//! another tenant's records.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use faqbot::{ChatRole, FaqEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("tenant {0} does not exist")]
    UnknownTenant(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    pub id: String,
    /// Identifier from the identity provider that owns this tenant.
    pub external_id: String,
    pub created_at: DateTime<Utc>,
}

/// Side of the page the widget docks to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WidgetPosition {
    Left,
    #[default]
    Right,
}

impl WidgetPosition {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(WidgetPosition::Left),
            "right" => Some(WidgetPosition::Right),
            _ => None,
        }
    }
}

/// Widget appearance plus the AI toggle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatbotSettings {
    pub name: String,
    pub color: String,
    pub greeting: String,
    pub position: WidgetPosition,
    pub ai_mode: bool,
}

impl Default for ChatbotSettings {
    fn default() -> Self {
        Self {
            name: "AI Assistant".to_string(),
            color: "#3b82f6".to_string(),
            greeting: "Hello! How can I help you today?".to_string(),
            position: WidgetPosition::Right,
            ai_mode: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Tenant-scoped persistence used by the HTTP handlers.
pub trait TenantStore: Send + Sync {
    /// Cheap liveness probe for readiness checks.
    fn ping(&self) -> StoreResult<()>;

    fn find_or_create_tenant(&self, external_id: &str) -> StoreResult<Tenant>;
    fn get_tenant(&self, tenant_id: &str) -> StoreResult<Option<Tenant>>;

    /// Tenant owning `key`, if the key is active.
    fn tenant_for_key(&self, key: &str) -> StoreResult<Option<String>>;
    fn api_key_for_tenant(&self, tenant_id: &str) -> StoreResult<Option<String>>;
    /// Make `key` the tenant's only active key.
    fn replace_api_key(&self, tenant_id: &str, key: &str) -> StoreResult<()>;

    fn website_description(&self, tenant_id: &str) -> StoreResult<Option<String>>;
    fn put_website_description(&self, tenant_id: &str, description: &str) -> StoreResult<()>;

    /// FAQs in insertion order.
    fn list_faqs(&self, tenant_id: &str) -> StoreResult<Vec<FaqEntry>>;
    fn create_faq(&self, tenant_id: &str, question: &str, answer: &str) -> StoreResult<FaqEntry>;
    /// Returns `None` when the tenant has no FAQ with that id.
    fn update_faq(
        &self,
        tenant_id: &str,
        faq_id: &str,
        question: &str,
        answer: &str,
    ) -> StoreResult<Option<FaqEntry>>;
    /// Returns `false` when the tenant has no FAQ with that id.
    fn delete_faq(&self, tenant_id: &str, faq_id: &str) -> StoreResult<bool>;

    fn settings(&self, tenant_id: &str) -> StoreResult<Option<ChatbotSettings>>;
    fn put_settings(&self, tenant_id: &str, settings: &ChatbotSettings) -> StoreResult<()>;

    fn append_messages(&self, tenant_id: &str, messages: Vec<StoredMessage>) -> StoreResult<()>;
    fn count_messages(&self, tenant_id: &str) -> StoreResult<usize>;
    fn messages_since(&self, tenant_id: &str, since: DateTime<Utc>)
        -> StoreResult<Vec<StoredMessage>>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tenants: DashMap<String, Tenant>,
    tenants_by_external: DashMap<String, String>,
    keys: DashMap<String, String>,
    websites: DashMap<String, String>,
    faqs: DashMap<String, Vec<FaqEntry>>,
    settings: DashMap<String, ChatbotSettings>,
    messages: DashMap<String, Vec<StoredMessage>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate an extra key for a tenant without revoking existing ones.
    /// Used to seed keys from configuration.
    pub fn register_api_key(&self, tenant_id: &str, key: &str) -> StoreResult<()> {
        self.require_tenant(tenant_id)?;
        self.keys.insert(key.to_string(), tenant_id.to_string());
        Ok(())
    }

    fn require_tenant(&self, tenant_id: &str) -> StoreResult<()> {
        if self.tenants.contains_key(tenant_id) {
            Ok(())
        } else {
            Err(StoreError::UnknownTenant(tenant_id.to_string()))
        }
    }
}

impl TenantStore for InMemoryStore {
    fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn find_or_create_tenant(&self, external_id: &str) -> StoreResult<Tenant> {
        let tenant_id = self
            .tenants_by_external
            .entry(external_id.to_string())
            .or_insert_with(|| {
                let tenant = Tenant {
                    id: uuid::Uuid::new_v4().to_string(),
                    external_id: external_id.to_string(),
                    created_at: Utc::now(),
                };
                let id = tenant.id.clone();
                self.tenants.insert(id.clone(), tenant);
                tracing::info!(tenant_id = %id, external_id, "tenant created");
                id
            })
            .clone();

        self.tenants
            .get(&tenant_id)
            .map(|t| t.clone())
            .ok_or(StoreError::UnknownTenant(tenant_id))
    }

    fn get_tenant(&self, tenant_id: &str) -> StoreResult<Option<Tenant>> {
        Ok(self.tenants.get(tenant_id).map(|t| t.clone()))
    }

    fn tenant_for_key(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.keys.get(key).map(|t| t.clone()))
    }

    fn api_key_for_tenant(&self, tenant_id: &str) -> StoreResult<Option<String>> {
        Ok(self
            .keys
            .iter()
            .find(|entry| entry.value() == tenant_id)
            .map(|entry| entry.key().clone()))
    }

    fn replace_api_key(&self, tenant_id: &str, key: &str) -> StoreResult<()> {
        self.require_tenant(tenant_id)?;
        self.keys.retain(|_, owner| owner.as_str() != tenant_id);
        self.keys.insert(key.to_string(), tenant_id.to_string());
        Ok(())
    }

    fn website_description(&self, tenant_id: &str) -> StoreResult<Option<String>> {
        Ok(self.websites.get(tenant_id).map(|d| d.clone()))
    }

    fn put_website_description(&self, tenant_id: &str, description: &str) -> StoreResult<()> {
        self.require_tenant(tenant_id)?;
        self.websites
            .insert(tenant_id.to_string(), description.to_string());
        Ok(())
    }

    fn list_faqs(&self, tenant_id: &str) -> StoreResult<Vec<FaqEntry>> {
        Ok(self
            .faqs
            .get(tenant_id)
            .map(|faqs| faqs.clone())
            .unwrap_or_default())
    }

    fn create_faq(&self, tenant_id: &str, question: &str, answer: &str) -> StoreResult<FaqEntry> {
        self.require_tenant(tenant_id)?;
        let entry = FaqEntry::new(uuid::Uuid::new_v4().to_string(), question, answer);
        self.faqs
            .entry(tenant_id.to_string())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    fn update_faq(
        &self,
        tenant_id: &str,
        faq_id: &str,
        question: &str,
        answer: &str,
    ) -> StoreResult<Option<FaqEntry>> {
        let Some(mut faqs) = self.faqs.get_mut(tenant_id) else {
            return Ok(None);
        };
        let updated = faqs.iter_mut().find(|faq| faq.id == faq_id).map(|faq| {
            faq.question = question.to_string();
            faq.answer = answer.to_string();
            faq.clone()
        });
        Ok(updated)
    }

    fn delete_faq(&self, tenant_id: &str, faq_id: &str) -> StoreResult<bool> {
        let Some(mut faqs) = self.faqs.get_mut(tenant_id) else {
            return Ok(false);
        };
        let before = faqs.len();
        faqs.retain(|faq| faq.id != faq_id);
        Ok(faqs.len() != before)
    }

    fn settings(&self, tenant_id: &str) -> StoreResult<Option<ChatbotSettings>> {
        Ok(self.settings.get(tenant_id).map(|s| s.clone()))
    }

    fn put_settings(&self, tenant_id: &str, settings: &ChatbotSettings) -> StoreResult<()> {
        self.require_tenant(tenant_id)?;
        self.settings
            .insert(tenant_id.to_string(), settings.clone());
        Ok(())
    }

    fn append_messages(&self, tenant_id: &str, messages: Vec<StoredMessage>) -> StoreResult<()> {
        self.require_tenant(tenant_id)?;
        self.messages
            .entry(tenant_id.to_string())
            .or_default()
            .extend(messages);
        Ok(())
    }

    fn count_messages(&self, tenant_id: &str) -> StoreResult<usize> {
        Ok(self.messages.get(tenant_id).map_or(0, |m| m.len()))
    }

    fn messages_since(
        &self,
        tenant_id: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<StoredMessage>> {
        Ok(self
            .messages
            .get(tenant_id)
            .map(|messages| {
                messages
                    .iter()
                    .filter(|m| m.created_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store_with_tenant() -> (InMemoryStore, String) {
        let store = InMemoryStore::new();
        let tenant = store.find_or_create_tenant("user_1").unwrap();
        (store, tenant.id)
    }

    #[test]
    fn find_or_create_is_idempotent() {
        let store = InMemoryStore::new();
        let a = store.find_or_create_tenant("user_1").unwrap();
        let b = store.find_or_create_tenant("user_1").unwrap();
        let c = store.find_or_create_tenant("user_2").unwrap();
        assert_eq!(a, b);
        assert_ne!(a.id, c.id);
        assert_eq!(store.get_tenant(&a.id).unwrap(), Some(a));
    }

    #[test]
    fn replace_api_key_revokes_older_keys() {
        let (store, tenant) = store_with_tenant();
        store.register_api_key(&tenant, "seed-a").unwrap();
        store.register_api_key(&tenant, "seed-b").unwrap();
        store.replace_api_key(&tenant, "dlg_new").unwrap();

        assert_eq!(store.tenant_for_key("seed-a").unwrap(), None);
        assert_eq!(store.tenant_for_key("seed-b").unwrap(), None);
        assert_eq!(store.tenant_for_key("dlg_new").unwrap(), Some(tenant.clone()));
        assert_eq!(store.api_key_for_tenant(&tenant).unwrap().as_deref(), Some("dlg_new"));
    }

    #[test]
    fn replace_api_key_leaves_other_tenants_alone() {
        let (store, tenant) = store_with_tenant();
        let other = store.find_or_create_tenant("user_2").unwrap().id;
        store.replace_api_key(&other, "other-key").unwrap();
        store.replace_api_key(&tenant, "mine").unwrap();
        assert_eq!(store.tenant_for_key("other-key").unwrap(), Some(other));
    }

    #[test]
    fn unknown_tenant_writes_fail() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.create_faq("ghost", "q", "a"),
            Err(StoreError::UnknownTenant("ghost".into()))
        );
        assert!(store.replace_api_key("ghost", "k").is_err());
    }

    #[test]
    fn faqs_keep_insertion_order_and_ownership() {
        let (store, tenant) = store_with_tenant();
        let other = store.find_or_create_tenant("user_2").unwrap().id;

        let first = store.create_faq(&tenant, "first?", "1").unwrap();
        let second = store.create_faq(&tenant, "second?", "2").unwrap();
        let ids: Vec<_> = store
            .list_faqs(&tenant)
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![first.id.clone(), second.id.clone()]);

        assert_eq!(store.update_faq(&other, &first.id, "x", "y").unwrap(), None);
        assert!(!store.delete_faq(&other, &first.id).unwrap());

        let updated = store
            .update_faq(&tenant, &first.id, "first, edited?", "1b")
            .unwrap()
            .expect("owned faq");
        assert_eq!(updated.question, "first, edited?");
        assert!(store.delete_faq(&tenant, &second.id).unwrap());
        assert_eq!(store.list_faqs(&tenant).unwrap().len(), 1);
    }

    #[test]
    fn messages_since_filters_by_time() {
        let (store, tenant) = store_with_tenant();
        let mut old = StoredMessage::new(ChatRole::User, "old");
        old.created_at = Utc::now() - Duration::days(10);
        store
            .append_messages(&tenant, vec![old, StoredMessage::new(ChatRole::User, "new")])
            .unwrap();

        assert_eq!(store.count_messages(&tenant).unwrap(), 2);
        let recent = store
            .messages_since(&tenant, Utc::now() - Duration::days(7))
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "new");
    }

    #[test]
    fn default_settings() {
        let settings = ChatbotSettings::default();
        assert_eq!(settings.name, "AI Assistant");
        assert_eq!(settings.color, "#3b82f6");
        assert_eq!(settings.position, WidgetPosition::Right);
        assert!(settings.ai_mode);
        assert_eq!(WidgetPosition::parse("left"), Some(WidgetPosition::Left));
        assert_eq!(WidgetPosition::parse("center"), None);
    }
}
