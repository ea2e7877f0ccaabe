use crate::connectors::IdentityClaims;
use crate::errors::AppError;
use crate::models::{Tenant, DEFAULT_SETTINGS};
use crate::store::Store;

/// Returns the tenant of a verified identity, creating it with default settings on first sight.
pub async fn provision_tenant(store: &dyn Store, claims: &IdentityClaims) -> Result<Tenant, AppError> {
    if let Some(tenant) = store.fetch_tenant_by_subject(&claims.subject).await? {
        return Ok(tenant);
    }

    let candidate = Tenant::provision(&claims.subject, claims.email.as_deref());
    let tenant = store.insert_tenant(candidate.clone()).await?;
    // a concurrent request may have provisioned the same subject first
    if tenant.id == candidate.id {
        let defaults = DEFAULT_SETTINGS
            .iter()
            .map(|(key, value)| (key.to_string(), Some(value.to_string())))
            .collect();
        store.upsert_settings(tenant.id, defaults).await?;
        tracing::info!(tenant_id = %tenant.id, "Provisioned tenant");
    }

    Ok(tenant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LANGUAGE_KEY;
    use crate::store::MemoryStore;

    fn claims(subject: &str) -> IdentityClaims {
        IdentityClaims {
            subject: subject.to_string(),
            email: Some(format!("{subject}@example.com")),
        }
    }

    #[tokio::test]
    async fn provisions_once_with_default_settings() {
        let store = MemoryStore::new();
        let first = provision_tenant(&store, &claims("shop")).await.unwrap();
        let second = provision_tenant(&store, &claims("shop")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.company_name.as_deref(), Some("shop"));

        let settings = store.fetch_settings(first.id).await.unwrap();
        assert_eq!(settings.len(), DEFAULT_SETTINGS.len());
        let language = store.fetch_setting(first.id, LANGUAGE_KEY).await.unwrap().unwrap();
        assert_eq!(language.value.as_deref(), Some("fr"));
    }

    #[tokio::test]
    async fn keeps_edited_settings_on_later_logins() {
        let store = MemoryStore::new();
        let tenant = provision_tenant(&store, &claims("shop")).await.unwrap();
        store
            .upsert_settings(tenant.id, vec![(LANGUAGE_KEY.to_string(), Some("mg".to_string()))])
            .await
            .unwrap();

        provision_tenant(&store, &claims("shop")).await.unwrap();
        let language = store.fetch_setting(tenant.id, LANGUAGE_KEY).await.unwrap().unwrap();
        assert_eq!(language.value.as_deref(), Some("mg"));
    }
}
