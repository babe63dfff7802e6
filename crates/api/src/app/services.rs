//! Service wiring: store selection, credential service, level policy.

use std::sync::Arc;

use keygate_auth::{CredentialService, LevelPolicy, TokenService, UserStore};
use keygate_infra::InMemoryUserStore;

use crate::authz;
use crate::config::AppConfig;

/// Shared application services, built once at startup.
pub struct AppServices {
    pub store: Arc<dyn UserStore>,
    pub credentials: Arc<CredentialService<dyn UserStore>>,
    pub levels: LevelPolicy,
}

/// Build services against the configured store.
///
/// Defaults to the in-memory store. With the `postgres` feature and
/// `DATABASE_URL` set, connects to Postgres and ensures the schema.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<Arc<AppServices>> {
    let store = select_store(config).await?;

    let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes()));
    let credentials = Arc::new(CredentialService::new(store.clone(), tokens));

    Ok(Arc::new(AppServices {
        store,
        credentials,
        levels: authz::level_policy(),
    }))
}

#[cfg(feature = "postgres")]
async fn select_store(config: &AppConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    use keygate_infra::PostgresUserStore;

    match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await?;
            let store = PostgresUserStore::new(pool);
            store.ensure_schema().await?;
            tracing::info!("using postgres user store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory user store");
            Ok(Arc::new(InMemoryUserStore::new()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn select_store(config: &AppConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL set but the postgres feature is disabled; using in-memory store");
    }
    Ok(Arc::new(InMemoryUserStore::new()))
}
