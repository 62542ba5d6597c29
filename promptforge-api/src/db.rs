//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling with deadpool-postgres and the
//! [`Store`] implementation backing the API.
//!
//! Two tables are used: `prompts` (append-only generation log) and
//! `prompt_experiment` (editable template fragments).

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use promptforge_core::{
    ArtifactKind, ForgeError, ForgeResult, GenerationOutcome, NewPrompt, PromptId, PromptRecord,
    PromptStore, PromptSummary, StorageError, Store, TemplateFragment, TemplateStore,
};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_postgres::{NoTls, Row};

use crate::error::{ApiError, ApiResult};
use crate::telemetry::metrics::with_metrics;

const PROMPTS_TABLE: &str = "prompts";
const FRAGMENTS_TABLE: &str = "prompt_experiment";

/// Idempotent schema setup run at startup. Older databases gain the tag and
/// artifact columns through `ADD COLUMN IF NOT EXISTS`.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS prompts (
  id SERIAL PRIMARY KEY,
  prompt TEXT NOT NULL,
  response TEXT,
  cpp_code TEXT,
  uml_code TEXT,
  created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
ALTER TABLE prompts ADD COLUMN IF NOT EXISTS cpp_code TEXT;
ALTER TABLE prompts ADD COLUMN IF NOT EXISTS uml_code TEXT;
ALTER TABLE prompts ADD COLUMN IF NOT EXISTS exp_name TEXT;
ALTER TABLE prompts ADD COLUMN IF NOT EXISTS architecture TEXT;
ALTER TABLE prompts ADD COLUMN IF NOT EXISTS description_type TEXT;
CREATE TABLE IF NOT EXISTS prompt_experiment (
  name TEXT PRIMARY KEY,
  prompt_part TEXT NOT NULL
);
"#;

// `created_at` is cast so databases created with a plain TIMESTAMP column
// still decode into DateTime<Utc>.
const RECORD_COLUMNS: &str = "id, prompt, exp_name, architecture, description_type, \
     response, cpp_code, uml_code, created_at::timestamptz AS created_at";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full connection string; takes precedence over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait/create timeout for pooled connections
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            dbname: "promptforge".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a database configuration from environment variables.
    ///
    /// `DATABASE_URL` wins when set; otherwise `PROMPTFORGE_DB_HOST`,
    /// `PROMPTFORGE_DB_PORT`, `PROMPTFORGE_DB_NAME`, `PROMPTFORGE_DB_USER` and
    /// `PROMPTFORGE_DB_PASSWORD` are used.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|u| !u.trim().is_empty()),
            host: std::env::var("PROMPTFORGE_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("PROMPTFORGE_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("PROMPTFORGE_DB_NAME")
                .unwrap_or_else(|_| "promptforge".to_string()),
            user: std::env::var("PROMPTFORGE_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("PROMPTFORGE_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("PROMPTFORGE_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("PROMPTFORGE_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    fn pool_config(&self) -> Config {
        let mut cfg = Config::new();
        match &self.url {
            Some(url) => cfg.url = Some(url.clone()),
            None => {
                cfg.host = Some(self.host.clone());
                cfg.port = Some(self.port);
                cfg.dbname = Some(self.dbname.clone());
                cfg.user = Some(self.user.clone());
                cfg.password = Some(self.password.clone());
            }
        }

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool = deadpool_postgres::PoolConfig::new(self.max_size);
        pool.timeouts.wait = Some(self.timeout);
        pool.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool);
        cfg
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        self.pool_config()
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Create tables and add missing columns.
    pub async fn init_schema(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA_SQL).await?;
        tracing::info!("Database schema ready");
        Ok(())
    }

    async fn get_conn(&self) -> ForgeResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            tracing::error!("Connection pool error: {:?}", e);
            StorageError::ConnectionUnavailable {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Time a query and record it under `operation`/`table`.
async fn observed<T, F>(operation: &str, table: &str, fut: F) -> ForgeResult<T>
where
    F: Future<Output = ForgeResult<T>>,
{
    let start = Instant::now();
    let result = fut.await;
    let elapsed = start.elapsed().as_secs_f64();
    with_metrics(|m| m.record_db_operation(operation, table, result.is_ok(), elapsed));
    result
}

fn query_failed(err: tokio_postgres::Error) -> ForgeError {
    tracing::error!("Database error: {:?}", err);
    StorageError::QueryFailed {
        reason: err.to_string(),
    }
    .into()
}

fn record_from_row(row: &Row) -> Result<PromptRecord, tokio_postgres::Error> {
    Ok(PromptRecord {
        id: row.try_get("id")?,
        prompt: row.try_get("prompt")?,
        exp_name: row.try_get("exp_name")?,
        architecture: row.try_get("architecture")?,
        description_type: row.try_get("description_type")?,
        response: row.try_get("response")?,
        cpp_code: row.try_get("cpp_code")?,
        uml_code: row.try_get("uml_code")?,
        created_at: row.try_get("created_at")?,
    })
}

fn summary_from_row(row: &Row) -> Result<PromptSummary, tokio_postgres::Error> {
    Ok(PromptSummary {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        exp_name: row.try_get("exp_name")?,
        architecture: row.try_get("architecture")?,
        description_type: row.try_get("description_type")?,
        prompt: row.try_get("prompt")?,
        has_cpp: row.try_get("has_cpp")?,
        has_uml: row.try_get("has_uml")?,
    })
}

fn fragment_from_row(row: &Row) -> Result<TemplateFragment, tokio_postgres::Error> {
    Ok(TemplateFragment {
        name: row.try_get("name")?,
        prompt_part: row.try_get("prompt_part")?,
    })
}

// ============================================================================
// PROMPT OPERATIONS
// ============================================================================

#[async_trait]
impl PromptStore for DbClient {
    async fn insert_prompt(&self, prompt: &NewPrompt) -> ForgeResult<PromptRecord> {
        observed("insert", PROMPTS_TABLE, async {
            let conn = self.get_conn().await?;
            let sql = format!(
                "INSERT INTO prompts (prompt, exp_name, architecture, description_type) \
                 VALUES ($1, $2, $3, $4) RETURNING {}",
                RECORD_COLUMNS
            );
            let row = conn
                .query_one(
                    sql.as_str(),
                    &[
                        &prompt.prompt,
                        &prompt.exp_name,
                        &prompt.architecture,
                        &prompt.description_type,
                    ],
                )
                .await
                .map_err(|e| {
                    tracing::error!("Prompt insert failed: {:?}", e);
                    ForgeError::from(StorageError::InsertFailed {
                        table: PROMPTS_TABLE.to_string(),
                        reason: e.to_string(),
                    })
                })?;
            record_from_row(&row).map_err(query_failed)
        })
        .await
    }

    async fn record_outcome(&self, id: PromptId, outcome: &GenerationOutcome) -> ForgeResult<()> {
        observed("update", PROMPTS_TABLE, async {
            let conn = self.get_conn().await?;
            let updated = conn
                .execute(
                    "UPDATE prompts SET response = $1, cpp_code = $2, uml_code = $3 WHERE id = $4",
                    &[
                        &outcome.response(),
                        &outcome.cpp_code(),
                        &outcome.uml_code(),
                        &id,
                    ],
                )
                .await
                .map_err(|e| {
                    tracing::error!("Prompt update failed: {:?}", e);
                    ForgeError::from(StorageError::UpdateFailed {
                        table: PROMPTS_TABLE.to_string(),
                        id,
                        reason: e.to_string(),
                    })
                })?;
            if updated == 0 {
                return Err(StorageError::PromptNotFound { id }.into());
            }
            Ok(())
        })
        .await
    }

    async fn list_prompts(&self) -> ForgeResult<Vec<PromptSummary>> {
        observed("list", PROMPTS_TABLE, async {
            let conn = self.get_conn().await?;
            let rows = conn
                .query(
                    "SELECT id, created_at::timestamptz AS created_at, exp_name, architecture, \
                     description_type, prompt, \
                     COALESCE(cpp_code <> '', false) AS has_cpp, \
                     COALESCE(uml_code <> '', false) AS has_uml \
                     FROM prompts ORDER BY id DESC",
                    &[],
                )
                .await
                .map_err(query_failed)?;
            rows.iter()
                .map(summary_from_row)
                .collect::<Result<Vec<_>, _>>()
                .map_err(query_failed)
        })
        .await
    }

    async fn latest_prompt(&self) -> ForgeResult<Option<PromptRecord>> {
        observed("latest", PROMPTS_TABLE, async {
            let conn = self.get_conn().await?;
            let sql = format!(
                "SELECT {} FROM prompts ORDER BY id DESC LIMIT 1",
                RECORD_COLUMNS
            );
            let row = conn
                .query_opt(sql.as_str(), &[])
                .await
                .map_err(query_failed)?;
            row.as_ref()
                .map(record_from_row)
                .transpose()
                .map_err(query_failed)
        })
        .await
    }

    async fn get_artifact(&self, id: PromptId, kind: ArtifactKind) -> ForgeResult<Option<String>> {
        observed("artifact", PROMPTS_TABLE, async {
            let conn = self.get_conn().await?;
            // Column names come from a closed enum, never from the request.
            let sql = format!("SELECT {} FROM prompts WHERE id = $1", kind.column());
            let row = conn
                .query_opt(sql.as_str(), &[&id])
                .await
                .map_err(query_failed)?;
            let Some(row) = row else {
                return Ok(None);
            };
            let artifact: Option<String> = row.try_get(0).map_err(query_failed)?;
            Ok(artifact)
        })
        .await
    }
}

// ============================================================================
// TEMPLATE FRAGMENT OPERATIONS
// ============================================================================

#[async_trait]
impl TemplateStore for DbClient {
    async fn list_fragments(&self) -> ForgeResult<Vec<TemplateFragment>> {
        observed("list", FRAGMENTS_TABLE, async {
            let conn = self.get_conn().await?;
            let rows = conn
                .query(
                    "SELECT name, prompt_part FROM prompt_experiment ORDER BY name",
                    &[],
                )
                .await
                .map_err(query_failed)?;
            rows.iter()
                .map(fragment_from_row)
                .collect::<Result<Vec<_>, _>>()
                .map_err(query_failed)
        })
        .await
    }

    async fn get_fragments(&self, names: &[&str]) -> ForgeResult<Vec<TemplateFragment>> {
        observed("select", FRAGMENTS_TABLE, async {
            let conn = self.get_conn().await?;
            let rows = conn
                .query(
                    "SELECT name, prompt_part FROM prompt_experiment WHERE name = ANY($1)",
                    &[&names],
                )
                .await
                .map_err(query_failed)?;
            rows.iter()
                .map(fragment_from_row)
                .collect::<Result<Vec<_>, _>>()
                .map_err(query_failed)
        })
        .await
    }

    async fn upsert_fragment(
        &self,
        name: &str,
        prompt_part: &str,
    ) -> ForgeResult<TemplateFragment> {
        observed("upsert", FRAGMENTS_TABLE, async {
            let conn = self.get_conn().await?;
            let row = conn
                .query_one(
                    "INSERT INTO prompt_experiment (name, prompt_part) VALUES ($1, $2) \
                     ON CONFLICT (name) DO UPDATE SET prompt_part = EXCLUDED.prompt_part \
                     RETURNING name, prompt_part",
                    &[&name, &prompt_part],
                )
                .await
                .map_err(|e| {
                    tracing::error!("Fragment upsert failed: {:?}", e);
                    ForgeError::from(StorageError::InsertFailed {
                        table: FRAGMENTS_TABLE.to_string(),
                        reason: e.to_string(),
                    })
                })?;
            fragment_from_row(&row).map_err(query_failed)
        })
        .await
    }
}

#[async_trait]
impl Store for DbClient {
    async fn ping(&self) -> ForgeResult<()> {
        let conn = self.get_conn().await?;
        conn.simple_query("SELECT 1").await.map_err(query_failed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert!(config.url.is_none());
        assert_eq!(config.port, 5432);
        assert_eq!(config.max_size, 16);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_pool_config_prefers_url() {
        let config = DbConfig {
            url: Some("postgres://forge:secret@db:5432/forge".to_string()),
            ..DbConfig::default()
        };
        let cfg = config.pool_config();
        assert_eq!(cfg.url.as_deref(), Some("postgres://forge:secret@db:5432/forge"));
        assert!(cfg.host.is_none());
        assert_eq!(cfg.pool.map(|p| p.max_size), Some(16));
    }

    #[test]
    fn test_pool_config_discrete_fields() {
        let config = DbConfig {
            host: "db.internal".to_string(),
            port: 6543,
            ..DbConfig::default()
        };
        let cfg = config.pool_config();
        assert!(cfg.url.is_none());
        assert_eq!(cfg.host.as_deref(), Some("db.internal"));
        assert_eq!(cfg.port, Some(6543));
    }

    #[test]
    fn test_schema_is_idempotent_sql() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS prompts"));
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS prompt_experiment"));
        assert_eq!(SCHEMA_SQL.matches("ADD COLUMN IF NOT EXISTS").count(), 5);
    }
}
