//! PostgreSQL 规则仓储
//!
//! 连接池按 `DatabaseConfig` 创建并在启动时建表。
//! 每个操作从连接池取出一个连接，操作结束后随作用域归还，不持有全局会话。

use super::RuleRepository;
use crate::models::StoredRule;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rule_engine::{Node, TransportNode};
use rule_shared::config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use std::time::Duration;
use tracing::{info, instrument};

const CREATE_RULES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS rules (
        id BIGSERIAL PRIMARY KEY,
        rule_name TEXT,
        rule_string TEXT NOT NULL,
        ast JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
"#;

const RULE_COLUMNS: &str = "id, rule_name, rule_string, ast, created_at, updated_at";

/// 规则数据库行
#[derive(sqlx::FromRow)]
struct RuleRow {
    id: i64,
    rule_name: Option<String>,
    rule_string: String,
    ast: Json<TransportNode>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RuleRow> for StoredRule {
    fn from(row: RuleRow) -> Self {
        Self {
            id: row.id,
            name: row.rule_name,
            rule_string: row.rule_string,
            ast: row.ast.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL 规则仓储
#[derive(Clone)]
pub struct PgRuleRepository {
    pool: PgPool,
}

impl PgRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按配置建立连接池并确保规则表存在
    #[instrument(skip(config), fields(max_connections = config.max_connections))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = pool_options(config).connect(&config.url).await?;
        info!("Database connection pool established");

        let repo = Self::new(pool);
        repo.ensure_schema().await?;
        Ok(repo)
    }

    /// 关闭连接池，等待已借出的连接归还
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }

    /// 建表（幂等）
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(CREATE_RULES_TABLE).execute(&mut *conn).await?;
        info!("Rules table ready");
        Ok(())
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

#[async_trait]
impl RuleRepository for PgRuleRepository {
    #[instrument(skip(self, rule_string, ast))]
    async fn save(
        &self,
        name: Option<String>,
        rule_string: &str,
        ast: &Node,
    ) -> Result<StoredRule, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "INSERT INTO rules (rule_name, rule_string, ast, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {}",
            RULE_COLUMNS
        );
        let row = sqlx::query_as::<_, RuleRow>(&sql)
            .bind(name)
            .bind(rule_string)
            .bind(Json(TransportNode::from(ast)))
            .bind(Utc::now())
            .fetch_one(&mut *conn)
            .await?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Option<StoredRule>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!("SELECT {} FROM rules WHERE id = $1", RULE_COLUMNS);
        let row = sqlx::query_as::<_, RuleRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<StoredRule>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!("SELECT {} FROM rules ORDER BY id DESC", RULE_COLUMNS);
        let rows = sqlx::query_as::<_, RuleRow>(&sql)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, rule_string, ast))]
    async fn update(
        &self,
        id: i64,
        rule_string: &str,
        ast: &Node,
    ) -> Result<Option<StoredRule>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "UPDATE rules SET rule_string = $2, ast = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {}",
            RULE_COLUMNS
        );
        let row = sqlx::query_as::<_, RuleRow>(&sql)
            .bind(id)
            .bind(rule_string)
            .bind(Json(TransportNode::from(ast)))
            .bind(Utc::now())
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("DELETE FROM rules WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
