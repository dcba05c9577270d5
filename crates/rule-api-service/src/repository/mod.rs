//! 规则仓储层
//!
//! 定义规则持久化接口，提供 PostgreSQL 和进程内两种实现。
//! 仓储负责把语法树序列化为传输格式，并分配 ID 与时间戳。

mod memory;
mod postgres;

pub use memory::InMemoryRuleRepository;
pub use postgres::PgRuleRepository;

use crate::models::StoredRule;
use async_trait::async_trait;
use rule_engine::Node;

/// 规则仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// 保存规则字符串及其语法树
    async fn save(
        &self,
        name: Option<String>,
        rule_string: &str,
        ast: &Node,
    ) -> Result<StoredRule, sqlx::Error>;

    /// 根据 ID 获取规则
    async fn get(&self, id: i64) -> Result<Option<StoredRule>, sqlx::Error>;

    /// 获取全部规则，按 ID 倒序
    async fn list(&self) -> Result<Vec<StoredRule>, sqlx::Error>;

    /// 替换规则字符串和重新生成的语法树，规则不存在时返回 None
    async fn update(
        &self,
        id: i64,
        rule_string: &str,
        ast: &Node,
    ) -> Result<Option<StoredRule>, sqlx::Error>;

    /// 删除规则，返回是否确实删除了记录
    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error>;
}
