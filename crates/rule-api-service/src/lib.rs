//! 规则管理服务
//!
//! 提供规则的 REST API：
//!
//! - **规则管理**：创建、查询、修改、删除，入库时保存解析后的语法树
//! - **规则组合**：将多条规则以 AND/OR 合并为一棵语法树
//! - **规则求值**：对传输格式的语法树或已保存规则按上下文求值，可返回追踪信息
//!
//! 存储后端可选 PostgreSQL 或进程内实现。

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;

pub use error::{ApiError, Result};
pub use models::StoredRule;
pub use repository::{InMemoryRuleRepository, PgRuleRepository, RuleRepository};
pub use routes::create_router;
pub use state::AppState;
