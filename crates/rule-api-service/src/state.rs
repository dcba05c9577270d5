//! 应用状态定义

use crate::repository::RuleRepository;
use std::sync::Arc;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 规则仓储，按配置选择 PostgreSQL 或进程内实现
    pub repository: Arc<dyn RuleRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn RuleRepository>) -> Self {
        Self { repository }
    }
}
