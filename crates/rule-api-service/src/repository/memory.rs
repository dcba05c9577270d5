//! 进程内规则仓储

use super::RuleRepository;
use crate::models::StoredRule;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rule_engine::{Node, TransportNode};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

/// 基于 DashMap 的规则仓储，用于测试和无数据库部署
#[derive(Clone, Default)]
pub struct InMemoryRuleRepository {
    rules: Arc<DashMap<i64, StoredRule>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn save(
        &self,
        name: Option<String>,
        rule_string: &str,
        ast: &Node,
    ) -> Result<StoredRule, sqlx::Error> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let rule = StoredRule {
            id,
            name,
            rule_string: rule_string.to_string(),
            ast: TransportNode::from(ast),
            created_at: now,
            updated_at: now,
        };

        self.rules.insert(id, rule.clone());
        debug!(rule_id = id, "Rule stored in memory");
        Ok(rule)
    }

    async fn get(&self, id: i64) -> Result<Option<StoredRule>, sqlx::Error> {
        Ok(self.rules.get(&id).map(|r| r.clone()))
    }

    async fn list(&self) -> Result<Vec<StoredRule>, sqlx::Error> {
        let mut rules: Vec<StoredRule> = self.rules.iter().map(|r| r.value().clone()).collect();
        rules.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rules)
    }

    async fn update(
        &self,
        id: i64,
        rule_string: &str,
        ast: &Node,
    ) -> Result<Option<StoredRule>, sqlx::Error> {
        Ok(self.rules.get_mut(&id).map(|mut rule| {
            rule.rule_string = rule_string.to_string();
            rule.ast = TransportNode::from(ast);
            rule.updated_at = Utc::now();
            rule.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        Ok(self.rules.remove(&id).is_some())
    }
}
