//! 持久化的规则实体

use chrono::{DateTime, Utc};
use rule_engine::{Node, Result as RuleResult, TransportNode};
use serde::{Deserialize, Serialize};

/// 已保存的规则
///
/// 语法树以传输格式存储，读取后可通过 [`StoredRule::tree`] 还原。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRule {
    pub id: i64,
    pub name: Option<String>,
    pub rule_string: String,
    pub ast: TransportNode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRule {
    /// 还原语法树
    pub fn tree(&self) -> RuleResult<Node> {
        Node::try_from(self.ast.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rule_engine::parse_rule;

    #[test]
    fn test_tree_restores_parsed_ast() {
        let ast = parse_rule("age > 30 AND department = 'Sales'").unwrap();
        let now = Utc::now();
        let rule = StoredRule {
            id: 1,
            name: Some("senior_sales".to_string()),
            rule_string: "age > 30 AND department = 'Sales'".to_string(),
            ast: TransportNode::from(&ast),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(rule.tree().unwrap(), ast);

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["ruleString"], "age > 30 AND department = 'Sales'");
        assert_eq!(json["ast"]["value"], "AND");
    }
}
