//! 规则组合
//!
//! 将多条规则字符串按连接词左折叠为一棵语法树。

use crate::builder::{MAX_OPERATORS, parse_rule};
use crate::error::{ParseError, Result, RuleError};
use crate::models::Node;
use crate::operators::Connective;
use tracing::debug;

/// 规则组合器
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleCombinator {
    connective: Connective,
}

impl RuleCombinator {
    /// 使用默认连接词 AND
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connective(mut self, connective: Connective) -> Self {
        self.connective = connective;
        self
    }

    pub fn connective(&self) -> Connective {
        self.connective
    }

    /// 组合规则
    ///
    /// `((r1 op r2) op r3) ...`，任意一条规则解析失败即返回错误并指明该规则。
    /// 组合结果同样受 [`MAX_OPERATORS`] 限制。
    pub fn combine<S: AsRef<str>>(&self, rules: &[S]) -> Result<Node> {
        let mut parsed = rules.iter().map(|rule| {
            let rule = rule.as_ref();
            parse_rule(rule).map_err(|source| RuleError::InvalidRule {
                rule: rule.to_string(),
                source,
            })
        });

        let mut combined = parsed.next().ok_or(RuleError::NoRules)??;
        let mut operators = combined.operator_count();
        for ast in parsed {
            let ast = ast?;
            operators += ast.operator_count() + 1;
            if operators > MAX_OPERATORS {
                return Err(ParseError::RuleTooDeep { max: MAX_OPERATORS }.into());
            }
            combined = Node::operator(self.connective.into(), combined, ast);
        }

        debug!(
            rule_count = rules.len(),
            connective = %self.connective,
            "Rules combined"
        );
        Ok(combined)
    }
}

/// 组合规则的便捷函数
pub fn combine_rules<S: AsRef<str>>(rules: &[S], connective: Connective) -> Result<Node> {
    RuleCombinator::new()
        .with_connective(connective)
        .combine(rules)
}
