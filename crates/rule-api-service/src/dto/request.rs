//! 请求 DTO 定义

use rule_engine::{Connective, EvaluationContext};
use serde::Deserialize;
use validator::Validate;

/// 创建规则请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleRequest {
    #[validate(length(
        min = 1,
        max = 4096,
        message = "规则字符串不能为空且不能超过 4096 个字符"
    ))]
    pub rule: String,
    #[validate(length(min = 1, max = 100, message = "规则名称长度必须在1-100个字符之间"))]
    pub name: Option<String>,
}

/// 更新规则请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleRequest {
    #[validate(length(
        min = 1,
        max = 4096,
        message = "规则字符串不能为空且不能超过 4096 个字符"
    ))]
    pub rule: String,
}

/// 组合规则请求
///
/// `operator` 缺省为 AND；`save` 为 true 时持久化组合结果。
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CombineRulesRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "规则条数必须在1-50之间"
    ))]
    pub rules: Vec<String>,
    #[serde(default)]
    pub operator: Connective,
    #[serde(default)]
    pub save: bool,
    #[validate(length(min = 1, max = 100, message = "规则名称长度必须在1-100个字符之间"))]
    pub name: Option<String>,
}

/// 求值请求，语法树为传输格式 JSON
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    #[validate(required(message = "求值需要提供语法树"))]
    pub ast: Option<serde_json::Value>,
    #[validate(required(message = "求值需要提供上下文"))]
    pub context: Option<EvaluationContext>,
    #[serde(default)]
    pub trace: bool,
}

/// 对已保存规则求值的请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateStoredRequest {
    #[validate(required(message = "求值需要提供上下文"))]
    pub context: Option<EvaluationContext>,
    #[serde(default)]
    pub trace: bool,
}
