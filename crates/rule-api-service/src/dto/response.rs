//! 响应 DTO 定义

use crate::models::StoredRule;
use chrono::{DateTime, Utc};
use rule_engine::{Connective, EvaluationResult, TransportNode, Value};
use serde::{Deserialize, Serialize};

/// API 统一响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }
}

/// 规则响应 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDto {
    pub id: i64,
    pub name: Option<String>,
    pub rule: String,
    pub ast: TransportNode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredRule> for RuleDto {
    fn from(rule: StoredRule) -> Self {
        Self {
            id: rule.id,
            name: rule.name,
            rule: rule.rule_string,
            ast: rule.ast,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

/// 组合结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineResponse {
    pub operator: Connective,
    /// 组合后语法树的全括号规则字符串
    pub rule: String,
    pub ast: TransportNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<RuleDto>,
}

/// 求值结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
    pub evaluation_time_us: i64,
}

impl EvaluateResponse {
    pub fn from_result(result: EvaluationResult, with_trace: bool) -> Self {
        Self {
            result: result.value,
            trace: with_trace.then_some(result.evaluation_trace),
            evaluation_time_us: result.evaluation_time_us,
        }
    }
}

/// 删除结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub id: i64,
    pub deleted: bool,
}
