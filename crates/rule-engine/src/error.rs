//! 规则引擎错误类型
//!
//! 解析错误与求值错误分开定义，`RuleError` 汇总两者以及组合、传输层的失败。

use thiserror::Error;

/// 规则字符串解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("规则中存在无效的 token: {token}")]
    InvalidToken { token: String },

    #[error("存在未闭合的左括号")]
    UnmatchedOpenParen,

    #[error("多余的右括号: 没有与之匹配的左括号")]
    UnmatchedCloseParen,

    #[error("意外的右括号: 括号内没有表达式")]
    UnexpectedCloseParen,

    #[error("意外的左括号: 位于 '{after}' 之后")]
    UnexpectedOpenParen { after: String },

    #[error("意外的逻辑操作符: {operator} 位于 {after} 之后")]
    UnexpectedOperator { operator: String, after: String },

    #[error("意外的比较操作符: {operator} 位于 {after} 之后")]
    UnexpectedComparisonOperator { operator: String, after: String },

    #[error("意外的操作数: {operand} 位于 {after} 之后")]
    UnexpectedOperand { operand: String, after: String },

    #[error("空规则: 未生成任何语法树")]
    EmptyRule,

    #[error("表达式不完整: 以操作符 '{operator}' 结尾")]
    IncompleteExpression { operator: String },

    #[error("规则过于复杂: 操作符数量超过上限 {max}")]
    RuleTooDeep { max: usize },
}

impl ParseError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidToken { .. } => "INVALID_TOKEN",
            Self::UnmatchedOpenParen => "UNMATCHED_OPEN_PAREN",
            Self::UnmatchedCloseParen => "UNMATCHED_CLOSE_PAREN",
            Self::UnexpectedCloseParen => "UNEXPECTED_CLOSE_PAREN",
            Self::UnexpectedOpenParen { .. } => "UNEXPECTED_OPEN_PAREN",
            Self::UnexpectedOperator { .. } => "UNEXPECTED_OPERATOR",
            Self::UnexpectedComparisonOperator { .. } => "UNEXPECTED_COMPARISON_OPERATOR",
            Self::UnexpectedOperand { .. } => "UNEXPECTED_OPERAND",
            Self::EmptyRule => "EMPTY_RULE",
            Self::IncompleteExpression { .. } => "INCOMPLETE_EXPRESSION",
            Self::RuleTooDeep { .. } => "RULE_TOO_DEEP",
        }
    }
}

/// 语法树求值错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("属性不存在: {0}")]
    UnknownAttribute(String),

    #[error("类型不匹配: 操作符 {operator} 期望 {expected}, 实际 {left} 与 {right}")]
    TypeMismatch {
        operator: String,
        expected: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("语法树结构损坏: {0}")]
    MalformedTree(String),

    #[error("数值超出范围: {0}")]
    InvalidNumber(String),
}

impl EvalError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownAttribute(_) => "UNKNOWN_ATTRIBUTE",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::MalformedTree(_) => "MALFORMED_TREE",
            Self::InvalidNumber(_) => "INVALID_NUMBER",
        }
    }
}

/// 规则引擎统一错误
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则解析失败: {0}")]
    Parse(#[from] ParseError),

    #[error("规则执行失败: {0}")]
    Eval(#[from] EvalError),

    #[error("规则 '{rule}' 无效: {source}")]
    InvalidRule {
        rule: String,
        #[source]
        source: ParseError,
    },

    #[error("没有可组合的规则")]
    NoRules,

    #[error("无效的语法树结构: {0}")]
    InvalidTransport(String),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(e) | Self::InvalidRule { source: e, .. } => e.code(),
            Self::Eval(e) => e.code(),
            Self::NoRules => "NO_RULES",
            Self::InvalidTransport(_) => "INVALID_AST",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
