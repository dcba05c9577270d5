//! 规则操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 规则语言中的操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // 逻辑
    And,
    Or,

    // 比较
    Gt,
    Lt,
    Eq,
    Neq,
}

impl Operator {
    /// 从规则中的符号解析操作符，大小写敏感
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Neq),
            _ => None,
        }
    }

    /// 规则中的书写形式
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "=",
            Self::Neq => "!=",
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    pub fn is_comparison(&self) -> bool {
        !self.is_logical()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// 组合多条规则时使用的逻辑连接词
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connective {
    #[default]
    And,
    Or,
}

impl From<Connective> for Operator {
    fn from(connective: Connective) -> Self {
        match connective {
            Connective::And => Operator::And,
            Connective::Or => Operator::Or,
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}
