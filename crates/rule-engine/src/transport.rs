//! 语法树传输格式
//!
//! HTTP 接口和持久化层使用的嵌套 JSON 结构：
//! `{"type": "operator", "value": "AND", "left": {...}, "right": {...}}`。

use crate::error::{Result, RuleError};
use crate::models::{Node, NodeKind};
use crate::operators::Operator;
use serde::{Deserialize, Serialize};

/// 传输格式的语法树节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<TransportNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<TransportNode>>,
}

impl TransportNode {
    /// 从 JSON 字符串解析并还原语法树
    pub fn parse_tree(json: &str) -> Result<Node> {
        let transport: TransportNode = serde_json::from_str(json)?;
        Node::try_from(transport)
    }

    /// 从 JSON 值还原语法树
    pub fn tree_from_value(value: serde_json::Value) -> Result<Node> {
        let transport: TransportNode = serde_json::from_value(value)?;
        Node::try_from(transport)
    }
}

impl From<&Node> for TransportNode {
    fn from(node: &Node) -> Self {
        Self {
            kind: node.kind(),
            value: Some(node.value().to_string()),
            left: node.left().map(|n| Box::new(Self::from(n))),
            right: node.right().map(|n| Box::new(Self::from(n))),
        }
    }
}

impl From<Node> for TransportNode {
    fn from(node: Node) -> Self {
        Self::from(&node)
    }
}

impl TryFrom<TransportNode> for Node {
    type Error = RuleError;

    /// 还原并校验：操作数必须有值且没有子节点，
    /// 操作符必须是已知符号且左右子节点齐全
    fn try_from(transport: TransportNode) -> Result<Self> {
        let TransportNode {
            kind,
            value,
            left,
            right,
        } = transport;

        match kind {
            NodeKind::Operand => {
                let value = value.filter(|v| !v.is_empty()).ok_or_else(|| {
                    RuleError::InvalidTransport("操作数节点缺少 value".to_string())
                })?;
                if left.is_some() || right.is_some() {
                    return Err(RuleError::InvalidTransport(format!(
                        "操作数节点 '{}' 不能有子节点",
                        value
                    )));
                }
                Ok(Node::operand(value))
            }
            NodeKind::Operator => {
                let value = value.ok_or_else(|| {
                    RuleError::InvalidTransport("操作符节点缺少 value".to_string())
                })?;
                if Operator::from_symbol(&value).is_none() {
                    return Err(RuleError::InvalidTransport(format!(
                        "未知操作符 '{}'",
                        value
                    )));
                }
                let (Some(left), Some(right)) = (left, right) else {
                    return Err(RuleError::InvalidTransport(format!(
                        "操作符节点 '{}' 缺少子节点",
                        value
                    )));
                };

                let left = Node::try_from(*left)?;
                let right = Node::try_from(*right)?;
                Ok(Node::from_parts(kind, value, Some(left), Some(right)))
            }
        }
    }
}
