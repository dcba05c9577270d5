//! 规则引擎领域模型

use crate::operators::Operator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Operand,
    Operator,
}

/// 语法树节点
///
/// 每个节点独占其左右子节点，树中没有共享和回指。
/// 构建完成后对外只读，组合规则时只会创建新的父节点包裹已有子树。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    value: String,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    /// 创建操作数节点（数字、带单引号的字符串或属性名）
    pub fn operand(value: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Operand,
            value: value.into(),
            left: None,
            right: None,
        }
    }

    /// 创建左右子节点齐全的操作符节点
    pub fn operator(operator: Operator, left: Node, right: Node) -> Self {
        Self {
            kind: NodeKind::Operator,
            value: operator.symbol().to_string(),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// 解析过程中使用：右子节点尚未就位的操作符节点
    pub(crate) fn pending(operator: Operator, left: Option<Node>) -> Self {
        Self {
            kind: NodeKind::Operator,
            value: operator.symbol().to_string(),
            left: left.map(Box::new),
            right: None,
        }
    }

    /// 仅供传输层还原使用，调用方负责结构校验
    pub(crate) fn from_parts(
        kind: NodeKind,
        value: String,
        left: Option<Node>,
        right: Option<Node>,
    ) -> Self {
        Self {
            kind,
            value,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    pub fn is_operand(&self) -> bool {
        self.kind == NodeKind::Operand
    }

    /// 操作符节点对应的操作符；操作数节点或未知符号返回 None
    pub fn operator_kind(&self) -> Option<Operator> {
        match self.kind {
            NodeKind::Operator => Operator::from_symbol(&self.value),
            NodeKind::Operand => None,
        }
    }

    pub(crate) fn right_mut(&mut self) -> &mut Option<Box<Node>> {
        &mut self.right
    }

    /// 沿右侧链找到仍在等待右子节点的操作符并挂上 `child`
    ///
    /// 没有空位时原样退回 `child`。
    pub(crate) fn attach_right(&mut self, child: Node) -> Result<(), Node> {
        if let Some(right) = self.right.as_mut() {
            return right.attach_right(child);
        }

        if self.kind == NodeKind::Operator {
            self.right = Some(Box::new(child));
            Ok(())
        } else {
            Err(child)
        }
    }

    /// 树中操作符节点的数量
    pub fn operator_count(&self) -> usize {
        match self.kind {
            NodeKind::Operand => 0,
            NodeKind::Operator => {
                1 + [self.left(), self.right()]
                    .into_iter()
                    .flatten()
                    .map(Node::operator_count)
                    .sum::<usize>()
            }
        }
    }

    /// 收集规则读取的全部属性名
    pub fn referenced_attributes(&self) -> BTreeSet<String> {
        let mut attributes = BTreeSet::new();
        self.collect_attributes(&mut attributes);
        attributes
    }

    fn collect_attributes(&self, attributes: &mut BTreeSet<String>) {
        if self.is_operand() {
            if let OperandLiteral::Attribute(name) = OperandLiteral::classify(&self.value) {
                attributes.insert(name.to_string());
            }
            return;
        }

        for child in [self.left(), self.right()].into_iter().flatten() {
            child.collect_attributes(attributes);
        }
    }
}

/// 以全括号形式输出规则字符串，重新解析后得到同一棵树
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Operand => write!(f, "{}", self.value),
            NodeKind::Operator => {
                write!(f, "(")?;
                match self.left() {
                    Some(left) => write!(f, "{}", left)?,
                    None => write!(f, "?")?,
                }
                write!(f, " {} ", self.value)?;
                match self.right() {
                    Some(right) => write!(f, "{}", right)?,
                    None => write!(f, "?")?,
                }
                write!(f, ")")
            }
        }
    }
}

/// 操作数 token 的字面含义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandLiteral<'a> {
    /// 全部由十进制数字组成
    Number(&'a str),
    /// 单引号包裹的字符串，保存去掉引号后的内容
    Text(&'a str),
    /// 其余情况视为上下文中的属性名
    Attribute(&'a str),
}

impl<'a> OperandLiteral<'a> {
    pub fn classify(token: &'a str) -> Self {
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            return Self::Number(token);
        }

        if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
            return Self::Text(&token[1..token.len() - 1]);
        }

        Self::Attribute(token)
    }
}

/// 求值结果以及上下文中的属性值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(i64),
    String(String),
    /// 只在对空树求值时出现
    Null,
}

impl Value {
    /// 获取值的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Null => "null",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "'{}'", s),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// 评估上下文 - 属性名到属性值的映射
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationContext {
    attributes: HashMap<String, Value>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式添加属性
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// 从 JSON 对象创建
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for EvaluationContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 评估结果
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub value: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_us: i64,
}

impl EvaluationResult {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            evaluation_trace: Vec::new(),
            evaluation_time_us: 0,
        }
    }

    /// 结果是否为布尔真
    pub fn matched(&self) -> bool {
        self.value == Value::Boolean(true)
    }
}
