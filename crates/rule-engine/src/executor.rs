//! 规则执行器
//!
//! 递归遍历语法树：先求左子树，再求右子树，最后应用操作符。
//! 不做短路求值，两侧总会被求值，因此任何一侧的类型错误都会暴露出来。

use crate::error::EvalError;
use crate::evaluator::ValueEvaluator;
use crate::models::{EvaluationContext, EvaluationResult, Node, NodeKind, Value};
use std::time::{Duration, Instant};

/// 对语法树求值
pub fn evaluate(node: &Node, context: &EvaluationContext) -> Result<Value, EvalError> {
    RuleExecutor::new().evaluate(node, context)
}

/// 对可能为空的语法树求值，空树得到 `Value::Null`
pub fn evaluate_tree(node: Option<&Node>, context: &EvaluationContext) -> Result<Value, EvalError> {
    match node {
        Some(node) => evaluate(node, context),
        None => Ok(Value::Null),
    }
}

/// 规则执行器
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 求值
    pub fn evaluate(&self, node: &Node, context: &EvaluationContext) -> Result<Value, EvalError> {
        let mut trace = Vec::new();
        self.evaluate_node(node, context, &mut trace, "root")
    }

    /// 求值并返回追踪信息和耗时
    pub fn execute(
        &self,
        node: &Node,
        context: &EvaluationContext,
    ) -> Result<EvaluationResult, EvalError> {
        let start = Instant::now();

        let mut trace = Vec::new();
        let value = self.evaluate_node(node, context, &mut trace, "root")?;

        let mut result = EvaluationResult::new(value);
        result.evaluation_trace = trace;
        result.evaluation_time_us = saturating_micros(start.elapsed());

        Ok(result)
    }

    /// 递归评估语法树节点
    fn evaluate_node(
        &self,
        node: &Node,
        context: &EvaluationContext,
        trace: &mut Vec<String>,
        path: &str,
    ) -> Result<Value, EvalError> {
        match node.kind() {
            NodeKind::Operand => {
                let value = ValueEvaluator::operand(node.value(), context)?;
                if self.trace_enabled {
                    trace.push(format!("{}: {} => {}", path, node.value(), value));
                }
                Ok(value)
            }
            NodeKind::Operator => self.evaluate_operator(node, context, trace, path),
        }
    }

    /// 评估操作符节点
    fn evaluate_operator(
        &self,
        node: &Node,
        context: &EvaluationContext,
        trace: &mut Vec<String>,
        path: &str,
    ) -> Result<Value, EvalError> {
        let operator = node.operator_kind().ok_or_else(|| {
            EvalError::MalformedTree(format!("{}: 未知操作符 '{}'", path, node.value()))
        })?;
        let (Some(left), Some(right)) = (node.left(), node.right()) else {
            return Err(EvalError::MalformedTree(format!(
                "{}: 操作符 '{}' 缺少子节点",
                path, operator
            )));
        };

        let left = self.evaluate_node(left, context, trace, &self.child_path(path, "left"))?;
        let right = self.evaluate_node(right, context, trace, &self.child_path(path, "right"))?;
        let value = ValueEvaluator::apply(operator, &left, &right)?;

        if self.trace_enabled {
            trace.push(format!(
                "{}: {} {} {} => {}",
                path, left, operator, right, value
            ));
        }

        Ok(value)
    }

    /// 子节点路径，只在追踪开启时拼接
    fn child_path(&self, path: &str, side: &str) -> String {
        if self.trace_enabled {
            format!("{}.{}", path, side)
        } else {
            String::new()
        }
    }
}

/// 耗时换算为微秒，超出 i64 范围时取上限
fn saturating_micros(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_micros()).unwrap_or(i64::MAX)
}
