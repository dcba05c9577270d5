//! 值求值器
//!
//! 定义操作数字面量的取值规则和各操作符的类型语义。
//! 不做任何隐式转换：比较要求两侧类型一致，`AND`/`OR` 只接受布尔值。

use crate::error::EvalError;
use crate::models::{EvaluationContext, OperandLiteral, Value};
use crate::operators::Operator;

/// 值求值器
pub struct ValueEvaluator;

impl ValueEvaluator {
    /// 求操作数 token 的值
    ///
    /// 纯数字为整数，单引号包裹为字符串，其余按属性名到上下文中查找。
    pub fn operand(token: &str, context: &EvaluationContext) -> Result<Value, EvalError> {
        match OperandLiteral::classify(token) {
            OperandLiteral::Number(digits) => digits
                .parse::<i64>()
                .map(Value::Number)
                .map_err(|_| EvalError::InvalidNumber(digits.to_string())),
            OperandLiteral::Text(text) => Ok(Value::String(text.to_string())),
            OperandLiteral::Attribute(name) => context
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownAttribute(name.to_string())),
        }
    }

    /// 对两侧已求出的值应用操作符
    pub fn apply(operator: Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
        match operator {
            Operator::Gt => Self::compare(operator, left, right, |a, b| a > b),
            Operator::Lt => Self::compare(operator, left, right, |a, b| a < b),
            Operator::Eq => Self::equals(operator, left, right).map(Value::Boolean),
            Operator::Neq => Self::equals(operator, left, right).map(|eq| Value::Boolean(!eq)),
            Operator::And => Self::logical(operator, left, right, |a, b| a && b),
            Operator::Or => Self::logical(operator, left, right, |a, b| a || b),
        }
    }

    /// 数值比较
    fn compare<F>(
        operator: Operator,
        left: &Value,
        right: &Value,
        cmp: F,
    ) -> Result<Value, EvalError>
    where
        F: Fn(i64, i64) -> bool,
    {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(cmp(*a, *b))),
            _ => Err(Self::mismatch(operator, "number", left, right)),
        }
    }

    /// 相等比较，只允许数值与数值、字符串与字符串
    fn equals(operator: Operator, left: &Value, right: &Value) -> Result<bool, EvalError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(a == b),
            (Value::String(a), Value::String(b)) => Ok(a == b),
            _ => Err(Self::mismatch(
                operator,
                "two numbers or two strings",
                left,
                right,
            )),
        }
    }

    /// 布尔运算
    fn logical<F>(
        operator: Operator,
        left: &Value,
        right: &Value,
        op: F,
    ) -> Result<Value, EvalError>
    where
        F: Fn(bool, bool) -> bool,
    {
        match (left.as_bool(), right.as_bool()) {
            (Some(a), Some(b)) => Ok(Value::Boolean(op(a, b))),
            _ => Err(Self::mismatch(operator, "boolean", left, right)),
        }
    }

    fn mismatch(
        operator: Operator,
        expected: &'static str,
        left: &Value,
        right: &Value,
    ) -> EvalError {
        EvalError::TypeMismatch {
            operator: operator.to_string(),
            expected,
            left: left.type_name(),
            right: right.type_name(),
        }
    }
}
