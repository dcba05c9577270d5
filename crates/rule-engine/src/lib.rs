//! 规则引擎
//!
//! 解析由属性比较、`AND`/`OR` 和括号组成的规则字符串，提供：
//! - 分词与语法树构建（带语法校验）
//! - 多条规则的组合
//! - 基于上下文的类型化求值
//! - 语法树的 JSON 传输格式

pub mod builder;
pub mod combinator;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod models;
pub mod operators;
pub mod tokenizer;
pub mod transport;

pub use builder::{MAX_OPERATORS, build, parse_rule};
pub use combinator::{RuleCombinator, combine_rules};
pub use error::{EvalError, ParseError, Result, RuleError};
pub use evaluator::ValueEvaluator;
pub use executor::{RuleExecutor, evaluate, evaluate_tree};
pub use models::{EvaluationContext, EvaluationResult, Node, NodeKind, OperandLiteral, Value};
pub use operators::{Connective, Operator};
pub use tokenizer::{Token, tokenize};
pub use transport::TransportNode;
