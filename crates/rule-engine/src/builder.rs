//! 语法树构建器
//!
//! 单遍扫描 token 序列，以"上一个 token 的类别"为状态做语法校验，
//! 同时维护当前子树和一个括号栈。
//!
//! 挂接规则：
//! - 新的操作符把当前子树作为左子节点，自己成为当前子树；
//! - 比较操作符紧跟在已填满右侧的 `AND`/`OR` 之后时，接管该右侧操作数，
//!   因此 `a > 1 AND b = 2` 得到 `AND(>(a,1), =(b,2))`；
//! - 当前子树本身就是刚闭合的括号组时不接管，整个括号组作为左子节点，
//!   因此 `(x OR y) > 3` 得到 `>(OR(x,y), 3)`；
//! - 操作数填入右侧链上最深的空位；
//! - `)` 把括号内的子树填入进入括号前保存的外层节点。
//!
//! 操作符总数上限为 [`MAX_OPERATORS`]，语法树深度不会超过它，
//! 递归遍历（求值、序列化、释放）的栈深因此有界。

use crate::error::ParseError;
use crate::models::Node;
use crate::operators::Operator;
use crate::tokenizer::{Token, tokenize};
use std::fmt;
use tracing::debug;

/// 单条规则允许的操作符数量上限
pub const MAX_OPERATORS: usize = 100;

/// 解析规则字符串
pub fn parse_rule(rule: &str) -> Result<Node, ParseError> {
    build(&tokenize(rule))
}

/// 由 token 序列构建语法树
///
/// 只有当序列恰好构成一个完整、括号平衡的表达式时才成功。
pub fn build<S: AsRef<str>>(tokens: &[S]) -> Result<Node, ParseError> {
    let mut builder = AstBuilder::new();
    for raw in tokens {
        builder.push(Token::classify(raw.as_ref())?)?;
    }
    let root = builder.finish()?;

    debug!(token_count = tokens.len(), "Rule AST built");
    Ok(root)
}

/// 上一个 token 的类别
#[derive(Debug, Clone, Copy)]
enum LastToken<'a> {
    Start,
    OpenParen,
    CloseParen,
    Operator(Operator),
    Operand(&'a str),
}

impl fmt::Display for LastToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "规则开头"),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::Operator(op) => write!(f, "{}", op),
            Self::Operand(s) => write!(f, "{}", s),
        }
    }
}

struct AstBuilder<'a> {
    current: Option<Node>,
    /// 每个未闭合的 `(` 对应一项：进入括号前的当前子树
    stack: Vec<Option<Node>>,
    last: LastToken<'a>,
    /// 当前子树的根是一个已闭合的括号组
    root_is_group: bool,
    operators: usize,
}

impl<'a> AstBuilder<'a> {
    fn new() -> Self {
        Self {
            current: None,
            stack: Vec::new(),
            last: LastToken::Start,
            root_is_group: false,
            operators: 0,
        }
    }

    fn push(&mut self, token: Token<'a>) -> Result<(), ParseError> {
        match token {
            Token::OpenParen => self.open_paren()?,
            Token::CloseParen => self.close_paren()?,
            Token::Operator(op) => self.operator(op)?,
            Token::Operand(value) => self.operand(value)?,
        }
        Ok(())
    }

    fn open_paren(&mut self) -> Result<(), ParseError> {
        if matches!(self.last, LastToken::Operand(_) | LastToken::CloseParen) {
            return Err(ParseError::UnexpectedOpenParen {
                after: self.last.to_string(),
            });
        }

        self.stack.push(self.current.take());
        self.last = LastToken::OpenParen;
        Ok(())
    }

    fn close_paren(&mut self) -> Result<(), ParseError> {
        let Some(outer) = self.stack.pop() else {
            return Err(ParseError::UnmatchedCloseParen);
        };
        let Some(group) = self.current.take() else {
            return Err(ParseError::UnexpectedCloseParen);
        };
        if let LastToken::Operator(op) = self.last {
            return Err(ParseError::IncompleteExpression {
                operator: op.to_string(),
            });
        }

        self.root_is_group = outer.is_none();
        self.current = Some(match outer {
            Some(mut outer) => {
                if outer.attach_right(group).is_err() {
                    unreachable!("'(' 只会出现在操作符之后，外层节点必有空位");
                }
                outer
            }
            None => group,
        });
        self.last = LastToken::CloseParen;
        Ok(())
    }

    fn operator(&mut self, op: Operator) -> Result<(), ParseError> {
        if !matches!(self.last, LastToken::Operand(_) | LastToken::CloseParen) {
            let operator = op.to_string();
            let after = self.last.to_string();
            return Err(if op.is_logical() {
                ParseError::UnexpectedOperator { operator, after }
            } else {
                ParseError::UnexpectedComparisonOperator { operator, after }
            });
        }

        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(ParseError::RuleTooDeep { max: MAX_OPERATORS });
        }

        let takes_right = op.is_comparison() && !self.root_is_group;
        self.root_is_group = false;

        let current = self.current.take();
        self.current = Some(match current {
            Some(mut node) if takes_right && Self::is_filled_logical(&node) => {
                let operand = node.right_mut().take().map(|b| *b);
                *node.right_mut() = Some(Box::new(Node::pending(op, operand)));
                node
            }
            other => Node::pending(op, other),
        });
        self.last = LastToken::Operator(op);
        Ok(())
    }

    fn operand(&mut self, value: &'a str) -> Result<(), ParseError> {
        if matches!(self.last, LastToken::Operand(_) | LastToken::CloseParen) {
            return Err(ParseError::UnexpectedOperand {
                operand: value.to_string(),
                after: self.last.to_string(),
            });
        }

        let leaf = Node::operand(value);
        match self.current.as_mut() {
            None => self.current = Some(leaf),
            Some(node) => {
                if node.attach_right(leaf).is_err() {
                    unreachable!("操作数只会出现在操作符之后，当前子树必有空位");
                }
            }
        }
        self.last = LastToken::Operand(value);
        Ok(())
    }

    fn finish(self) -> Result<Node, ParseError> {
        let Some(root) = self.current else {
            return Err(ParseError::EmptyRule);
        };
        if !self.stack.is_empty() {
            return Err(ParseError::UnmatchedOpenParen);
        }
        if let LastToken::Operator(op) = self.last {
            return Err(ParseError::IncompleteExpression {
                operator: op.to_string(),
            });
        }
        Ok(root)
    }

    fn is_filled_logical(node: &Node) -> bool {
        node.operator_kind().is_some_and(|op| op.is_logical()) && node.right().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;

    fn leaf(value: &str) -> Node {
        Node::operand(value)
    }

    #[test]
    fn test_single_comparison() {
        let ast = parse_rule("age > 30").unwrap();
        assert_eq!(ast, Node::operator(Operator::Gt, leaf("age"), leaf("30")));
    }

    #[test]
    fn test_comparisons_joined_by_and() {
        let ast = parse_rule("(age > 30 AND department = 'Sales')").unwrap();

        assert_eq!(ast.kind(), NodeKind::Operator);
        assert_eq!(ast.value(), "AND");

        let left = ast.left().unwrap();
        assert_eq!(left.value(), ">");
        assert_eq!(left.left().unwrap().value(), "age");
        assert_eq!(left.right().unwrap().value(), "30");

        let right = ast.right().unwrap();
        assert_eq!(right.value(), "=");
        assert_eq!(right.left().unwrap().value(), "department");
        assert_eq!(right.right().unwrap().value(), "'Sales'");
    }

    #[test]
    fn test_logical_operators_fold_left() {
        let ast = parse_rule("a > 1 AND b > 2 OR c > 3").unwrap();
        assert_eq!(ast.to_string(), "(((a > 1) AND (b > 2)) OR (c > 3))");
    }

    #[test]
    fn test_parentheses_group_right_side() {
        let ast = parse_rule("a > 1 AND (b > 2 OR c < 3)").unwrap();
        assert_eq!(ast.to_string(), "((a > 1) AND ((b > 2) OR (c < 3)))");
    }

    #[test]
    fn test_nested_and_leading_groups() {
        let ast = parse_rule("((a = 'x') OR b != 2) AND c < 5").unwrap();
        assert_eq!(ast.to_string(), "(((a = 'x') OR (b != 2)) AND (c < 5))");
    }

    #[test]
    fn test_single_operand_rule() {
        assert_eq!(parse_rule("((active))").unwrap(), leaf("active"));
    }

    #[test]
    fn test_display_reparses_to_same_tree() {
        for rule in [
            "(age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')",
            "salary > 50000 OR experience > 5",
            "a = b",
        ] {
            let ast = parse_rule(rule).unwrap();
            assert_eq!(parse_rule(&ast.to_string()).unwrap(), ast, "{rule}");
        }
    }

    #[test]
    fn test_operator_after_operator() {
        let err = parse_rule("age > 30 AND = 'Sales'").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedComparisonOperator { ref operator, ref after }
                if operator == "=" && after == "AND"
        ));

        let err = parse_rule("age > 30 AND OR b > 1").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedOperator { .. }));
    }

    #[test]
    fn test_operator_at_start_or_after_open_paren() {
        assert!(matches!(
            parse_rule("AND a > 1").unwrap_err(),
            ParseError::UnexpectedOperator { .. }
        ));
        assert!(matches!(
            parse_rule("(> 1)").unwrap_err(),
            ParseError::UnexpectedComparisonOperator { .. }
        ));
    }

    #[test]
    fn test_missing_close_paren() {
        assert_eq!(
            parse_rule("(age > 30 AND department = 'Sales'").unwrap_err(),
            ParseError::UnmatchedOpenParen
        );
    }

    #[test]
    fn test_extra_close_paren() {
        assert_eq!(
            parse_rule("age > 30)").unwrap_err(),
            ParseError::UnmatchedCloseParen
        );
    }

    #[test]
    fn test_empty_parentheses() {
        assert_eq!(parse_rule("()").unwrap_err(), ParseError::UnexpectedCloseParen);
        assert_eq!(
            parse_rule("a > 1 AND ()").unwrap_err(),
            ParseError::UnexpectedCloseParen
        );
    }

    #[test]
    fn test_empty_rule() {
        assert_eq!(parse_rule("").unwrap_err(), ParseError::EmptyRule);
        assert_eq!(parse_rule("   ").unwrap_err(), ParseError::EmptyRule);
        assert_eq!(parse_rule("(").unwrap_err(), ParseError::EmptyRule);
    }

    #[test]
    fn test_incomplete_expression() {
        assert!(matches!(
            parse_rule("age >").unwrap_err(),
            ParseError::IncompleteExpression { ref operator } if operator == ">"
        ));
        assert!(matches!(
            parse_rule("(age > 30 AND)").unwrap_err(),
            ParseError::IncompleteExpression { ref operator } if operator == "AND"
        ));
    }

    #[test]
    fn test_juxtaposed_operands() {
        assert!(matches!(
            parse_rule("a b").unwrap_err(),
            ParseError::UnexpectedOperand { ref operand, ref after } if operand == "b" && after == "a"
        ));
        assert!(matches!(
            parse_rule("(a > 1) b").unwrap_err(),
            ParseError::UnexpectedOperand { .. }
        ));
    }

    #[test]
    fn test_open_paren_after_operand() {
        assert!(matches!(
            parse_rule("age (30)").unwrap_err(),
            ParseError::UnexpectedOpenParen { .. }
        ));
        assert!(matches!(
            parse_rule("(age ( 30 AND department = 'Sales')").unwrap_err(),
            ParseError::UnexpectedOpenParen { .. }
        ));
    }

    #[test]
    fn test_invalid_token() {
        assert_eq!(
            parse_rule("age > 30 AND salary << 50000").unwrap_err(),
            ParseError::InvalidToken {
                token: "<<".to_string()
            }
        );
    }

    #[test]
    fn test_comparison_after_root_group_takes_whole_group() {
        let ast = parse_rule("(x OR y) > 3").unwrap();
        assert_eq!(ast.value(), ">");
        assert_eq!(ast.to_string(), "((x OR y) > 3)");

        let ast = parse_rule("(a > 1 AND b > 2) = c").unwrap();
        assert_eq!(ast.value(), "=");
        assert_eq!(ast.to_string(), "(((a > 1) AND (b > 2)) = c)");

        let ast = parse_rule("((x OR y)) > 3").unwrap();
        assert_eq!(ast.to_string(), "((x OR y) > 3)");
    }

    #[test]
    fn test_group_inside_logical_still_binds_to_comparison() {
        let ast = parse_rule("a > 1 AND (b) = 2").unwrap();
        assert_eq!(ast.to_string(), "((a > 1) AND (b = 2))");

        let ast = parse_rule("(a OR (x OR y)) > 3").unwrap();
        assert_eq!(ast.to_string(), "((a OR (x OR y)) > 3)");
    }

    #[test]
    fn test_operator_limit() {
        let clauses = |n: usize| {
            (0..n)
                .map(|i| format!("a{} > {}", i, i))
                .collect::<Vec<_>>()
                .join(" AND ")
        };

        // n 个比较加 n-1 个 AND
        assert!(parse_rule(&clauses(50)).is_ok());
        assert_eq!(
            parse_rule(&clauses(51)).unwrap_err(),
            ParseError::RuleTooDeep { max: MAX_OPERATORS }
        );
        assert_eq!(
            parse_rule(&clauses(100_000)).unwrap_err(),
            ParseError::RuleTooDeep { max: MAX_OPERATORS }
        );
    }

    #[test]
    fn test_build_accepts_borrowed_tokens() {
        let ast = build(&["x", "!=", "'y'"]).unwrap();
        assert_eq!(ast, Node::operator(Operator::Neq, leaf("x"), leaf("'y'")));
    }
}
