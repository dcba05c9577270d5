//! 规则分词
//!
//! 在每个括号两侧补空格后按空白切分。分词本身不会失败，
//! token 是否合法由 [`Token::classify`] 判定。

use crate::error::ParseError;
use crate::operators::Operator;

/// 将规则字符串切分为 token 序列
///
/// 字符串字面量不能包含括号或空白，例如 `'New York'` 会被切成两个 token。
pub fn tokenize(rule: &str) -> Vec<String> {
    rule.replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// 分类后的 token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    OpenParen,
    CloseParen,
    Operator(Operator),
    Operand(&'a str),
}

impl<'a> Token<'a> {
    /// 识别 token 类别
    ///
    /// 操作数去掉一对外层单引号后必须由字母或数字组成。
    pub fn classify(raw: &'a str) -> Result<Self, ParseError> {
        match raw {
            "(" => return Ok(Self::OpenParen),
            ")" => return Ok(Self::CloseParen),
            _ => {}
        }

        if let Some(op) = Operator::from_symbol(raw) {
            return Ok(Self::Operator(op));
        }

        let body = raw
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .unwrap_or(raw);

        if !body.is_empty() && body.chars().all(char::is_alphanumeric) {
            Ok(Self::Operand(raw))
        } else {
            Err(ParseError::InvalidToken {
                token: raw.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_parentheses() {
        assert_eq!(
            tokenize("(age > 30 AND department = 'Sales')"),
            vec!["(", "age", ">", "30", "AND", "department", "=", "'Sales'", ")"]
        );
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  a\t>\n1  "), vec!["a", ">", "1"]);
        assert_eq!(tokenize("((a))"), vec!["(", "(", "a", ")", ")"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_tokenize_is_restartable() {
        let rule = "x = 'y'";
        assert_eq!(tokenize(rule), tokenize(rule));
    }

    #[test]
    fn test_classify() {
        assert_eq!(Token::classify("(").unwrap(), Token::OpenParen);
        assert_eq!(Token::classify("!=").unwrap(), Token::Operator(Operator::Neq));
        assert_eq!(Token::classify("OR").unwrap(), Token::Operator(Operator::Or));
        assert_eq!(Token::classify("'Sales'").unwrap(), Token::Operand("'Sales'"));
        assert_eq!(Token::classify("50000").unwrap(), Token::Operand("50000"));
    }

    #[test]
    fn test_classify_rejects_stray_characters() {
        for raw in ["<<", "a_b", "''", "'abc", "x.y", ">="] {
            assert!(
                matches!(Token::classify(raw), Err(ParseError::InvalidToken { .. })),
                "{raw} should be rejected"
            );
        }
    }
}
