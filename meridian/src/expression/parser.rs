use regex::Regex;

use super::{BinaryOp, Expression, UnaryOp};
use crate::error::ExpressionError;
use crate::feature::Value;

const NOT_PRECEDENCE: u8 = 3;
const NEG_PRECEDENCE: u8 = 7;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Value),
    Str(String),
    Ident(String),
    Attribute(String),
    Op(BinaryOp),
    Bang,
    LParen,
    RParen,
    Dot,
}

struct Lexer<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, ExpressionError> {
        let mut tokens = vec![];
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.position += c.len_utf8();
                continue;
            }

            let start = self.position;
            let token = match c {
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '.' if !self.rest()[1..].starts_with(|c: char| c.is_ascii_digit()) => {
                    self.single(Token::Dot)
                }
                '[' => self.attribute()?,
                '\'' | '"' => self.string(c)?,
                '0'..='9' | '.' => self.number()?,
                c if c.is_alphabetic() || c == '_' => self.identifier(),
                _ => self.operator()?,
            };
            tokens.push((token, start));
        }

        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.position += 1;
        token
    }

    fn attribute(&mut self) -> Result<Token, ExpressionError> {
        let start = self.position;
        let Some(end) = self.rest().find(']') else {
            return Err(ExpressionError::new("unterminated attribute name", start));
        };
        let name = self.rest()[1..end].trim().to_string();
        if name.is_empty() {
            return Err(ExpressionError::new("empty attribute name", start));
        }
        self.position += end + 1;
        Ok(Token::Attribute(name))
    }

    fn string(&mut self, quote: char) -> Result<Token, ExpressionError> {
        let start = self.position;
        let mut value = String::new();
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((offset, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                c if c == quote => {
                    self.position += offset + c.len_utf8();
                    return Ok(Token::Str(value));
                }
                c => value.push(c),
            }
        }

        Err(ExpressionError::new("unterminated string literal", start))
    }

    fn number(&mut self) -> Result<Token, ExpressionError> {
        let start = self.position;
        let rest = self.rest();
        let mut end = 0;
        let mut is_float = false;
        let bytes = rest.as_bytes();
        while end < bytes.len() {
            match bytes[end] {
                b'0'..=b'9' => end += 1,
                b'.' if !is_float => {
                    is_float = true;
                    end += 1;
                }
                b'e' | b'E' => {
                    is_float = true;
                    end += 1;
                    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
                        end += 1;
                    }
                }
                _ => break,
            }
        }

        let text = &rest[..end];
        self.position += end;
        let value = if is_float {
            text.parse().ok().map(Value::Double)
        } else {
            text.parse().ok().map(Value::Integer)
        };

        value
            .map(Token::Number)
            .ok_or_else(|| ExpressionError::new(format!("invalid number '{text}'"), start))
    }

    fn identifier(&mut self) -> Token {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
            .unwrap_or(rest.len());
        self.position += end;
        Token::Ident(rest[..end].to_string())
    }

    fn operator(&mut self) -> Result<Token, ExpressionError> {
        const OPERATORS: [(&str, Option<BinaryOp>); 16] = [
            ("==", Some(BinaryOp::Eq)),
            ("!=", Some(BinaryOp::NotEq)),
            ("<>", Some(BinaryOp::NotEq)),
            ("<=", Some(BinaryOp::LessEq)),
            (">=", Some(BinaryOp::GreaterEq)),
            ("&&", Some(BinaryOp::And)),
            ("||", Some(BinaryOp::Or)),
            ("=", Some(BinaryOp::Eq)),
            ("<", Some(BinaryOp::Less)),
            (">", Some(BinaryOp::Greater)),
            ("+", Some(BinaryOp::Add)),
            ("-", Some(BinaryOp::Sub)),
            ("*", Some(BinaryOp::Mul)),
            ("/", Some(BinaryOp::Div)),
            ("%", Some(BinaryOp::Rem)),
            ("!", None),
        ];

        for (text, op) in OPERATORS {
            if self.rest().starts_with(text) {
                self.position += text.len();
                return Ok(op.map_or(Token::Bang, Token::Op));
            }
        }

        Err(ExpressionError::new(
            format!("unexpected character '{}'", self.peek_char().unwrap_or_default()),
            self.position,
        ))
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    index: usize,
    end: usize,
}

pub(super) fn parse(source: &str) -> Result<Expression, ExpressionError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser {
        tokens,
        index: 0,
        end: source.len(),
    };

    let expr = parser.expression(0)?;
    match parser.tokens.get(parser.index) {
        None => Ok(expr),
        Some((_, position)) => Err(ExpressionError::new("unexpected token", *position)),
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|(token, _)| token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.index)
            .map_or(self.end, |(_, position)| *position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).map(|(token, _)| token.clone());
        self.index += 1;
        token
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ExpressionError> {
        let position = self.position();
        match self.next() {
            Some(token) if token == expected => Ok(()),
            _ => Err(ExpressionError::new(format!("expected {what}"), position)),
        }
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        match self.peek()? {
            Token::Op(op) => Some(*op),
            Token::Ident(word) if word.eq_ignore_ascii_case("and") => Some(BinaryOp::And),
            Token::Ident(word) if word.eq_ignore_ascii_case("or") => Some(BinaryOp::Or),
            _ => None,
        }
    }

    fn expression(&mut self, min_precedence: u8) -> Result<Expression, ExpressionError> {
        let mut left = self.prefix()?;

        while let Some(op) = self.binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }

            self.index += 1;
            let right = self.expression(precedence + 1)?;
            left = Expression::binary(op, left, right);
        }

        Ok(left)
    }

    fn prefix(&mut self) -> Result<Expression, ExpressionError> {
        match self.peek() {
            Some(Token::Bang) => {
                self.index += 1;
                self.unary(UnaryOp::Not, NOT_PRECEDENCE)
            }
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("not") => {
                self.index += 1;
                self.unary(UnaryOp::Not, NOT_PRECEDENCE)
            }
            Some(Token::Op(BinaryOp::Sub)) => {
                self.index += 1;
                self.unary(UnaryOp::Neg, NEG_PRECEDENCE)
            }
            _ => self.postfix(),
        }
    }

    fn unary(&mut self, op: UnaryOp, precedence: u8) -> Result<Expression, ExpressionError> {
        let expr = self.expression(precedence)?;
        Ok(Expression::Unary {
            op,
            expr: Box::new(expr),
        })
    }

    fn postfix(&mut self) -> Result<Expression, ExpressionError> {
        let mut expr = self.primary()?;

        while self.peek() == Some(&Token::Dot) {
            self.index += 1;
            let position = self.position();
            match self.next() {
                Some(Token::Ident(method)) if method == "match" => {}
                _ => return Err(ExpressionError::new("expected 'match'", position)),
            }

            self.expect(Token::LParen, "'('")?;
            let position = self.position();
            let pattern = match self.next() {
                Some(Token::Str(pattern)) => pattern,
                _ => return Err(ExpressionError::new("expected pattern string", position)),
            };
            let regex = Regex::new(&pattern)
                .map_err(|err| ExpressionError::new(format!("invalid pattern: {err}"), position))?;
            self.expect(Token::RParen, "')'")?;

            expr = Expression::Match {
                expr: Box::new(expr),
                regex,
            };
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expression, ExpressionError> {
        let position = self.position();
        match self.next() {
            Some(Token::Number(value)) => Ok(Expression::Literal(value)),
            Some(Token::Str(value)) => Ok(Expression::Literal(Value::String(value))),
            Some(Token::Attribute(name)) => Ok(Expression::Attribute(name)),
            Some(Token::Ident(word)) => Ok(match word.to_ascii_lowercase().as_str() {
                "true" => Expression::Literal(Value::Bool(true)),
                "false" => Expression::Literal(Value::Bool(false)),
                "null" => Expression::Literal(Value::Null),
                "and" | "or" | "not" => {
                    return Err(ExpressionError::new(
                        format!("unexpected keyword '{word}'"),
                        position,
                    ))
                }
                _ => Expression::Attribute(word),
            }),
            Some(Token::LParen) => {
                let expr = self.expression(0)?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }
            Some(_) => Err(ExpressionError::new("unexpected token", position)),
            None => Err(ExpressionError::new("unexpected end of expression", position)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexer_tokens() {
        let tokens: Vec<_> = Lexer::new("[a b]>=.5 and \"x\\\"y\"")
            .tokenize()
            .expect("valid")
            .into_iter()
            .map(|(token, _)| token)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Attribute("a b".into()),
                Token::Op(BinaryOp::GreaterEq),
                Token::Number(Value::Double(0.5)),
                Token::Ident("and".into()),
                Token::Str("x\"y".into()),
            ]
        );
    }

    #[test]
    fn not_binds_looser_than_comparison() {
        let expr = parse("!a = 1 or b").expect("valid");
        assert_eq!(
            expr,
            Expression::binary(
                BinaryOp::Or,
                Expression::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(Expression::binary(
                        BinaryOp::Eq,
                        Expression::attribute("a"),
                        Expression::literal(1),
                    )),
                },
                Expression::attribute("b"),
            )
        );
    }

    #[test]
    fn error_positions() {
        assert_eq!(parse("").map_err(|e| e.position), Err(0));
        assert_eq!(parse("[a] = ").map_err(|e| e.position), Err(6));
        assert_eq!(parse("[a] # 1").map_err(|e| e.position), Err(4));
        assert_eq!(parse("[a].len()").map_err(|e| e.position), Err(4));
    }
}
