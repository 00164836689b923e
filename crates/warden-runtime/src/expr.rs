//! CEL-flavoured condition expressions.
//!
//! [`ExprConditionEvaluator`] implements the [`ConditionEvaluator`]
//! port for the expression subset grant conditions actually use:
//!
//! ```text
//! res.size_mb <= 20
//! res.owner == "alice" && res.size_mb < 100
//! !(res.quarantined == true) || res.reviewed == true
//! ```
//!
//! Grammar (precedence low → high):
//!
//! ```text
//! expr       := and ("||" and)*
//! and        := unary ("&&" unary)*
//! unary      := "!" unary | comparison
//! comparison := operand (("==" | "!=" | "<" | "<=" | ">" | ">=") operand)?
//! operand    := number | string | "true" | "false" | variable | "(" expr ")"
//! variable   := ident ("." ident)*
//! ```
//!
//! Resource attributes are bound under the `res.` namespace, so
//! `res.size_mb` reads the attribute named `size_mb`; bare names
//! resolve as well. Anything the evaluator cannot answer (parse
//! failure, undefined variable, operand type mismatch, non-boolean
//! result) is a [`ConditionError`], never a silent `false`; the
//! engine turns that into a fail-closed denial.
//!
//! Parsed expressions are cached per evaluator instance, so repeated
//! conditions skip compilation entirely. The cache is bounded; once
//! full, unseen expressions still evaluate, just without being
//! retained.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use warden_auth::{ConditionError, ConditionEvaluator};
use warden_types::{AttrValue, ResourceAttributes};

/// Namespace prefix under which resource attributes are bound.
const RES_NAMESPACE: &str = "res.";

/// Upper bound on retained compiled expressions.
///
/// Grant conditions come from role provisioning, so the set of
/// distinct expressions is small in practice; the cap only matters if
/// conditions ever become user-authored. Beyond it, expressions are
/// parsed per call instead of evicting earlier entries.
const COMPILED_CACHE_CAP: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(AttrValue),
    Var(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Cmp {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    True,
    False,
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
    Cmp(CmpOp),
}

fn tokenize(expression: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '&' => {
                chars.next();
                match chars.next_if(|&(_, c)| c == '&') {
                    Some(_) => tokens.push(Token::AndAnd),
                    None => return Err(format!("expected '&&' at offset {pos}")),
                }
            }
            '|' => {
                chars.next();
                match chars.next_if(|&(_, c)| c == '|') {
                    Some(_) => tokens.push(Token::OrOr),
                    None => return Err(format!("expected '||' at offset {pos}")),
                }
            }
            '=' => {
                chars.next();
                match chars.next_if(|&(_, c)| c == '=') {
                    Some(_) => tokens.push(Token::Cmp(CmpOp::Eq)),
                    None => return Err(format!("expected '==' at offset {pos}")),
                }
            }
            '!' => {
                chars.next();
                match chars.next_if(|&(_, c)| c == '=') {
                    Some(_) => tokens.push(Token::Cmp(CmpOp::Ne)),
                    None => tokens.push(Token::Bang),
                }
            }
            '<' => {
                chars.next();
                match chars.next_if(|&(_, c)| c == '=') {
                    Some(_) => tokens.push(Token::Cmp(CmpOp::Le)),
                    None => tokens.push(Token::Cmp(CmpOp::Lt)),
                }
            }
            '>' => {
                chars.next();
                match chars.next_if(|&(_, c)| c == '=') {
                    Some(_) => tokens.push(Token::Cmp(CmpOp::Ge)),
                    None => tokens.push(Token::Cmp(CmpOp::Gt)),
                }
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    text.push(c);
                }
                if !closed {
                    return Err(format!("unterminated string starting at offset {pos}"));
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() => {
                let mut literal = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number: f64 = literal
                    .parse()
                    .map_err(|_| format!("invalid number '{literal}' at offset {pos}"))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match name.as_str() {
                    "true" => tokens.push(Token::True),
                    "false" => tokens.push(Token::False),
                    _ => tokens.push(Token::Ident(name)),
                }
            }
            other => return Err(format!("unexpected character '{other}' at offset {pos}")),
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser over the token stream.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn parse(tokens: Vec<Token>) -> Result<Expr, String> {
        let mut parser = Self { tokens, pos: 0 };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(format!("unexpected trailing token {token:?}")),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.next();
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.next();
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::Bang) {
            self.next();
            let inner = self.unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let lhs = self.operand()?;
        if let Some(&Token::Cmp(op)) = self.peek() {
            self.next();
            let rhs = self.operand()?;
            return Ok(Expr::Cmp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn operand(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Literal(AttrValue::Number(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(AttrValue::Text(s))),
            Some(Token::True) => Ok(Expr::Literal(AttrValue::Bool(true))),
            Some(Token::False) => Ok(Expr::Literal(AttrValue::Bool(false))),
            Some(Token::Ident(name)) => Ok(Expr::Var(name)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("expected ')'".to_string()),
                }
            }
            Some(token) => Err(format!("unexpected token {token:?}")),
            None => Err("unexpected end of input".to_string()),
        }
    }
}

fn resolve<'a>(
    name: &str,
    attributes: &'a ResourceAttributes,
) -> Result<&'a AttrValue, ConditionError> {
    attributes
        .get(name)
        .or_else(|| {
            name.strip_prefix(RES_NAMESPACE)
                .and_then(|bare| attributes.get(bare))
        })
        .ok_or_else(|| ConditionError::UndefinedVariable {
            name: name.to_string(),
        })
}

fn eval(expr: &Expr, attributes: &ResourceAttributes) -> Result<AttrValue, ConditionError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Var(name) => resolve(name, attributes).cloned(),
        Expr::Not(inner) => match eval(inner, attributes)? {
            AttrValue::Bool(b) => Ok(AttrValue::Bool(!b)),
            other => Err(ConditionError::TypeMismatch {
                message: format!("'!' applied to non-boolean {other}"),
            }),
        },
        Expr::And(lhs, rhs) => {
            // Short-circuit: the right side is only evaluated on demand
            match eval(lhs, attributes)? {
                AttrValue::Bool(false) => Ok(AttrValue::Bool(false)),
                AttrValue::Bool(true) => expect_bool(eval(rhs, attributes)?, "&&"),
                other => Err(ConditionError::TypeMismatch {
                    message: format!("'&&' applied to non-boolean {other}"),
                }),
            }
        }
        Expr::Or(lhs, rhs) => match eval(lhs, attributes)? {
            AttrValue::Bool(true) => Ok(AttrValue::Bool(true)),
            AttrValue::Bool(false) => expect_bool(eval(rhs, attributes)?, "||"),
            other => Err(ConditionError::TypeMismatch {
                message: format!("'||' applied to non-boolean {other}"),
            }),
        },
        Expr::Cmp { op, lhs, rhs } => {
            let lhs = eval(lhs, attributes)?;
            let rhs = eval(rhs, attributes)?;
            compare(*op, &lhs, &rhs).map(AttrValue::Bool)
        }
    }
}

fn expect_bool(value: AttrValue, operator: &str) -> Result<AttrValue, ConditionError> {
    match value {
        AttrValue::Bool(_) => Ok(value),
        other => Err(ConditionError::TypeMismatch {
            message: format!("'{operator}' applied to non-boolean {other}"),
        }),
    }
}

fn compare(op: CmpOp, lhs: &AttrValue, rhs: &AttrValue) -> Result<bool, ConditionError> {
    use AttrValue::{Bool, Number, Text};

    match (op, lhs, rhs) {
        (CmpOp::Eq, Number(a), Number(b)) => Ok(a == b),
        (CmpOp::Ne, Number(a), Number(b)) => Ok(a != b),
        (CmpOp::Lt, Number(a), Number(b)) => Ok(a < b),
        (CmpOp::Le, Number(a), Number(b)) => Ok(a <= b),
        (CmpOp::Gt, Number(a), Number(b)) => Ok(a > b),
        (CmpOp::Ge, Number(a), Number(b)) => Ok(a >= b),
        (CmpOp::Eq, Text(a), Text(b)) => Ok(a == b),
        (CmpOp::Ne, Text(a), Text(b)) => Ok(a != b),
        (CmpOp::Eq, Bool(a), Bool(b)) => Ok(a == b),
        (CmpOp::Ne, Bool(a), Bool(b)) => Ok(a != b),
        _ => Err(ConditionError::TypeMismatch {
            message: format!("cannot apply '{}' to {lhs} and {rhs}", op.as_str()),
        }),
    }
}

/// Condition evaluator for the CEL-flavoured expression subset.
///
/// Stateless apart from the compiled-expression cache; cloning shares
/// the cache. Safe to use from any number of threads.
///
/// # Example
///
/// ```
/// use warden_auth::ConditionEvaluator;
/// use warden_runtime::ExprConditionEvaluator;
/// use warden_types::ResourceAttributes;
///
/// let evaluator = ExprConditionEvaluator::new();
/// let attrs = ResourceAttributes::builder()
///     .attr("size_mb", 15.5)
///     .attr("owner", "alice")
///     .build();
///
/// assert!(evaluator.evaluate_condition("res.size_mb <= 20", &attrs)?);
/// assert!(!evaluator.evaluate_condition("res.owner == \"bob\"", &attrs)?);
///
/// // Unknown variables are errors, not false
/// assert!(evaluator
///     .evaluate_condition("res.ghost == 1", &attrs)
///     .is_err());
/// # Ok::<(), warden_auth::ConditionError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExprConditionEvaluator {
    compiled: Arc<RwLock<HashMap<String, Arc<Expr>>>>,
}

impl ExprConditionEvaluator {
    /// Creates an evaluator with an empty expression cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct expressions compiled so far.
    #[must_use]
    pub fn compiled_expressions(&self) -> usize {
        self.compiled.read().len()
    }

    fn compile(&self, expression: &str) -> Result<Arc<Expr>, ConditionError> {
        if let Some(expr) = self.compiled.read().get(expression) {
            return Ok(Arc::clone(expr));
        }

        let parsed = tokenize(expression)
            .and_then(Parser::parse)
            .map(Arc::new)
            .map_err(|message| ConditionError::Parse {
                expression: expression.to_string(),
                message,
            })?;

        let mut compiled = self.compiled.write();
        if compiled.len() < COMPILED_CACHE_CAP {
            compiled
                .entry(expression.to_string())
                .or_insert_with(|| Arc::clone(&parsed));
        }
        Ok(parsed)
    }
}

impl ConditionEvaluator for ExprConditionEvaluator {
    fn evaluate_condition(
        &self,
        expression: &str,
        attributes: &ResourceAttributes,
    ) -> Result<bool, ConditionError> {
        let expr = self.compile(expression)?;
        match eval(&expr, attributes)? {
            AttrValue::Bool(result) => Ok(result),
            _ => Err(ConditionError::NotBoolean),
        }
    }
}
