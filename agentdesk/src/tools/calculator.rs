//! Arithmetic tool backed by a whitelist expression parser.
//!
//! Only numeric literals, the operators `+ - * / // % **`, parentheses,
//! list literals and the functions `abs`, `min`, `max`, `round` and `sum`
//! are recognized. Anything else is a parse error, so nothing the model
//! sends is ever evaluated as code.
//!
//! ```
//! use agentdesk::tools::calculate;
//!
//! assert_eq!(calculate("7 * 8"), "Result: 56");
//! assert!(calculate("import os").starts_with("Calculation error"));
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base_tool::{string_arg, BaseTool, FunctionDeclaration, ToolResult};

const MAX_EXPRESSION_LEN: usize = 256;
const MAX_DEPTH: usize = 32;
/// Guards `**` against exponents that only produce overflow.
const MAX_EXPONENT: f64 = 1_000.0;

/// Evaluates `expression` and renders the outcome as model-facing text.
pub fn calculate(expression: &str) -> String {
    match evaluate(expression) {
        Ok(value) => format!("Result: {}", format_number(value)),
        Err(err) => format!("Calculation error: {err}"),
    }
}

/// Evaluates `expression` to a finite number.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(CalcError::TooLong);
    }
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    if let Some(token) = parser.peek() {
        return Err(CalcError::UnexpectedToken(token.to_string()));
    }

    let number = value.into_number()?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(CalcError::NonFinite)
    }
}

fn format_number(value: f64) -> String {
    // -0.0 + 0.0 is +0.0
    let value = value + 0.0;
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("empty expression")]
    Empty,
    #[error("expression is too long")]
    TooLong,
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("'{0}' is not an allowed function")]
    UnknownName(String),
    #[error("{0}")]
    BadArguments(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("a list can only be passed to a function")]
    StrayList,
    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    DoubleStar,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Ident(name) => f.write_str(name),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::DoubleSlash => f.write_str("//"),
            Token::Percent => f.write_str("%"),
            Token::DoubleStar => f.write_str("**"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::Comma => f.write_str(","),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '_') {
                    i += 1;
                }
                // Scientific notation: 1e3, 2.5E-4
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let raw: String = chars[start..i].iter().collect();
                let number = raw
                    .replace('_', "")
                    .parse::<f64>()
                    .map_err(|_| CalcError::InvalidNumber(raw.clone()))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::DoubleStar);
                i += 2;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' | '×' => Token::Star,
                    '/' | '÷' => Token::Slash,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    ',' => Token::Comma,
                    other => return Err(CalcError::UnexpectedChar(other)),
                };
                tokens.push(token);
                i += 1;
            }
        }
    }

    Ok(tokens)
}

/// Intermediate value: lists only exist as function arguments.
#[derive(Debug, Clone)]
enum Operand {
    Number(f64),
    List(Vec<f64>),
}

impl Operand {
    fn into_number(self) -> Result<f64, CalcError> {
        match self {
            Operand::Number(n) => Ok(n),
            Operand::List(_) => Err(CalcError::StrayList),
        }
    }
}

/// Recursive descent. Unary minus binds looser than `**`, so `-2**2` is -4.
///
/// ```text
/// expression := term (("+" | "-") term)*
/// term       := unary (("*" | "/" | "//" | "%") unary)*
/// unary      := ("+" | "-") unary | power
/// power      := primary ("**" unary)?
/// primary    := number | "(" expression ")" | "[" list "]" | name "(" list ")"
/// ```
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, CalcError> {
        let token = self.tokens.get(self.pos).cloned().ok_or(CalcError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> Result<(), CalcError> {
        let token = self.next()?;
        if &token == expected {
            Ok(())
        } else {
            Err(CalcError::UnexpectedToken(token.to_string()))
        }
    }

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(CalcError::TooDeep)
        } else {
            Ok(())
        }
    }

    fn expression(&mut self) -> Result<Operand, CalcError> {
        let mut left = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek().cloned() {
            self.pos += 1;
            let lhs = left.into_number()?;
            let rhs = self.term()?.into_number()?;
            left = Operand::Number(if op == Token::Plus { lhs + rhs } else { lhs - rhs });
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Operand, CalcError> {
        let mut left = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)) =
            self.peek().cloned()
        {
            self.pos += 1;
            let lhs = left.into_number()?;
            let rhs = self.unary()?.into_number()?;
            let value = match op {
                Token::Star => lhs * rhs,
                _ if rhs == 0.0 => return Err(CalcError::DivisionByZero),
                Token::Slash => lhs / rhs,
                Token::DoubleSlash => (lhs / rhs).floor(),
                // Sign follows the divisor.
                _ => lhs - rhs * (lhs / rhs).floor(),
            };
            left = Operand::Number(value);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Operand, CalcError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?.into_number()?;
                self.depth -= 1;
                Ok(Operand::Number(-value))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?.into_number()?;
                self.depth -= 1;
                Ok(Operand::Number(value))
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Operand, CalcError> {
        let base = self.primary()?;
        if self.peek() != Some(&Token::DoubleStar) {
            return Ok(base);
        }
        self.pos += 1;
        let base = base.into_number()?;
        self.descend()?;
        let exponent = self.unary()?.into_number()?;
        self.depth -= 1;

        if exponent.abs() > MAX_EXPONENT {
            return Err(CalcError::BadArguments(format!(
                "exponent {exponent} is out of range"
            )));
        }
        if base == 0.0 && exponent < 0.0 {
            return Err(CalcError::DivisionByZero);
        }
        Ok(Operand::Number(base.powf(exponent)))
    }

    fn primary(&mut self) -> Result<Operand, CalcError> {
        match self.next()? {
            Token::Number(n) => Ok(Operand::Number(n)),
            Token::LParen => {
                self.descend()?;
                let value = self.expression()?;
                self.expect(&Token::RParen)?;
                self.depth -= 1;
                Ok(value)
            }
            Token::LBracket => {
                self.descend()?;
                let items = self.items(&Token::RBracket)?;
                self.depth -= 1;
                Ok(Operand::List(items))
            }
            Token::Ident(name) => {
                let function = Function::lookup(&name).ok_or(CalcError::UnknownName(name))?;
                self.expect(&Token::LParen)?;
                self.descend()?;
                let args = self.arguments()?;
                self.depth -= 1;
                function.apply(args).map(Operand::Number)
            }
            other => Err(CalcError::UnexpectedToken(other.to_string())),
        }
    }

    /// Comma separated numbers up to `close`, which is consumed.
    fn items(&mut self, close: &Token) -> Result<Vec<f64>, CalcError> {
        let mut items = Vec::new();
        if self.peek() == Some(close) {
            self.pos += 1;
            return Ok(items);
        }
        loop {
            items.push(self.expression()?.into_number()?);
            match self.next()? {
                Token::Comma => continue,
                token if &token == close => return Ok(items),
                token => return Err(CalcError::UnexpectedToken(token.to_string())),
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Operand>, CalcError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            match self.next()? {
                Token::Comma => continue,
                Token::RParen => return Ok(args),
                token => return Err(CalcError::UnexpectedToken(token.to_string())),
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Function {
    Abs,
    Min,
    Max,
    Round,
    Sum,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "abs" => Some(Function::Abs),
            "min" => Some(Function::Min),
            "max" => Some(Function::Max),
            "round" => Some(Function::Round),
            "sum" => Some(Function::Sum),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Min => "min",
            Function::Max => "max",
            Function::Round => "round",
            Function::Sum => "sum",
        }
    }

    fn apply(self, args: Vec<Operand>) -> Result<f64, CalcError> {
        let bad = |reason: &str| CalcError::BadArguments(format!("{}() {reason}", self.name()));

        match self {
            Function::Abs => match args.as_slice() {
                [Operand::Number(n)] => Ok(n.abs()),
                _ => Err(bad("takes exactly one number")),
            },
            Function::Round => match args.as_slice() {
                [Operand::Number(n)] => Ok(round_half_even(*n)),
                [Operand::Number(n), Operand::Number(digits)] => {
                    if digits.fract() != 0.0 || digits.abs() > 15.0 {
                        return Err(bad("digits must be a small integer"));
                    }
                    let scale = 10f64.powi(*digits as i32);
                    Ok(round_half_even(n * scale) / scale)
                }
                _ => Err(bad("takes a number and optional digits")),
            },
            Function::Sum => match args.as_slice() {
                [Operand::List(items)] => Ok(items.iter().sum()),
                _ => Err(bad("takes one list")),
            },
            Function::Min | Function::Max => {
                let single = args.len() == 1;
                let mut values = Vec::new();
                for arg in args {
                    match arg {
                        Operand::Number(n) => values.push(n),
                        Operand::List(items) if single => values.extend(items),
                        Operand::List(_) => return Err(CalcError::StrayList),
                    }
                }
                let fold = if matches!(self, Function::Min) { f64::min } else { f64::max };
                values
                    .into_iter()
                    .reduce(fold)
                    .ok_or_else(|| bad("needs at least one value"))
            }
        }
    }
}

/// Rounds half to even.
fn round_half_even(value: f64) -> f64 {
    let rounded = value.round();
    if (value - value.trunc()).abs() == 0.5 && rounded % 2.0 != 0.0 {
        rounded - value.signum()
    } else {
        rounded
    }
}

/// The `calculate` tool offered to the expert's model.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorTool;

#[async_trait]
impl BaseTool for CalculatorTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports + - * / // % **, parentheses \
         and the functions abs, min, max, round and sum."
    }

    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration::new(
            self.name(),
            self.description(),
            json!({
                "type": "object",
                "properties": {
                    "expression": {
                        "type": "string",
                        "description": "Arithmetic expression, for example '(15 + 25) * 2'"
                    }
                },
                "required": ["expression"]
            }),
        )
    }

    async fn run_async(&self, args: HashMap<String, Value>) -> ToolResult {
        let expression = match string_arg(&args, "expression") {
            Ok(expression) => expression,
            Err(missing) => return missing,
        };
        let text = calculate(expression);
        tracing::debug!(expression, result = %text, "calculator invoked");
        ToolResult::success(Value::String(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplies() {
        assert!(calculate("7*8").contains("56"));
        assert_eq!(calculate("15 + 25"), "Result: 40");
    }

    #[test]
    fn rejects_code() {
        assert!(calculate("import os").starts_with("Calculation error"));
        assert!(calculate("__import__('os').system('ls')").starts_with("Calculation error"));
        assert!(calculate("open").starts_with("Calculation error"));
    }

    #[test]
    fn follows_operator_precedence() {
        assert_eq!(evaluate("-2**2"), Ok(-4.0));
        assert_eq!(evaluate("2**3**2"), Ok(512.0));
        assert_eq!(evaluate("2 + 3 * 4"), Ok(14.0));
        assert_eq!(evaluate("(2 + 3) * 4"), Ok(20.0));
        assert_eq!(evaluate("2**-1"), Ok(0.5));
    }

    #[test]
    fn floor_division_and_modulo_follow_divisor_sign() {
        assert_eq!(evaluate("7 // 2"), Ok(3.0));
        assert_eq!(evaluate("-7 // 2"), Ok(-4.0));
        assert_eq!(evaluate("-7 % 3"), Ok(2.0));
        assert_eq!(evaluate("7 % -3"), Ok(-2.0));
    }

    #[test]
    fn functions_and_lists() {
        assert_eq!(evaluate("sum([1, 2, 3.5])"), Ok(6.5));
        assert_eq!(evaluate("max(3, 9, 4)"), Ok(9.0));
        assert_eq!(evaluate("min([4, -1])"), Ok(-1.0));
        assert_eq!(evaluate("abs(-12)"), Ok(12.0));
        assert_eq!(evaluate("round(2.5)"), Ok(2.0));
        assert_eq!(evaluate("round(3.14159, 2)"), Ok(3.14));
        assert_eq!(evaluate("sum([])"), Ok(0.0));
    }

    #[test]
    fn formats_fractions_and_integers() {
        assert_eq!(calculate("7 / 2"), "Result: 3.5");
        assert_eq!(calculate("10 / 2"), "Result: 5");
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        assert_eq!(calculate("-0"), "Result: 0");
        assert_eq!(calculate("0 * -1"), "Result: 0");
        assert_eq!(calculate("-0.0 / 4"), "Result: 0");
    }

    #[test]
    fn reports_malformed_input() {
        assert_eq!(calculate("1 / 0"), "Calculation error: division by zero");
        assert!(calculate("").starts_with("Calculation error"));
        assert!(calculate("(1 + 2").starts_with("Calculation error"));
        assert!(calculate("1 +").starts_with("Calculation error"));
        assert!(calculate("[1, 2]").starts_with("Calculation error"));
        assert!(calculate("2 ** 5000").starts_with("Calculation error"));
        assert!(calculate("1; 2").starts_with("Calculation error"));
    }

    #[test]
    fn limits_length_and_depth() {
        let long = "1+".repeat(200) + "1";
        assert_eq!(evaluate(&long), Err(CalcError::TooLong));

        let deep = format!("{}1{}", "(".repeat(40), ")".repeat(40));
        assert_eq!(evaluate(&deep), Err(CalcError::TooDeep));
    }

    #[tokio::test]
    async fn tool_reports_missing_argument() {
        let result = CalculatorTool.run_async(HashMap::new()).await;
        assert!(!result.success);

        let mut args = HashMap::new();
        args.insert("expression".to_string(), json!("6 * 7"));
        let result = CalculatorTool.run_async(args).await;
        assert!(result.success);
        assert_eq!(result.to_model_text(), "Result: 42");
    }
}
