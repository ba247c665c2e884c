use crate::script::ast::{BinaryOp, Expr, IndexArg, Lit, Stmt, UnaryOp};
use crate::script::error::ScriptError;
use crate::script::lexer::{Span, Token, TokenKind, lex};

/// Parse the expression body of `src`, which starts at byte `start`.
pub(crate) fn parse_expression(src: &str, start: usize) -> Result<Expr, ScriptError> {
    let mut p = Parser::new(src, start)?;
    if p.peek().kind == TokenKind::Eof {
        return Err(ScriptError::new(p.span().start, "empty expression"));
    }
    let expr = p.parse_cond()?;
    p.expect(TokenKind::Eof)?;
    Ok(expr)
}

/// Parse a statement body starting at byte `start`: `;`-separated statements, empty ones allowed.
pub(crate) fn parse_statements(src: &str, start: usize) -> Result<Vec<Stmt>, ScriptError> {
    let mut p = Parser::new(src, start)?;
    let mut out = Vec::new();
    loop {
        while p.consume(TokenKind::Semi) {}
        if p.peek().kind == TokenKind::Eof {
            break;
        }
        out.push(p.parse_stmt()?);
        if !p.consume(TokenKind::Semi) {
            p.expect(TokenKind::Eof)?;
            break;
        }
    }
    Ok(out)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(src: &str, start: usize) -> Result<Self, ScriptError> {
        Ok(Self {
            tokens: lex(src, start)?,
            pos: 0,
        })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ScriptError> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(ScriptError::new(
                self.span().start,
                format!("expected {kind:?}, found {:?}", self.peek().kind),
            ))
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ScriptError> {
        let start = self.span().start;
        let target = self.parse_cond()?;
        if !self.consume(TokenKind::Assign) {
            return Ok(Stmt::Expr(target));
        }
        let value = self.parse_cond()?;
        match target {
            Expr::Var { name, .. } => Ok(Stmt::Assign { name, value }),
            Expr::Index { base, indices, at } => match *base {
                Expr::Var { name, .. } => Ok(Stmt::IndexAssign {
                    name,
                    indices,
                    value,
                    at,
                }),
                _ => Err(ScriptError::new(
                    start,
                    "indexed assignment target must be a variable",
                )),
            },
            _ => Err(ScriptError::new(start, "invalid assignment target")),
        }
    }

    fn parse_cond(&mut self) -> Result<Expr, ScriptError> {
        let cond = self.parse_or()?;
        let at = self.span().start;
        if !self.consume(TokenKind::Question) {
            return Ok(cond);
        }
        let then = self.parse_cond()?;
        self.expect(TokenKind::Colon)?;
        let otherwise = self.parse_cond()?;
        Ok(Expr::Cond {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
            at,
        })
    }

    /// Left-associative binary level: `next (op next)*`.
    fn parse_level(
        &mut self,
        ops: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ScriptError>,
    ) -> Result<Expr, ScriptError> {
        let mut e = next(self)?;
        'outer: loop {
            let at = self.span().start;
            for (kind, op) in ops {
                if self.consume(kind.clone()) {
                    let r = next(self)?;
                    e = Expr::Binary {
                        op: *op,
                        left: Box::new(e),
                        right: Box::new(r),
                        at,
                    };
                    continue 'outer;
                }
            }
            return Ok(e);
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ScriptError> {
        self.parse_level(&[(TokenKind::OrOr, BinaryOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, ScriptError> {
        self.parse_level(&[(TokenKind::AndAnd, BinaryOp::And)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expr, ScriptError> {
        self.parse_level(
            &[(TokenKind::EqEq, BinaryOp::Eq), (TokenKind::Ne, BinaryOp::Ne)],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<Expr, ScriptError> {
        self.parse_level(
            &[
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Le, BinaryOp::Le),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::Ge, BinaryOp::Ge),
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expr, ScriptError> {
        self.parse_level(
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Sub),
            ],
            Self::parse_factor,
        )
    }

    fn parse_factor(&mut self) -> Result<Expr, ScriptError> {
        self.parse_level(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr, ScriptError> {
        let at = self.span().start;
        let op = if self.consume(TokenKind::Minus) {
            UnaryOp::Neg
        } else if self.consume(TokenKind::Bang) {
            UnaryOp::Not
        } else {
            return self.parse_postfix();
        };
        let e = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            expr: Box::new(e),
            at,
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ScriptError> {
        let mut e = self.parse_primary()?;

        loop {
            let at = self.span().start;
            if self.consume(TokenKind::Dot) {
                let t = self.bump().clone();
                let TokenKind::Ident(name) = t.kind else {
                    return Err(ScriptError::new(
                        t.span.start,
                        format!("expected ident after '.', found {:?}", t.kind),
                    ));
                };
                e = Expr::Attr {
                    base: Box::new(e),
                    name,
                    at,
                };
                continue;
            }

            if self.consume(TokenKind::LParen) {
                let Expr::Var { name, at } = e else {
                    return Err(ScriptError::new(at, "call target must be an identifier"));
                };
                let args = self.parse_args()?;
                e = Expr::Call {
                    func: name,
                    args,
                    at,
                };
                continue;
            }

            if self.consume(TokenKind::LBracket) {
                let indices = self.parse_indices()?;
                e = Expr::Index {
                    base: Box::new(e),
                    indices,
                    at,
                };
                continue;
            }

            break;
        }

        Ok(e)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ScriptError> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_cond()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn parse_indices(&mut self) -> Result<Vec<IndexArg>, ScriptError> {
        let open = self.span().start;
        let mut out = Vec::new();
        loop {
            out.push(self.parse_index_arg()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RBracket)?;
            break;
        }
        if out.len() > 3 {
            return Err(ScriptError::new(
                open,
                format!("at most 3 indices (rows, cols, chans) are allowed, got {}", out.len()),
            ));
        }
        Ok(out)
    }

    fn at_slice_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Colon | TokenKind::Comma | TokenKind::RBracket
        )
    }

    fn parse_index_arg(&mut self) -> Result<IndexArg, ScriptError> {
        let start = if self.consume(TokenKind::Colon) {
            None
        } else {
            let e = self.parse_or()?;
            if !self.consume(TokenKind::Colon) {
                return Ok(IndexArg::At(e));
            }
            Some(e)
        };
        let stop = if self.at_slice_end() {
            None
        } else {
            Some(self.parse_or()?)
        };
        let step = if self.consume(TokenKind::Colon) && !self.at_slice_end() {
            Some(self.parse_or()?)
        } else {
            None
        };
        Ok(IndexArg::Slice { start, stop, step })
    }

    fn parse_primary(&mut self) -> Result<Expr, ScriptError> {
        let t = self.bump().clone();
        match t.kind {
            TokenKind::Number(v) => Ok(Expr::Lit(Lit::F64(v))),
            TokenKind::True => Ok(Expr::Lit(Lit::Bool(true))),
            TokenKind::False => Ok(Expr::Lit(Lit::Bool(false))),
            TokenKind::Ident(name) => Ok(Expr::Var {
                name,
                at: t.span.start,
            }),
            TokenKind::LParen => {
                let e = self.parse_cond()?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            other => Err(ScriptError::new(
                t.span.start,
                format!("unexpected token {other:?}"),
            )),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/parser.rs"]
mod tests;
