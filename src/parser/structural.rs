//! Recursive descent extraction of the declaration tree.
//!
//! Best-effort by construction: every parse function either succeeds or
//! records a diagnostic and skips to a synchronizing token (`;` or `}`),
//! so a single broken construct never takes down the rest of the file.
//! A file that produced any syntax error yields `is_partial = true`.

use smol_str::SmolStr;

use super::lexer::{Token, TokenKind, tokenize};
use crate::base::{Position, Span};
use crate::syntax::{
    BinaryOp, Composition, Diagnostic, Expr, LiteralKind, Method, MethodQualifiers, MixinRef,
    Param, ParseOutcome, ShaderDecl, Stmt, StructDef, StructField, TemplateParam, UnaryOp,
    VarQualifiers, Variable, codes,
};

const KW_SHADER: &str = "shader";
const KW_EFFECT: &str = "effect";
const KW_COMPOSE: &str = "compose";
const KW_STRUCT: &str = "struct";
const KW_CBUFFER: &str = "cbuffer";
const KW_STAGE: &str = "stage";
const KW_STREAM: &str = "stream";
const KW_OVERRIDE: &str = "override";
const KW_ABSTRACT: &str = "abstract";
const KW_RETURN: &str = "return";
const KW_IF: &str = "if";
const KW_ELSE: &str = "else";
const KW_FOR: &str = "for";

/// Modifiers that carry no structural meaning for analysis.
const IGNORED_MODIFIERS: &[&str] = &["inline", "static", "const", "internal", "clone"];

/// Parameter direction modifiers.
const PARAM_MODIFIERS: &[&str] = &["in", "out", "inout"];

/// Parse one shader source file into a declaration tree.
///
/// `fallback_name` (the file stem) is used when the declaration header is
/// too broken to read a name from.
pub fn parse_source(fallback_name: &str, source: &str) -> ParseOutcome {
    let tokens = tokenize(source);
    Parser::new(source, tokens).parse_file(fallback_name)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    line_starts: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Token<'a>>) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            source,
            tokens,
            pos: 0,
            line_starts,
            diagnostics: Vec::new(),
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn nth(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + n)
    }

    fn kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn text(&self) -> &'a str {
        self.current().map(|t| t.text).unwrap_or("")
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == Some(kind)
    }

    fn at_ident(&self, word: &str) -> bool {
        self.at(TokenKind::Ident) && self.text() == word
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Consume the current token if it matches, otherwise record an error.
    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error_here(format!("expected {what}"));
            false
        }
    }

    // =========================================================================
    // Positions and spans
    // =========================================================================

    fn position_at(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&s| s <= offset) - 1;
        Position::new(line, offset - self.line_starts[line])
    }

    fn token_span(&self, index: usize) -> Span {
        match self.tokens.get(index) {
            Some(t) => Span::new(
                self.position_at(u32::from(t.offset) as usize),
                self.position_at(u32::from(t.end_offset()) as usize),
            ),
            None => self.eof_span(),
        }
    }

    fn current_span(&self) -> Span {
        self.token_span(self.pos)
    }

    /// Span from a starting token index to the last consumed token.
    fn span_from(&self, start_index: usize) -> Span {
        let start = self.token_span(start_index);
        let end = self.token_span(self.pos.saturating_sub(1).max(start_index));
        Span::new(start.start, end.end)
    }

    fn eof_span(&self) -> Span {
        let end = self.position_at(self.source.len());
        Span::new(end, end)
    }

    fn error_here(&mut self, message: String) {
        let span = self.current_span();
        self.diagnostics
            .push(Diagnostic::error(span, message).with_code(codes::SYNTAX_ERROR));
    }

    /// Skip to the next synchronizing token, consuming it if it is `;`.
    fn recover(&mut self) {
        while !self.at_eof() {
            match self.kind() {
                Some(TokenKind::Semicolon) => {
                    self.bump();
                    return;
                }
                Some(TokenKind::RBrace) | Some(TokenKind::LBrace) => return,
                _ => self.bump(),
            }
        }
    }

    /// Skip a balanced `{ ... }` block, assuming the cursor is at `{`.
    fn skip_braced_block(&mut self) {
        if !self.at(TokenKind::LBrace) {
            return;
        }
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.kind() {
                Some(TokenKind::LBrace) => depth += 1,
                Some(TokenKind::RBrace) => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return;
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    // =========================================================================
    // File and declaration header
    // =========================================================================

    fn parse_file(mut self, fallback_name: &str) -> ParseOutcome {
        // Tolerate leading junk (preprocessor lines, stray tokens) before
        // the first shader/effect keyword.
        while !self.at_eof() && !self.at_ident(KW_SHADER) && !self.at_ident(KW_EFFECT) {
            self.bump();
        }

        if self.at_eof() {
            let span = self.eof_span();
            let mut diagnostics = self.diagnostics;
            diagnostics.push(
                Diagnostic::error(span, "no shader declaration found")
                    .with_code(codes::SYNTAX_ERROR),
            );
            return ParseOutcome {
                decl: None,
                diagnostics,
            };
        }

        let mut decl = self.parse_shader_decl(fallback_name);
        decl.is_partial = self.diagnostics.iter().any(|d| d.code.is_some());
        ParseOutcome::new(decl, self.diagnostics)
    }

    fn parse_shader_decl(&mut self, fallback_name: &str) -> ShaderDecl {
        let start = self.pos;
        self.bump(); // shader / effect

        let mut decl = ShaderDecl::default();
        if self.at(TokenKind::Ident) {
            decl.name = SmolStr::new(self.text());
            self.bump();
        } else {
            self.error_here("expected shader name".into());
            decl.name = SmolStr::new(fallback_name);
        }

        if self.at(TokenKind::Lt) {
            decl.template_params = self.parse_template_params();
        }

        if self.at(TokenKind::Colon) {
            self.bump();
            decl.bases = self.parse_base_list();
        }

        if self.expect(TokenKind::LBrace, "'{'") {
            while !self.at_eof() && !self.at(TokenKind::RBrace) {
                let before = self.pos;
                self.parse_member(&mut decl);
                if self.pos == before {
                    // Whatever this is, never loop on it.
                    self.error_here("unexpected token in shader body".into());
                    self.bump();
                }
            }
            self.expect(TokenKind::RBrace, "'}'");
        }

        decl.span = self.span_from(start);
        decl
    }

    fn parse_template_params(&mut self) -> Vec<TemplateParam> {
        let mut params = Vec::new();
        self.bump(); // <
        while !self.at_eof() && !self.at(TokenKind::Gt) {
            let start = self.pos;
            if self.at(TokenKind::Ident) && self.nth(1).map(|t| t.kind) == Some(TokenKind::Ident) {
                let type_name = SmolStr::new(self.text());
                self.bump();
                let name = SmolStr::new(self.text());
                self.bump();
                // Skip any default value up to the next separator.
                while !self.at_eof() && !self.at(TokenKind::Comma) && !self.at(TokenKind::Gt) {
                    self.bump();
                }
                params.push(TemplateParam {
                    name,
                    type_name,
                    span: self.span_from(start),
                });
            } else {
                self.error_here("expected template parameter".into());
                while !self.at_eof() && !self.at(TokenKind::Comma) && !self.at(TokenKind::Gt) {
                    self.bump();
                }
            }
            if self.at(TokenKind::Comma) {
                self.bump();
            }
        }
        self.expect(TokenKind::Gt, "'>'");
        params
    }

    fn parse_base_list(&mut self) -> Vec<MixinRef> {
        let mut bases = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::LBrace) {
            if self.at(TokenKind::Ident) {
                bases.push(self.parse_base_ref());
            } else {
                self.error_here("expected base shader name".into());
                self.bump();
            }
            if self.at(TokenKind::Comma) {
                self.bump();
            }
        }
        bases
    }

    /// One base reference, template arguments included verbatim from source.
    fn parse_base_ref(&mut self) -> MixinRef {
        let start_index = self.pos;
        let start_offset = u32::from(self.tokens[self.pos].offset) as usize;
        let mut end_offset = u32::from(self.tokens[self.pos].end_offset()) as usize;
        self.bump();

        if self.at(TokenKind::Lt) {
            let mut depth = 0usize;
            while !self.at_eof() {
                match self.kind() {
                    Some(TokenKind::Lt) => depth += 1,
                    Some(TokenKind::Gt) => {
                        depth -= 1;
                        if depth == 0 {
                            end_offset =
                                u32::from(self.tokens[self.pos].end_offset()) as usize;
                            self.bump();
                            break;
                        }
                    }
                    Some(TokenKind::ShrOp) => {
                        // `>>` closing two nested argument lists at once.
                        depth = depth.saturating_sub(2);
                        end_offset = u32::from(self.tokens[self.pos].end_offset()) as usize;
                        self.bump();
                        if depth == 0 {
                            break;
                        }
                        continue;
                    }
                    None => break,
                    _ => {}
                }
                end_offset = u32::from(self.tokens[self.pos].end_offset()) as usize;
                self.bump();
            }
        }

        let full = &self.source[start_offset..end_offset];
        MixinRef::new(full, self.span_from(start_index))
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn parse_member(&mut self, decl: &mut ShaderDecl) {
        let start = self.pos;
        let mut vq = VarQualifiers::default();
        let mut mq = MethodQualifiers::default();

        loop {
            if self.at_ident(KW_STAGE) {
                vq.stage = true;
                mq.stage = true;
                self.bump();
            } else if self.at_ident(KW_STREAM) {
                vq.stream = true;
                self.bump();
            } else if self.at_ident(KW_OVERRIDE) {
                mq.is_override = true;
                self.bump();
            } else if self.at_ident(KW_ABSTRACT) {
                mq.is_abstract = true;
                self.bump();
            } else if self.at(TokenKind::Ident) && IGNORED_MODIFIERS.contains(&self.text()) {
                self.bump();
            } else {
                break;
            }
        }

        if self.at_ident(KW_COMPOSE) {
            self.bump();
            self.parse_composition(decl, start);
            return;
        }
        if self.at_ident(KW_STRUCT) {
            self.bump();
            self.parse_struct(decl, start);
            return;
        }
        if self.at_ident(KW_CBUFFER) {
            // Constant buffer groupings carry no member semantics here.
            while !self.at_eof() && !self.at(TokenKind::LBrace) {
                self.bump();
            }
            self.skip_braced_block();
            return;
        }

        let Some(type_name) = self.parse_type_name() else {
            self.error_here("expected member declaration".into());
            self.recover();
            return;
        };

        if !self.at(TokenKind::Ident) {
            self.error_here("expected member name".into());
            self.recover();
            return;
        }
        let name = SmolStr::new(self.text());
        self.bump();

        if self.at(TokenKind::LParen) {
            let (params, body) = self.parse_method_rest();
            decl.methods.push(Method {
                name,
                return_type: type_name,
                params,
                qualifiers: mq,
                body,
                span: self.span_from(start),
            });
        } else {
            self.parse_variable_rest(decl, start, name, type_name, vq);
        }
    }

    fn parse_composition(&mut self, decl: &mut ShaderDecl, start: usize) {
        let Some(type_name) = self.parse_type_name() else {
            self.error_here("expected composition type".into());
            self.recover();
            return;
        };
        if !self.at(TokenKind::Ident) {
            self.error_here("expected composition name".into());
            self.recover();
            return;
        }
        let name = SmolStr::new(self.text());
        self.bump();
        // Composition arrays (`compose Light lights[]`) keep the element type.
        if self.at(TokenKind::LBracket) {
            while !self.at_eof() && !self.at(TokenKind::RBracket) {
                self.bump();
            }
            self.expect(TokenKind::RBracket, "']'");
        }
        self.expect(TokenKind::Semicolon, "';'");
        decl.compositions.push(Composition {
            name,
            type_name,
            span: self.span_from(start),
        });
    }

    fn parse_struct(&mut self, decl: &mut ShaderDecl, start: usize) {
        if !self.at(TokenKind::Ident) {
            self.error_here("expected struct name".into());
            self.recover();
            return;
        }
        let name = SmolStr::new(self.text());
        self.bump();

        let mut fields = Vec::new();
        if self.expect(TokenKind::LBrace, "'{'") {
            while !self.at_eof() && !self.at(TokenKind::RBrace) {
                let before = self.pos;
                if let Some(type_name) = self.parse_type_name() {
                    if self.at(TokenKind::Ident) {
                        let field_name = SmolStr::new(self.text());
                        self.bump();
                        let mut semantic = None;
                        if self.at(TokenKind::Colon) {
                            self.bump();
                            if self.at(TokenKind::Ident) {
                                semantic = Some(SmolStr::new(self.text()));
                                self.bump();
                            }
                        }
                        self.expect(TokenKind::Semicolon, "';'");
                        fields.push(StructField {
                            name: field_name,
                            type_name,
                            semantic,
                        });
                        continue;
                    }
                }
                self.error_here("expected struct field".into());
                self.recover();
                if self.pos == before {
                    self.bump();
                }
            }
            self.expect(TokenKind::RBrace, "'}'");
        }
        if self.at(TokenKind::Semicolon) {
            self.bump();
        }
        decl.structs.push(StructDef {
            name,
            fields,
            span: self.span_from(start),
        });
    }

    fn parse_method_rest(&mut self) -> (Vec<Param>, Vec<Stmt>) {
        let mut params = Vec::new();
        self.bump(); // (
        while !self.at_eof() && !self.at(TokenKind::RParen) {
            while self.at(TokenKind::Ident) && PARAM_MODIFIERS.contains(&self.text()) {
                self.bump();
            }
            match self.parse_type_name() {
                Some(type_name) if self.at(TokenKind::Ident) => {
                    let name = SmolStr::new(self.text());
                    self.bump();
                    params.push(Param { name, type_name });
                }
                _ => {
                    self.error_here("expected parameter".into());
                    while !self.at_eof()
                        && !self.at(TokenKind::Comma)
                        && !self.at(TokenKind::RParen)
                    {
                        self.bump();
                    }
                }
            }
            if self.at(TokenKind::Comma) {
                self.bump();
            }
        }
        self.expect(TokenKind::RParen, "')'");

        let body = if self.at(TokenKind::LBrace) {
            self.parse_block()
        } else {
            // Abstract method or prototype.
            self.expect(TokenKind::Semicolon, "';'");
            Vec::new()
        };
        (params, body)
    }

    fn parse_variable_rest(
        &mut self,
        decl: &mut ShaderDecl,
        start: usize,
        first_name: SmolStr,
        type_name: SmolStr,
        qualifiers: VarQualifiers,
    ) {
        let mut name = first_name;
        loop {
            // Array suffix carries no analysis weight; keep the element type.
            if self.at(TokenKind::LBracket) {
                while !self.at_eof() && !self.at(TokenKind::RBracket) {
                    self.bump();
                }
                self.expect(TokenKind::RBracket, "']'");
            }
            let mut semantic = None;
            if self.at(TokenKind::Colon) {
                self.bump();
                if self.at(TokenKind::Ident) {
                    semantic = Some(SmolStr::new(self.text()));
                    self.bump();
                } else {
                    self.error_here("expected semantic name".into());
                }
            }
            let mut init = None;
            if self.at(TokenKind::Eq) {
                self.bump();
                init = self.parse_expr();
            }
            decl.variables.push(Variable {
                name,
                type_name: type_name.clone(),
                qualifiers,
                semantic,
                init,
                span: self.span_from(start),
            });

            // `float a, b;` declares two variables of the same type.
            if self.at(TokenKind::Comma) {
                self.bump();
                if self.at(TokenKind::Ident) {
                    name = SmolStr::new(self.text());
                    self.bump();
                    continue;
                }
                self.error_here("expected variable name".into());
            }
            break;
        }
        self.expect(TokenKind::Semicolon, "';'");
    }

    /// A type name: identifier plus optional template arguments
    /// (`Texture2D<float4>`), captured verbatim.
    fn parse_type_name(&mut self) -> Option<SmolStr> {
        if !self.at(TokenKind::Ident) {
            return None;
        }
        let start_offset = u32::from(self.tokens[self.pos].offset) as usize;
        let mut end_offset = u32::from(self.tokens[self.pos].end_offset()) as usize;
        self.bump();

        if self.at(TokenKind::Lt) {
            let mut depth = 0usize;
            while !self.at_eof() {
                match self.kind() {
                    Some(TokenKind::Lt) => depth += 1,
                    Some(TokenKind::Gt) => {
                        depth -= 1;
                        if depth == 0 {
                            end_offset = u32::from(self.tokens[self.pos].end_offset()) as usize;
                            self.bump();
                            break;
                        }
                    }
                    None => break,
                    _ => {}
                }
                end_offset = u32::from(self.tokens[self.pos].end_offset()) as usize;
                self.bump();
            }
        }
        Some(SmolStr::new(&self.source[start_offset..end_offset]))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        self.bump(); // {
        while !self.at_eof() && !self.at(TokenKind::RBrace) {
            let before = self.pos;
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            if self.pos == before {
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        stmts
    }

    /// A statement body that may or may not be braced, flattened to a list.
    fn parse_stmt_as_body(&mut self) -> Vec<Stmt> {
        if self.at(TokenKind::LBrace) {
            self.parse_block()
        } else {
            self.parse_stmt().into_iter().collect()
        }
    }

    fn parse_stmt(&mut self) -> Option<Stmt> {
        let start = self.pos;

        if self.at(TokenKind::LBrace) {
            return Some(Stmt::Block(self.parse_block()));
        }
        if self.at(TokenKind::Semicolon) {
            self.bump();
            return None;
        }
        if self.at_ident(KW_RETURN) {
            self.bump();
            let value = if self.at(TokenKind::Semicolon) {
                None
            } else {
                self.parse_expr()
            };
            self.expect(TokenKind::Semicolon, "';'");
            return Some(Stmt::Return {
                value,
                span: self.span_from(start),
            });
        }
        if self.at_ident(KW_IF) {
            self.bump();
            self.expect(TokenKind::LParen, "'('");
            let cond = self.parse_expr()?;
            self.expect(TokenKind::RParen, "')'");
            let then_body = self.parse_stmt_as_body();
            let else_body = if self.at_ident(KW_ELSE) {
                self.bump();
                self.parse_stmt_as_body()
            } else {
                Vec::new()
            };
            return Some(Stmt::If {
                cond,
                then_body,
                else_body,
                span: self.span_from(start),
            });
        }
        if self.at_ident(KW_FOR) {
            self.bump();
            self.expect(TokenKind::LParen, "'('");
            let init = if self.at(TokenKind::Semicolon) {
                self.bump();
                None
            } else {
                self.parse_simple_stmt().map(Box::new)
            };
            let cond = if self.at(TokenKind::Semicolon) {
                None
            } else {
                self.parse_expr()
            };
            self.expect(TokenKind::Semicolon, "';'");
            let step = if self.at(TokenKind::RParen) {
                None
            } else {
                self.parse_step_expr()
            };
            self.expect(TokenKind::RParen, "')'");
            let body = self.parse_stmt_as_body();
            return Some(Stmt::For {
                init,
                cond,
                step,
                body,
                span: self.span_from(start),
            });
        }

        self.parse_simple_stmt()
    }

    /// Local declaration, assignment, or expression statement (with `;`).
    fn parse_simple_stmt(&mut self) -> Option<Stmt> {
        let start = self.pos;

        if self.looks_like_local_decl() {
            let type_name = self.parse_type_name()?;
            let name = SmolStr::new(self.text());
            self.bump();
            if self.at(TokenKind::LBracket) {
                while !self.at_eof() && !self.at(TokenKind::RBracket) {
                    self.bump();
                }
                self.expect(TokenKind::RBracket, "']'");
            }
            let init = if self.at(TokenKind::Eq) {
                self.bump();
                self.parse_expr()
            } else {
                None
            };
            self.expect(TokenKind::Semicolon, "';'");
            return Some(Stmt::Local {
                name,
                type_name,
                init,
                span: self.span_from(start),
            });
        }

        let expr = match self.parse_expr() {
            Some(expr) => expr,
            None => {
                self.recover();
                return None;
            }
        };

        let stmt = if self.at(TokenKind::Eq) {
            self.bump();
            let value = self.parse_expr()?;
            Stmt::Assign {
                target: expr,
                value,
                span: self.span_from(start),
            }
        } else if let Some(op) = self.compound_assign_op() {
            self.bump();
            let rhs = self.parse_expr()?;
            let span = self.span_from(start);
            // `x += e` carries the same types as `x = x + e`.
            Stmt::Assign {
                target: expr.clone(),
                value: Expr::Binary {
                    op,
                    lhs: Box::new(expr),
                    rhs: Box::new(rhs),
                    span,
                },
                span,
            }
        } else {
            Stmt::Expr(expr)
        };
        self.expect(TokenKind::Semicolon, "';'");
        Some(stmt)
    }

    /// A for-loop step: expression or compound assignment without `;`.
    fn parse_step_expr(&mut self) -> Option<Expr> {
        let start = self.pos;
        let expr = self.parse_expr()?;
        if let Some(op) = self.compound_assign_op() {
            self.bump();
            let rhs = self.parse_expr()?;
            let span = self.span_from(start);
            return Some(Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
                span,
            });
        }
        Some(expr)
    }

    fn compound_assign_op(&self) -> Option<BinaryOp> {
        match self.kind() {
            Some(TokenKind::PlusEq) => Some(BinaryOp::Add),
            Some(TokenKind::MinusEq) => Some(BinaryOp::Sub),
            Some(TokenKind::StarEq) => Some(BinaryOp::Mul),
            Some(TokenKind::SlashEq) => Some(BinaryOp::Div),
            _ => None,
        }
    }

    /// `Type name =`, `Type name ;`, `Type name [` — a local declaration.
    fn looks_like_local_decl(&self) -> bool {
        if !self.at(TokenKind::Ident) {
            return false;
        }
        let mut i = 1;
        // Skip a template argument list on the type.
        if self.nth(1).map(|t| t.kind) == Some(TokenKind::Lt) {
            let mut depth = 0;
            loop {
                match self.nth(i).map(|t| t.kind) {
                    Some(TokenKind::Lt) => depth += 1,
                    Some(TokenKind::Gt) => {
                        depth -= 1;
                        if depth == 0 {
                            i += 1;
                            break;
                        }
                    }
                    None => return false,
                    _ => {}
                }
                i += 1;
            }
        }
        if self.nth(i).map(|t| t.kind) != Some(TokenKind::Ident) {
            return false;
        }
        matches!(
            self.nth(i + 1).map(|t| t.kind),
            Some(TokenKind::Eq) | Some(TokenKind::Semicolon) | Some(TokenKind::LBracket)
        )
    }

    // =========================================================================
    // Expressions (precedence climbing)
    // =========================================================================

    fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Option<Expr> {
        let start = self.pos;
        let cond = self.parse_binary(1)?;
        if self.at(TokenKind::Question) {
            self.bump();
            let then_expr = self.parse_expr()?;
            self.expect(TokenKind::Colon, "':'");
            let else_expr = self.parse_ternary()?;
            return Some(Expr::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                span: self.span_from(start),
            });
        }
        Some(cond)
    }

    fn binary_op(&self) -> Option<(BinaryOp, u8)> {
        let (op, prec) = match self.kind()? {
            TokenKind::PipePipe => (BinaryOp::Or, 1),
            TokenKind::AmpAmp => (BinaryOp::And, 2),
            TokenKind::Pipe => (BinaryOp::BitOr, 3),
            TokenKind::Caret => (BinaryOp::BitXor, 4),
            TokenKind::Amp => (BinaryOp::BitAnd, 5),
            TokenKind::EqEq => (BinaryOp::Eq, 6),
            TokenKind::BangEq => (BinaryOp::Ne, 6),
            TokenKind::Lt => (BinaryOp::Lt, 7),
            TokenKind::LtEq => (BinaryOp::Le, 7),
            TokenKind::Gt => (BinaryOp::Gt, 7),
            TokenKind::GtEq => (BinaryOp::Ge, 7),
            TokenKind::ShlOp => (BinaryOp::Shl, 8),
            TokenKind::ShrOp => (BinaryOp::Shr, 8),
            TokenKind::Plus => (BinaryOp::Add, 9),
            TokenKind::Minus => (BinaryOp::Sub, 9),
            TokenKind::Star => (BinaryOp::Mul, 10),
            TokenKind::Slash => (BinaryOp::Div, 10),
            TokenKind::Percent => (BinaryOp::Mod, 10),
            _ => return None,
        };
        Some((op, prec))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Option<Expr> {
        let start = self.pos;
        let mut lhs = self.parse_unary()?;
        while let Some((op, prec)) = self.binary_op() {
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span: self.span_from(start),
            };
        }
        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.pos;
        let op = match self.kind() {
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            Some(TokenKind::Bang) => Some(UnaryOp::Not),
            Some(TokenKind::Tilde) => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.parse_unary()?;
            return Some(Expr::Unary {
                op,
                operand: Box::new(operand),
                span: self.span_from(start),
            });
        }
        // Prefix increment/decrement: the value is just the operand.
        if self.at(TokenKind::PlusPlus) || self.at(TokenKind::MinusMinus) {
            self.bump();
            return self.parse_unary();
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let start = self.pos;
        let mut expr = self.parse_primary()?;
        loop {
            match self.kind() {
                Some(TokenKind::Dot) => {
                    self.bump();
                    if self.at(TokenKind::Ident) {
                        let member = SmolStr::new(self.text());
                        self.bump();
                        expr = Expr::Member {
                            base: Box::new(expr),
                            member,
                            span: self.span_from(start),
                        };
                    } else {
                        self.error_here("expected member name after '.'".into());
                        return Some(expr);
                    }
                }
                Some(TokenKind::LParen) => {
                    self.bump();
                    let mut args = Vec::new();
                    while !self.at_eof() && !self.at(TokenKind::RParen) {
                        match self.parse_expr() {
                            Some(arg) => args.push(arg),
                            None => break,
                        }
                        if self.at(TokenKind::Comma) {
                            self.bump();
                        }
                    }
                    self.expect(TokenKind::RParen, "')'");
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span: self.span_from(start),
                    };
                }
                Some(TokenKind::LBracket) => {
                    self.bump();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket, "']'");
                    expr = Expr::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                        span: self.span_from(start),
                    };
                }
                // Postfix increment/decrement leaves the type unchanged.
                Some(TokenKind::PlusPlus) | Some(TokenKind::MinusMinus) => {
                    self.bump();
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.kind() {
            Some(TokenKind::Int) => {
                let text = SmolStr::new(self.text());
                self.bump();
                Some(Expr::Literal {
                    kind: LiteralKind::Int,
                    text,
                    span,
                })
            }
            Some(TokenKind::Float) => {
                let text = SmolStr::new(self.text());
                self.bump();
                Some(Expr::Literal {
                    kind: LiteralKind::Float,
                    text,
                    span,
                })
            }
            Some(TokenKind::String) => {
                let text = SmolStr::new(self.text());
                self.bump();
                Some(Expr::Literal {
                    kind: LiteralKind::String,
                    text,
                    span,
                })
            }
            Some(TokenKind::Ident) if self.text() == "true" || self.text() == "false" => {
                let text = SmolStr::new(self.text());
                self.bump();
                Some(Expr::Literal {
                    kind: LiteralKind::Bool,
                    text,
                    span,
                })
            }
            Some(TokenKind::Ident) => {
                let name = SmolStr::new(self.text());
                self.bump();
                Some(Expr::Ident { name, span })
            }
            Some(TokenKind::LParen) => {
                if self.looks_like_cast() {
                    let start = self.pos;
                    self.bump(); // (
                    let type_name = SmolStr::new(self.text());
                    self.bump();
                    self.bump(); // )
                    let operand = self.parse_unary()?;
                    return Some(Expr::Cast {
                        type_name,
                        operand: Box::new(operand),
                        span: self.span_from(start),
                    });
                }
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'");
                Some(inner)
            }
            _ => {
                self.error_here("expected expression".into());
                None
            }
        }
    }

    /// `( Ident )` followed by something that can start an operand.
    fn looks_like_cast(&self) -> bool {
        if self.nth(1).map(|t| t.kind) != Some(TokenKind::Ident)
            || self.nth(2).map(|t| t.kind) != Some(TokenKind::RParen)
        {
            return false;
        }
        matches!(
            self.nth(3).map(|t| t.kind),
            Some(TokenKind::Ident)
                | Some(TokenKind::Int)
                | Some(TokenKind::Float)
                | Some(TokenKind::LParen)
        )
    }
}
