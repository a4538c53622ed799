//! The statement parser (pass 2) and the `DEFtype` collector (pass 1).
//!
//! Pass 1 scans the token stream linearly for `DEFINT`/`DEFSNG`/`DEFDBL`/
//! `DEFSTR` letter ranges so that pass 2 resolves every identifier with the
//! right default type, wherever the declaration sits in the program.

use std::collections::HashMap;

use mbasic::ast::{
    Branch, DataItem, Expr, LValue, OpenMode, PrintItem, PrintSep, Program, ProgramLine,
    ResumeMode, Statement, VarRef,
};
use mbasic::constants::MAX_LINE_NUMBER;
use mbasic::io::FileMode;
use mbasic::value::VarType;

use crate::error::ParseError;
use crate::token::{Keyword, Token, TokenKind};

fn deftype_keyword(keyword: Keyword) -> Option<VarType> {
    match keyword {
        Keyword::Defint => Some(VarType::Integer),
        Keyword::Defsng => Some(VarType::Single),
        Keyword::Defdbl => Some(VarType::Double),
        Keyword::Defstr => Some(VarType::String),
        _ => None,
    }
}

/// Pass 1: collect the `char -> VarType` map from every DEFtype statement.
pub fn collect_deftypes(tokens: &[Token]) -> HashMap<char, VarType> {
    let mut map = HashMap::new();
    let mut i = 0;
    while i < tokens.len() {
        let vtype = match &tokens[i].kind {
            TokenKind::Keyword(keyword) => match deftype_keyword(*keyword) {
                Some(vtype) => vtype,
                None => {
                    i += 1;
                    continue;
                }
            },
            _ => {
                i += 1;
                continue;
            }
        };
        i += 1;
        loop {
            let from = match &tokens.get(i).map(|t| &t.kind) {
                Some(TokenKind::Ident { name, .. }) => match name.chars().next() {
                    Some(c) => c,
                    None => break,
                },
                _ => break,
            };
            i += 1;
            let mut to = from;
            if matches!(tokens.get(i).map(|t| &t.kind), Some(TokenKind::Minus)) {
                if let Some(TokenKind::Ident { name, .. }) = tokens.get(i + 1).map(|t| &t.kind) {
                    if let Some(c) = name.chars().next() {
                        to = c;
                        i += 2;
                    }
                }
            }
            for c in from..=to {
                map.insert(c, vtype);
            }
            if matches!(tokens.get(i).map(|t| &t.kind), Some(TokenKind::Comma)) {
                i += 1;
            } else {
                break;
            }
        }
    }
    map
}

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    deftype: HashMap<char, VarType>,
    source_lines: Vec<String>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        tokens: &'a [Token],
        deftype: HashMap<char, VarType>,
        source: &str,
    ) -> Parser<'a> {
        Parser {
            tokens,
            pos: 0,
            deftype,
            source_lines: source
                .split('\n')
                .map(|l| l.trim_end_matches('\r').to_string())
                .collect(),
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.current().kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn syntax_error(&self, message: &str) -> ParseError {
        let token = self.current();
        ParseError {
            line: token.line,
            column: token.column,
            message: message.to_string(),
        }
    }

    fn eat_comma(&mut self) -> bool {
        if self.peek() == &TokenKind::Comma {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_semicolon(&mut self) -> bool {
        if self.peek() == &TokenKind::Semicolon {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_hash(&mut self) {
        if self.peek() == &TokenKind::Hash {
            self.advance();
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek() == &TokenKind::Keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_comma(&mut self) -> Result<(), ParseError> {
        if self.eat_comma() {
            Ok(())
        } else {
            Err(self.syntax_error("Expected ,"))
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        if self.eat_semicolon() {
            Ok(())
        } else {
            Err(self.syntax_error("Expected ;"))
        }
    }

    fn expect_eq(&mut self) -> Result<(), ParseError> {
        if self.peek() == &TokenKind::Eq {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error("Expected ="))
        }
    }

    pub(crate) fn expect_lparen(&mut self) -> Result<(), ParseError> {
        if self.peek() == &TokenKind::LParen {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error("Expected ("))
        }
    }

    pub(crate) fn expect_rparen(&mut self) -> Result<(), ParseError> {
        if self.peek() == &TokenKind::RParen {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error("Expected )"))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.syntax_error(&format!("Expected {:?}", keyword)))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<(String, Option<char>), ParseError> {
        match self.peek().clone() {
            TokenKind::Ident { name, suffix } => {
                self.advance();
                Ok((name, suffix))
            }
            _ => Err(self.syntax_error("Expected identifier")),
        }
    }

    fn expect_line_ref(&mut self) -> Result<u16, ParseError> {
        match *self.peek() {
            TokenKind::Number(n) => {
                if n < 0.0 || n > f64::from(MAX_LINE_NUMBER) || n.fract() != 0.0 {
                    return Err(self.syntax_error("Invalid line number"));
                }
                self.advance();
                Ok(n as u16)
            }
            _ => Err(self.syntax_error("Expected line number")),
        }
    }

    fn at_end_of_statement(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::Colon
                | TokenKind::Comment(_)
                | TokenKind::Keyword(Keyword::Else)
        )
    }

    /// Resolved type: suffix, else the DEFtype range of the first letter,
    /// else `SINGLE`.
    pub(crate) fn resolve_var(&self, name: &str, suffix: Option<char>) -> VarRef {
        let vtype = suffix
            .and_then(VarType::from_suffix)
            .or_else(|| {
                name.chars()
                    .next()
                    .and_then(|c| self.deftype.get(&c).copied())
            })
            .unwrap_or(VarType::Single);
        VarRef::new(name, vtype)
    }

    /// `FN` names resolve their DEFtype letter from the character after the
    /// `fn` prefix.
    pub(crate) fn resolve_fn(&self, full_name: &str, suffix: Option<char>) -> VarRef {
        let vtype = suffix
            .and_then(VarType::from_suffix)
            .or_else(|| {
                full_name
                    .chars()
                    .nth(2)
                    .and_then(|c| self.deftype.get(&c).copied())
            })
            .unwrap_or(VarType::Single);
        VarRef::new(full_name, vtype)
    }

    pub(crate) fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program {
            lines: Vec::new(),
            deftype: self.deftype.clone(),
        };
        loop {
            while self.peek() == &TokenKind::Newline {
                self.advance();
            }
            if self.peek() == &TokenKind::Eof {
                return Ok(program);
            }
            let token = self.current().clone();
            let number = match token.kind {
                TokenKind::LineNumber(n) => {
                    self.advance();
                    n
                }
                _ => return Err(self.syntax_error("Direct statement in file")),
            };
            let statements = self.parse_statements()?;
            let source = self
                .source_lines
                .get(token.line - 1)
                .cloned()
                .unwrap_or_default();
            program.lines.push(ProgramLine {
                number,
                statements,
                source,
            });
        }
    }

    fn parse_statements(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        loop {
            while self.peek() == &TokenKind::Colon {
                self.advance();
            }
            if matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
                break;
            }
            statements.push(self.parse_statement()?);
            match self.peek() {
                TokenKind::Colon | TokenKind::Comment(_) => {}
                TokenKind::Newline | TokenKind::Eof => break,
                TokenKind::Keyword(Keyword::Else) => {
                    return Err(self.syntax_error("ELSE without IF"));
                }
                _ => return Err(self.syntax_error("Expected end of statement")),
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.peek().clone() {
            TokenKind::Comment(text) => {
                self.advance();
                Ok(Statement::Rem(text))
            }
            TokenKind::Question => {
                self.advance();
                self.parse_print(false)
            }
            TokenKind::Ident { .. } => self.parse_assignment(),
            TokenKind::Keyword(keyword) => self.parse_keyword_statement(keyword),
            _ => Err(self.syntax_error("Syntax error")),
        }
    }

    fn parse_keyword_statement(&mut self, keyword: Keyword) -> Result<Statement, ParseError> {
        if let Some(vtype) = deftype_keyword(keyword) {
            self.advance();
            return self.parse_deftype(vtype);
        }
        match keyword {
            Keyword::Print => {
                self.advance();
                self.parse_print(false)
            }
            Keyword::Lprint => {
                self.advance();
                self.parse_print(true)
            }
            Keyword::Input => {
                self.advance();
                self.parse_input()
            }
            Keyword::Line => {
                self.advance();
                self.parse_line_input()
            }
            Keyword::Let => {
                self.advance();
                self.parse_assignment()
            }
            Keyword::If => {
                self.advance();
                self.parse_if()
            }
            Keyword::For => {
                self.advance();
                self.parse_for()
            }
            Keyword::Next => {
                self.advance();
                self.parse_next()
            }
            Keyword::While => {
                self.advance();
                let cond = self.parse_expr()?;
                Ok(Statement::While { cond })
            }
            Keyword::Wend => {
                self.advance();
                Ok(Statement::Wend)
            }
            Keyword::Goto => {
                self.advance();
                Ok(Statement::Goto(self.expect_line_ref()?))
            }
            Keyword::Gosub => {
                self.advance();
                Ok(Statement::Gosub(self.expect_line_ref()?))
            }
            Keyword::Return => {
                self.advance();
                let line = match self.peek() {
                    TokenKind::Number(_) => Some(self.expect_line_ref()?),
                    _ => None,
                };
                Ok(Statement::Return { line })
            }
            Keyword::On => {
                self.advance();
                self.parse_on()
            }
            Keyword::Data => {
                self.advance();
                self.parse_data()
            }
            Keyword::Read => {
                self.advance();
                let mut targets = vec![self.parse_lvalue()?];
                while self.eat_comma() {
                    targets.push(self.parse_lvalue()?);
                }
                Ok(Statement::Read(targets))
            }
            Keyword::Restore => {
                self.advance();
                let line = match self.peek() {
                    TokenKind::Number(_) => Some(self.expect_line_ref()?),
                    _ => None,
                };
                Ok(Statement::Restore(line))
            }
            Keyword::Dim => {
                self.advance();
                self.parse_dim()
            }
            Keyword::Def => {
                self.advance();
                self.parse_def()
            }
            Keyword::End | Keyword::System => {
                self.advance();
                Ok(Statement::End)
            }
            Keyword::Stop => {
                self.advance();
                Ok(Statement::Stop)
            }
            Keyword::Cls => {
                self.advance();
                Ok(Statement::Cls)
            }
            Keyword::Swap => {
                self.advance();
                let a = self.parse_lvalue()?;
                self.expect_comma()?;
                let b = self.parse_lvalue()?;
                Ok(Statement::Swap(a, b))
            }
            Keyword::Erase => {
                self.advance();
                let mut vars = Vec::new();
                loop {
                    let (name, suffix) = self.expect_ident()?;
                    vars.push(self.resolve_var(&name, suffix));
                    if !self.eat_comma() {
                        break;
                    }
                }
                Ok(Statement::Erase(vars))
            }
            Keyword::Clear => {
                self.advance();
                // Memory-size arguments are parsed and ignored.
                while !self.at_end_of_statement() {
                    self.advance();
                }
                Ok(Statement::Clear)
            }
            Keyword::Option => {
                self.advance();
                self.expect_keyword(Keyword::Base)?;
                Ok(Statement::OptionBase(self.parse_expr()?))
            }
            Keyword::Randomize => {
                self.advance();
                let seed = if self.at_end_of_statement() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Ok(Statement::Randomize(seed))
            }
            Keyword::Tron => {
                self.advance();
                Ok(Statement::Tron)
            }
            Keyword::Troff => {
                self.advance();
                Ok(Statement::Troff)
            }
            Keyword::Width => {
                self.advance();
                let printer = self.eat_keyword(Keyword::Lprint);
                Ok(Statement::Width {
                    printer,
                    value: self.parse_expr()?,
                })
            }
            Keyword::Poke => {
                self.advance();
                let address = self.parse_expr()?;
                self.expect_comma()?;
                Ok(Statement::Poke(address, self.parse_expr()?))
            }
            Keyword::Out => {
                self.advance();
                let port = self.parse_expr()?;
                self.expect_comma()?;
                Ok(Statement::Out(port, self.parse_expr()?))
            }
            Keyword::Wait => {
                self.advance();
                let port = self.parse_expr()?;
                self.expect_comma()?;
                let mask = self.parse_expr()?;
                let select = if self.eat_comma() {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                Ok(Statement::Wait(port, mask, select))
            }
            Keyword::Call => {
                self.advance();
                let (name, _) = self.expect_ident()?;
                let args = if self.peek() == &TokenKind::LParen {
                    self.parse_args()?
                } else {
                    Vec::new()
                };
                Ok(Statement::CallSub { name, args })
            }
            Keyword::Error => {
                self.advance();
                Ok(Statement::ErrorStmt(self.parse_expr()?))
            }
            Keyword::Resume => {
                self.advance();
                self.parse_resume()
            }
            Keyword::Open => {
                self.advance();
                self.parse_open()
            }
            Keyword::Close => {
                self.advance();
                let mut numbers = Vec::new();
                if !self.at_end_of_statement() {
                    loop {
                        self.eat_hash();
                        numbers.push(self.parse_expr()?);
                        if !self.eat_comma() {
                            break;
                        }
                    }
                }
                Ok(Statement::Close(numbers))
            }
            Keyword::Reset => {
                self.advance();
                Ok(Statement::Reset)
            }
            Keyword::Field => {
                self.advance();
                self.parse_field()
            }
            Keyword::Get => {
                self.advance();
                let (number, record) = self.parse_record_access()?;
                Ok(Statement::Get { number, record })
            }
            Keyword::Put => {
                self.advance();
                let (number, record) = self.parse_record_access()?;
                Ok(Statement::Put { number, record })
            }
            Keyword::Lset => {
                self.advance();
                let (name, suffix) = self.expect_ident()?;
                let var = self.resolve_var(&name, suffix);
                self.expect_eq()?;
                Ok(Statement::LSet {
                    var,
                    value: self.parse_expr()?,
                })
            }
            Keyword::Rset => {
                self.advance();
                let (name, suffix) = self.expect_ident()?;
                let var = self.resolve_var(&name, suffix);
                self.expect_eq()?;
                Ok(Statement::RSet {
                    var,
                    value: self.parse_expr()?,
                })
            }
            Keyword::Write => {
                self.advance();
                self.parse_write()
            }
            Keyword::Chain => {
                self.advance();
                self.parse_chain()
            }
            Keyword::Merge => {
                self.advance();
                Ok(Statement::Merge(self.parse_expr()?))
            }
            Keyword::Common => {
                self.advance();
                let mut vars = Vec::new();
                loop {
                    let (name, suffix) = self.expect_ident()?;
                    vars.push(self.resolve_var(&name, suffix));
                    // `COMMON A()` declares an array name.
                    if self.peek() == &TokenKind::LParen {
                        self.advance();
                        self.expect_rparen()?;
                    }
                    if !self.eat_comma() {
                        break;
                    }
                }
                Ok(Statement::Common(vars))
            }
            Keyword::MidS => {
                self.advance();
                self.parse_mid_assign()
            }
            Keyword::Kill => {
                self.advance();
                Ok(Statement::Kill(self.parse_expr()?))
            }
            Keyword::Name => {
                self.advance();
                let from = self.parse_expr()?;
                self.expect_keyword(Keyword::As)?;
                Ok(Statement::NameAs {
                    from,
                    to: self.parse_expr()?,
                })
            }
            Keyword::Run => {
                self.advance();
                self.parse_run()
            }
            _ => Err(self.syntax_error("Syntax error")),
        }
    }

    fn parse_assignment(&mut self) -> Result<Statement, ParseError> {
        let target = self.parse_lvalue()?;
        self.expect_eq()?;
        Ok(Statement::Let {
            target,
            value: self.parse_expr()?,
        })
    }

    fn parse_lvalue(&mut self) -> Result<LValue, ParseError> {
        let (name, suffix) = self.expect_ident()?;
        let var = self.resolve_var(&name, suffix);
        if self.peek() == &TokenKind::LParen {
            let subscripts = self.parse_args()?;
            Ok(LValue::Element(var, subscripts))
        } else {
            Ok(LValue::Var(var))
        }
    }

    fn parse_print(&mut self, printer: bool) -> Result<Statement, ParseError> {
        let mut file = None;
        if self.peek() == &TokenKind::Hash {
            self.advance();
            file = Some(self.parse_expr()?);
            self.expect_comma()?;
        }
        let mut using = None;
        if self.eat_keyword(Keyword::Using) {
            using = Some(self.parse_expr()?);
            self.expect_semicolon()?;
        }
        let mut items = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                    items.push(PrintItem {
                        expr: None,
                        sep: Some(PrintSep::Comma),
                    });
                }
                TokenKind::Semicolon => {
                    self.advance();
                    items.push(PrintItem {
                        expr: None,
                        sep: Some(PrintSep::Semicolon),
                    });
                }
                _ if self.at_end_of_statement() => break,
                _ => {
                    let expr = self.parse_expr()?;
                    let sep = match self.peek() {
                        TokenKind::Comma => {
                            self.advance();
                            Some(PrintSep::Comma)
                        }
                        TokenKind::Semicolon => {
                            self.advance();
                            Some(PrintSep::Semicolon)
                        }
                        _ if self.at_end_of_statement() => None,
                        _ => Some(PrintSep::Adjacent),
                    };
                    items.push(PrintItem {
                        expr: Some(expr),
                        sep,
                    });
                }
            }
        }
        Ok(Statement::Print {
            file,
            using,
            items,
            printer,
        })
    }

    fn parse_input(&mut self) -> Result<Statement, ParseError> {
        let suppress_mark = self.eat_semicolon();
        let mut file = None;
        let mut prompt = None;
        if self.peek() == &TokenKind::Hash {
            self.advance();
            file = Some(self.parse_expr()?);
            self.expect_comma()?;
        } else if let TokenKind::StringLit(text) = self.peek().clone() {
            self.advance();
            prompt = Some(text);
            if !(self.eat_semicolon() || self.eat_comma()) {
                return Err(self.syntax_error("Expected ; after prompt"));
            }
        }
        let mut vars = vec![self.parse_lvalue()?];
        while self.eat_comma() {
            vars.push(self.parse_lvalue()?);
        }
        Ok(Statement::Input {
            file,
            prompt,
            suppress_mark,
            vars,
        })
    }

    fn parse_line_input(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Input)?;
        self.eat_semicolon();
        let mut file = None;
        let mut prompt = None;
        if self.peek() == &TokenKind::Hash {
            self.advance();
            file = Some(self.parse_expr()?);
            self.expect_comma()?;
        } else if let TokenKind::StringLit(text) = self.peek().clone() {
            self.advance();
            prompt = Some(text);
            if !(self.eat_semicolon() || self.eat_comma()) {
                return Err(self.syntax_error("Expected ; after prompt"));
            }
        }
        Ok(Statement::LineInput {
            file,
            prompt,
            var: self.parse_lvalue()?,
        })
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let cond = self.parse_expr()?;
        let then_branch = if self.eat_keyword(Keyword::Then) {
            self.parse_branch()?
        } else if self.eat_keyword(Keyword::Goto) {
            Branch::Line(self.expect_line_ref()?)
        } else {
            return Err(self.syntax_error("Expected THEN or GOTO"));
        };
        let else_branch = if self.eat_keyword(Keyword::Else) {
            Some(self.parse_branch()?)
        } else {
            None
        };
        Ok(Statement::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_branch(&mut self) -> Result<Branch, ParseError> {
        if let TokenKind::Number(_) = self.peek() {
            return Ok(Branch::Line(self.expect_line_ref()?));
        }
        let mut statements = Vec::new();
        loop {
            while self.peek() == &TokenKind::Colon {
                self.advance();
            }
            match self.peek() {
                TokenKind::Newline | TokenKind::Eof | TokenKind::Keyword(Keyword::Else) => break,
                _ => statements.push(self.parse_statement()?),
            }
        }
        if statements.is_empty() {
            return Err(self.syntax_error("Expected statement after THEN or ELSE"));
        }
        Ok(Branch::Stmts(statements))
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let (name, suffix) = self.expect_ident()?;
        let var = self.resolve_var(&name, suffix);
        self.expect_eq()?;
        let from = self.parse_expr()?;
        self.expect_keyword(Keyword::To)?;
        let to = self.parse_expr()?;
        let step = if self.eat_keyword(Keyword::Step) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Statement::For {
            var,
            from,
            to,
            step,
        })
    }

    fn parse_next(&mut self) -> Result<Statement, ParseError> {
        let mut vars = Vec::new();
        while let TokenKind::Ident { .. } = self.peek() {
            let (name, suffix) = self.expect_ident()?;
            vars.push(self.resolve_var(&name, suffix));
            if !self.eat_comma() {
                break;
            }
        }
        Ok(Statement::Next { vars })
    }

    fn parse_on(&mut self) -> Result<Statement, ParseError> {
        if self.eat_keyword(Keyword::Error) {
            let gosub = if self.eat_keyword(Keyword::Goto) {
                false
            } else if self.eat_keyword(Keyword::Gosub) {
                true
            } else {
                return Err(self.syntax_error("Expected GOTO or GOSUB"));
            };
            let line = self.expect_line_ref()?;
            return Ok(Statement::OnErrorGoto { line, gosub });
        }
        let expr = self.parse_expr()?;
        let gosub = if self.eat_keyword(Keyword::Goto) {
            false
        } else if self.eat_keyword(Keyword::Gosub) {
            true
        } else {
            return Err(self.syntax_error("Expected GOTO or GOSUB"));
        };
        let mut targets = vec![self.expect_line_ref()?];
        while self.eat_comma() {
            targets.push(self.expect_line_ref()?);
        }
        Ok(Statement::OnGoto {
            expr,
            targets,
            gosub,
        })
    }

    /// `DATA`: quoted strings stay verbatim; unquoted runs are captured as
    /// text unless they are a plain (optionally signed) number.
    fn parse_data(&mut self) -> Result<Statement, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.at_end_of_statement() {
                break;
            }
            match self.peek().clone() {
                TokenKind::Comma => items.push(DataItem::Str(String::new())),
                TokenKind::StringLit(text) => {
                    self.advance();
                    items.push(DataItem::Str(text));
                }
                _ => {
                    let mut raw = Vec::new();
                    while !self.at_end_of_statement() && self.peek() != &TokenKind::Comma {
                        raw.push(self.advance());
                    }
                    items.push(data_item_from_tokens(&raw));
                }
            }
            if self.eat_comma() {
                if self.at_end_of_statement() {
                    items.push(DataItem::Str(String::new()));
                    break;
                }
            } else {
                break;
            }
        }
        Ok(Statement::Data(items))
    }

    fn parse_dim(&mut self) -> Result<Statement, ParseError> {
        let mut decls = Vec::new();
        loop {
            let (name, suffix) = self.expect_ident()?;
            let var = self.resolve_var(&name, suffix);
            let bounds = self.parse_args()?;
            decls.push((var, bounds));
            if !self.eat_comma() {
                break;
            }
        }
        Ok(Statement::Dim(decls))
    }

    fn parse_def(&mut self) -> Result<Statement, ParseError> {
        let name = if self.eat_keyword(Keyword::Fn) {
            let (base, suffix) = self.expect_ident()?;
            self.resolve_fn(&format!("fn{}", base), suffix)
        } else {
            let (base, suffix) = self.expect_ident()?;
            if !base.starts_with("fn") {
                return Err(self.syntax_error("Expected FN name"));
            }
            self.resolve_fn(&base, suffix)
        };
        let mut params = Vec::new();
        if self.peek() == &TokenKind::LParen {
            self.advance();
            if self.peek() != &TokenKind::RParen {
                loop {
                    let (base, suffix) = self.expect_ident()?;
                    params.push(self.resolve_var(&base, suffix));
                    if !self.eat_comma() {
                        break;
                    }
                }
            }
            self.expect_rparen()?;
        }
        self.expect_eq()?;
        Ok(Statement::DefFn {
            name,
            params,
            body: self.parse_expr()?,
        })
    }

    fn parse_deftype(&mut self, vtype: VarType) -> Result<Statement, ParseError> {
        let mut ranges = Vec::new();
        loop {
            let (name, _) = self.expect_ident()?;
            let from = name.chars().next().unwrap_or('a');
            let to = if self.peek() == &TokenKind::Minus {
                self.advance();
                let (end, _) = self.expect_ident()?;
                end.chars().next().unwrap_or(from)
            } else {
                from
            };
            ranges.push((from, to));
            if !self.eat_comma() {
                break;
            }
        }
        Ok(Statement::DefType { vtype, ranges })
    }

    fn parse_resume(&mut self) -> Result<Statement, ParseError> {
        if self.eat_keyword(Keyword::Next) {
            return Ok(Statement::Resume(ResumeMode::Next));
        }
        match self.peek() {
            TokenKind::Number(_) => {
                let line = self.expect_line_ref()?;
                if line == 0 {
                    Ok(Statement::Resume(ResumeMode::Retry))
                } else {
                    Ok(Statement::Resume(ResumeMode::Line(line)))
                }
            }
            _ => Ok(Statement::Resume(ResumeMode::Retry)),
        }
    }

    fn parse_open(&mut self) -> Result<Statement, ParseError> {
        let first = self.parse_expr()?;
        if self.peek() == &TokenKind::Comma {
            // Classic: OPEN "R", #1, "NAME", 20
            self.advance();
            self.eat_hash();
            let number = self.parse_expr()?;
            self.expect_comma()?;
            let file = self.parse_expr()?;
            let record_len = if self.eat_comma() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            return Ok(Statement::Open {
                file,
                mode: OpenMode::Classic(first),
                number,
                record_len,
            });
        }
        // Modern: OPEN "NAME" [FOR mode] AS #1 [LEN=20]
        let mode = if self.eat_keyword(Keyword::For) {
            match self.peek() {
                TokenKind::Keyword(Keyword::Input) => {
                    self.advance();
                    FileMode::Input
                }
                TokenKind::Keyword(Keyword::Output) => {
                    self.advance();
                    FileMode::Output
                }
                TokenKind::Keyword(Keyword::Append) => {
                    self.advance();
                    FileMode::Append
                }
                TokenKind::Keyword(Keyword::Random) => {
                    self.advance();
                    FileMode::Random
                }
                _ => return Err(self.syntax_error("Expected file mode")),
            }
        } else {
            FileMode::Random
        };
        self.expect_keyword(Keyword::As)?;
        self.eat_hash();
        let number = self.parse_expr()?;
        let record_len = if self.eat_keyword(Keyword::Len) {
            self.expect_eq()?;
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Statement::Open {
            file: first,
            mode: OpenMode::Keyword(mode),
            number,
            record_len,
        })
    }

    fn parse_field(&mut self) -> Result<Statement, ParseError> {
        self.eat_hash();
        let number = self.parse_expr()?;
        let mut fields = Vec::new();
        while self.eat_comma() {
            let width = self.parse_expr()?;
            self.expect_keyword(Keyword::As)?;
            let (name, suffix) = self.expect_ident()?;
            fields.push((width, self.resolve_var(&name, suffix)));
        }
        if fields.is_empty() {
            return Err(self.syntax_error("Expected field list"));
        }
        Ok(Statement::Field { number, fields })
    }

    fn parse_record_access(&mut self) -> Result<(Expr, Option<Expr>), ParseError> {
        self.eat_hash();
        let number = self.parse_expr()?;
        let record = if self.eat_comma() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok((number, record))
    }

    fn parse_write(&mut self) -> Result<Statement, ParseError> {
        let mut file = None;
        if self.peek() == &TokenKind::Hash {
            self.advance();
            file = Some(self.parse_expr()?);
            if !self.at_end_of_statement() {
                self.expect_comma()?;
            }
        }
        let mut items = Vec::new();
        if !self.at_end_of_statement() {
            loop {
                items.push(self.parse_expr()?);
                if !self.eat_comma() {
                    break;
                }
            }
        }
        Ok(Statement::Write { file, items })
    }

    fn parse_chain(&mut self) -> Result<Statement, ParseError> {
        let merge = self.eat_keyword(Keyword::Merge);
        let file = self.parse_expr()?;
        let mut line = None;
        let mut all = false;
        if self.eat_comma() {
            match self.peek() {
                TokenKind::Keyword(Keyword::All) => {
                    self.advance();
                    all = true;
                }
                TokenKind::Keyword(Keyword::Delete) => {
                    self.advance();
                    self.skip_delete_range()?;
                }
                TokenKind::Comma => {}
                _ => line = Some(self.parse_expr()?),
            }
            if self.eat_comma() {
                if self.eat_keyword(Keyword::All) {
                    all = true;
                } else if self.eat_keyword(Keyword::Delete) {
                    self.skip_delete_range()?;
                }
            }
        }
        Ok(Statement::Chain {
            merge,
            file,
            line,
            all,
        })
    }

    /// `CHAIN ... DELETE a-b` — the range is parsed and discarded; deleting
    /// overlay lines belongs to the interactive editor.
    fn skip_delete_range(&mut self) -> Result<(), ParseError> {
        self.parse_expr()?;
        if self.peek() == &TokenKind::Minus {
            self.advance();
            self.parse_expr()?;
        }
        Ok(())
    }

    fn parse_mid_assign(&mut self) -> Result<Statement, ParseError> {
        self.expect_lparen()?;
        let target = self.parse_lvalue()?;
        self.expect_comma()?;
        let start = self.parse_expr()?;
        let len = if self.eat_comma() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect_rparen()?;
        self.expect_eq()?;
        Ok(Statement::MidAssign {
            target,
            start,
            len,
            value: self.parse_expr()?,
        })
    }

    fn parse_run(&mut self) -> Result<Statement, ParseError> {
        if self.at_end_of_statement() {
            return Ok(Statement::Run {
                file: None,
                line: None,
                keep_variables: false,
            });
        }
        if let TokenKind::Number(_) = self.peek() {
            let line = self.expect_line_ref()?;
            return Ok(Statement::Run {
                file: None,
                line: Some(line),
                keep_variables: false,
            });
        }
        let file = self.parse_expr()?;
        let mut line = None;
        let mut keep_variables = false;
        if self.eat_comma() {
            match self.peek().clone() {
                TokenKind::Ident { ref name, .. } if name == "r" => {
                    self.advance();
                    keep_variables = true;
                }
                TokenKind::Number(_) => line = Some(self.expect_line_ref()?),
                _ => return Err(self.syntax_error("Expected R or line number")),
            }
        }
        Ok(Statement::Run {
            file: Some(file),
            line,
            keep_variables,
        })
    }
}

fn data_item_from_tokens(raw: &[Token]) -> DataItem {
    match raw {
        [one] => match one.kind {
            TokenKind::Number(n) => DataItem::Number(n),
            _ => DataItem::Str(one.text.trim().to_string()),
        },
        [sign, value] => match (&sign.kind, &value.kind) {
            (TokenKind::Minus, TokenKind::Number(n)) => DataItem::Number(-n),
            (TokenKind::Plus, TokenKind::Number(n)) => DataItem::Number(*n),
            _ => DataItem::Str(join_texts(raw)),
        },
        _ => DataItem::Str(join_texts(raw)),
    }
}

fn join_texts(raw: &[Token]) -> String {
    raw.iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
