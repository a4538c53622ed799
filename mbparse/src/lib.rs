//! Front end for the [mbasic](../mbasic/index.html) interpreter core.
//!
//! [`parse`](fn.parse.html) turns MBASIC source text into the core's
//! [`Program`](../mbasic/ast/struct.Program.html) representation in two
//! passes: pass 1 scans the token stream for `DEFINT`/`DEFSNG`/`DEFDBL`/
//! `DEFSTR` ranges, pass 2 parses statements with identifier types resolved
//! against that map. The token stream itself comes from a byte-walking
//! lexer that understands MBASIC's context-dependent forms: line numbers
//! only at line starts, `REM`/`'` comments that swallow the rest of the
//! line, `&H`/`&O` radix literals, type-suffixed identifiers and the
//! `$`-suffixed function keywords.

pub mod error;
mod expr;
mod lexer;
mod stmt;
mod token;

pub use crate::error::{Error, LexerError, ParseError};
pub use crate::lexer::tokenize;
pub use crate::token::{lookup_keyword, Keyword, Token, TokenKind};

use log::debug;
use mbasic::ast::Program;


pub type Result<T> = std::result::Result<T, Error>;

/// Parses a complete numbered program.
pub fn parse(source: &str) -> Result<Program> {
    let tokens = lexer::tokenize(source)?;
    let deftype = stmt::collect_deftypes(&tokens);
    let mut parser = stmt::Parser::new(&tokens, deftype, source);
    let program = parser.parse_program()?;
    debug!("parsed {} lines", program.lines.len());
    Ok(program)
}
