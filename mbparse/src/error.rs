//! Front-end errors, each carrying the 1-based source position it was
//! raised at.

use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LexerError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

impl StdError for LexerError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

impl StdError for ParseError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    Lexer(LexerError),
    Parse(ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lexer(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
        }
    }
}

impl StdError for Error {}

impl From<LexerError> for Error {
    fn from(err: LexerError) -> Error {
        Error::Lexer(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}
