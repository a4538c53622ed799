//! The MBASIC error model: numeric error codes, their canonical messages,
//! and the runtime error value carried out-of-band from expression results.

use std::error::Error as StdError;
use std::fmt;

use num::FromPrimitive as _;
use num_derive::{FromPrimitive, ToPrimitive};

/// Wire-visible MBASIC error codes.
///
/// The discriminants are the codes reported through `ERR` and accepted by
/// `ERROR e`; gaps match the original numbering.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum ErrorCode {
    NextWithoutFor = 1,
    SyntaxError = 2,
    ReturnWithoutGosub = 3,
    OutOfData = 4,
    IllegalFunctionCall = 5,
    Overflow = 6,
    OutOfMemory = 7,
    UndefinedLineNumber = 8,
    SubscriptOutOfRange = 9,
    DuplicateDefinition = 10,
    DivisionByZero = 11,
    IllegalDirect = 12,
    TypeMismatch = 13,
    OutOfStringSpace = 14,
    StringTooLong = 15,
    CantContinue = 17,
    UndefinedUserFunction = 18,
    NoResume = 19,
    ResumeWithoutError = 20,
    MissingOperand = 22,
    LineBufferOverflow = 23,
    ForWithoutNext = 26,
    WhileWithoutWend = 29,
    WendWithoutWhile = 30,
    FieldOverflow = 50,
    InternalError = 51,
    BadFileNumber = 52,
    FileNotFound = 53,
    BadFileMode = 54,
    FileAlreadyOpen = 55,
    DiskIoError = 57,
    FileAlreadyExists = 58,
    DiskFull = 61,
    InputPastEnd = 62,
    BadRecordNumber = 63,
    BadFileName = 64,
    DirectStatementInFile = 66,
    TooManyFiles = 67,
}

impl ErrorCode {
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::NextWithoutFor => "NEXT without FOR",
            ErrorCode::SyntaxError => "Syntax error",
            ErrorCode::ReturnWithoutGosub => "RETURN without GOSUB",
            ErrorCode::OutOfData => "Out of DATA",
            ErrorCode::IllegalFunctionCall => "Illegal function call",
            ErrorCode::Overflow => "Overflow",
            ErrorCode::OutOfMemory => "Out of memory",
            ErrorCode::UndefinedLineNumber => "Undefined line number",
            ErrorCode::SubscriptOutOfRange => "Subscript out of range",
            ErrorCode::DuplicateDefinition => "Duplicate definition",
            ErrorCode::DivisionByZero => "Division by zero",
            ErrorCode::IllegalDirect => "Illegal direct",
            ErrorCode::TypeMismatch => "Type mismatch",
            ErrorCode::OutOfStringSpace => "Out of string space",
            ErrorCode::StringTooLong => "String too long",
            ErrorCode::CantContinue => "Can't continue",
            ErrorCode::UndefinedUserFunction => "Undefined user function",
            ErrorCode::NoResume => "No RESUME",
            ErrorCode::ResumeWithoutError => "RESUME without error",
            ErrorCode::MissingOperand => "Missing operand",
            ErrorCode::LineBufferOverflow => "Line buffer overflow",
            ErrorCode::ForWithoutNext => "FOR without NEXT",
            ErrorCode::WhileWithoutWend => "WHILE without WEND",
            ErrorCode::WendWithoutWhile => "WEND without WHILE",
            ErrorCode::FieldOverflow => "Field overflow",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::BadFileNumber => "Bad file number",
            ErrorCode::FileNotFound => "File not found",
            ErrorCode::BadFileMode => "Bad file mode",
            ErrorCode::FileAlreadyOpen => "File already open",
            ErrorCode::DiskIoError => "Disk I/O error",
            ErrorCode::FileAlreadyExists => "File already exists",
            ErrorCode::DiskFull => "Disk full",
            ErrorCode::InputPastEnd => "Input past end",
            ErrorCode::BadRecordNumber => "Bad record number",
            ErrorCode::BadFileName => "Bad file name",
            ErrorCode::DirectStatementInFile => "Direct statement in file",
            ErrorCode::TooManyFiles => "Too many files",
        }
    }
}

/// Returns the message for a raw code, covering codes `ERROR e` can raise
/// that have no canonical meaning.
pub fn message_for_code(code: i16) -> &'static str {
    match ErrorCode::from_i16(code) {
        Some(known) => known.message(),
        None => "Unprintable error",
    }
}

/// A trappable runtime error: the numeric code plus the line it was raised
/// on (attached by the interpreter once the faulting statement is known).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RuntimeError {
    pub code: i16,
    pub line: Option<u16>,
}

impl RuntimeError {
    pub fn new(code: ErrorCode) -> RuntimeError {
        RuntimeError {
            code: code as i16,
            line: None,
        }
    }

    /// For `ERROR e` with an arbitrary user code.
    pub fn custom(code: i16) -> RuntimeError {
        RuntimeError { code, line: None }
    }

    pub fn at_line(mut self, line: u16) -> RuntimeError {
        self.line = Some(line);
        self
    }

    pub fn message(&self) -> &'static str {
        message_for_code(self.code)
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code as i16
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} in {}", self.message(), line),
            None => f.write_str(self.message()),
        }
    }
}

impl StdError for RuntimeError {}

impl From<ErrorCode> for RuntimeError {
    fn from(code: ErrorCode) -> RuntimeError {
        RuntimeError::new(code)
    }
}

/// Shorthand used throughout the interpreter.
pub type ExecResult<T> = Result<T, RuntimeError>;
