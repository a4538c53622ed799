//! Core of an interpreter for Microsoft BASIC-80 v5.21 ("MBASIC") programs.
//!
//! The crate executes numbered BASIC programs with full MBASIC semantics:
//! type-suffixed variables and arrays, `FOR`/`NEXT`, `WHILE`/`WEND`,
//! `GOSUB`/`RETURN`, `ON ERROR`/`RESUME` error trapping, `DATA`/`READ`,
//! `DEF FN` user functions, `PRINT USING` formatting and sequential plus
//! random-access file I/O with `FIELD`/`LSET`/`RSET`/`GET`/`PUT`.
//!
//! A program enters the core as an [`ast::Program`](ast/struct.Program.html)
//! (produced by the `mbparse` front end) and is lowered into a
//! [`StatementTable`](program/struct.StatementTable.html), which exposes a
//! stable `(line, statement-index)` address space. The
//! [`Interpreter`](interpreter/struct.Interpreter.html) executes one
//! statement per [`tick`](interpreter/struct.Interpreter.html#method.tick),
//! so an outer driver can interleave breakpoints, tracing or Ctrl-C polling
//! between statements.
//!
//! The core talks to the outside world through exactly two ports defined in
//! [`io`](io/index.html): a console (print, prompted input, key polling,
//! column tracking) and a file system (sequential and fixed-record-length
//! random access). Std-backed implementations and in-memory test doubles of
//! both ship with the crate.

pub mod ast;
pub mod constants;
pub mod error;
pub mod interpreter;
pub mod io;
pub mod program;
pub mod runtime;
pub mod value;
