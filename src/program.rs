//! The flattened, addressable program: an ordered statement table plus the
//! program counter type that indexes into it.
//!
//! The table owns every AST node for the life of a run; program counters
//! are `(line, statement-index)` pairs rather than references, so `MERGE`
//! can replace whole lines without dangling anything.

use std::collections::HashMap;

use crate::ast::{Program, ProgramLine, Statement};

/// Program counter: a statement address. Only meaningful relative to the
/// [`StatementTable`] that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pc {
    pub line: u16,
    pub stmt: usize,
}

impl Pc {
    pub fn new(line: u16, stmt: usize) -> Pc {
        Pc { line, stmt }
    }
}

/// Why execution is not currently advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// `END`, `SYSTEM`, falling off the program, or a chain/run request.
    End,
    /// `STOP`; resumable via `cont`.
    Stop,
    /// A registered breakpoint line was reached; resumable.
    Breakpoint,
    /// An untrapped runtime error.
    Error,
    /// Waiting for console input (only in asynchronous input setups).
    Input,
    /// The external break flag was observed.
    Break,
}

struct TableLine {
    statements: Vec<Statement>,
    source: String,
}

/// Ordered, addressable map of `(line, stmt-index)` to statements.
pub struct StatementTable {
    order: Vec<u16>,
    lines: HashMap<u16, TableLine>,
}

impl StatementTable {
    pub fn new() -> StatementTable {
        StatementTable {
            order: Vec::new(),
            lines: HashMap::new(),
        }
    }

    pub fn from_program(program: Program) -> StatementTable {
        let mut table = StatementTable::new();
        table.merge(program);
        table
    }

    /// Adds or replaces whole lines; the table owns them from here on.
    /// Duplicate line numbers in the input resolve to the last occurrence.
    pub fn merge(&mut self, program: Program) {
        for line in program.lines {
            self.insert_line(line);
        }
    }

    fn insert_line(&mut self, line: ProgramLine) {
        let ProgramLine {
            number,
            statements,
            source,
        } = line;
        if self.lines.insert(number, TableLine { statements, source }).is_none() {
            match self.order.binary_search(&number) {
                Ok(_) => {}
                Err(pos) => self.order.insert(pos, number),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn line_numbers(&self) -> &[u16] {
        &self.order
    }

    /// Address of the first statement, if any line has one.
    pub fn first(&self) -> Option<Pc> {
        self.order.first().map(|&line| Pc::new(line, 0))
    }

    /// Address of the statement following `pc` in program order: the next
    /// statement within the line, else the first statement of the next line.
    pub fn next(&self, pc: Pc) -> Option<Pc> {
        if let Some(line) = self.lines.get(&pc.line) {
            if pc.stmt + 1 < line.statements.len() {
                return Some(Pc::new(pc.line, pc.stmt + 1));
            }
        }
        self.next_line(pc.line).map(|line| Pc::new(line, 0))
    }

    fn next_line(&self, after: u16) -> Option<u16> {
        match self.order.binary_search(&after) {
            Ok(pos) => self.order.get(pos + 1).copied(),
            Err(pos) => self.order.get(pos).copied(),
        }
    }

    /// First statement of the line following `line` (the fall-through
    /// target of an `IF` that did not jump).
    pub fn line_after(&self, line: u16) -> Option<Pc> {
        self.next_line(line).map(|next| Pc::new(next, 0))
    }

    /// Resolves a jump target; the line must exist verbatim.
    pub fn find_line(&self, number: u16) -> Option<Pc> {
        if self.lines.contains_key(&number) {
            Some(Pc::new(number, 0))
        } else {
            None
        }
    }

    pub fn statement(&self, pc: Pc) -> Option<&Statement> {
        self.lines.get(&pc.line)?.statements.get(pc.stmt)
    }

    pub fn statements(&self, line: u16) -> Option<&[Statement]> {
        self.lines.get(&line).map(|l| &l.statements[..])
    }

    pub fn source(&self, line: u16) -> Option<&str> {
        self.lines.get(&line).map(|l| l.source.as_str())
    }
}

impl Default for StatementTable {
    fn default() -> StatementTable {
        StatementTable::new()
    }
}
