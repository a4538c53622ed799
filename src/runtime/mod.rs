//! All mutable machine state of a program run, mutated only by the
//! interpreter in the current tick: variable and array stores, the `DATA`
//! pool and cursor, the FOR and GOSUB/WHILE stacks, the file table, error
//! trapping state, `OPTION BASE`, the DEFtype map, the trace flag,
//! breakpoints and the PRNG.

mod files;
mod variables;

pub use self::files::{FieldDef, FileEntry};
pub use self::variables::Array;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::ast::{DataItem, Expr, Statement, VarRef};
use crate::program::{Pc, StatementTable};
use crate::value::{text_to_bytes, Value, VarType};

/// Per-loop-variable `FOR` record. `resume_pc` addresses the statement
/// after the `FOR` header; `None` when the header was the last statement.
#[derive(Clone, Debug, PartialEq)]
pub struct ForRecord {
    pub var: VarRef,
    pub resume_pc: Option<Pc>,
    pub end: f64,
    pub step: f64,
}

/// Entry on the execution stack shared by `GOSUB` and `WHILE`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StackEntry {
    Gosub { return_pc: Option<Pc> },
    While { loop_pc: Pc },
}

/// `ON ERROR` trapping state plus the values behind `ERR` and `ERL`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorState {
    pub handler: Option<u16>,
    pub handler_gosub: bool,
    /// PC of the faulting statement while a handler is active; `Some` means
    /// "in handler, RESUME outstanding".
    pub error_pc: Option<Pc>,
    pub code: i16,
    pub line: u16,
}

/// A registered `DEF FN` definition; `vtype` is the result type resolved
/// from the function name's suffix or DEFtype range.
#[derive(Clone, Debug, PartialEq)]
pub struct FnDef {
    pub vtype: VarType,
    pub params: Vec<VarRef>,
    pub body: Expr,
}

/// Multiplicative congruential generator behind `RND`. The sequence is
/// deterministic per seed; `RND(0)` replays the last draw.
pub struct Rng {
    state: u32,
    last: f64,
}

impl Rng {
    pub fn new() -> Rng {
        let mut rng = Rng {
            state: 0x50000,
            last: 0.0,
        };
        rng.last = rng.draw();
        rng
    }

    pub fn reseed(&mut self, seed: u32) {
        self.state = seed | 1;
    }

    fn draw(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(1_103_515_245)
            .wrapping_add(12_345)
            & 0x7fff_ffff;
        f64::from(self.state) / f64::from(0x8000_0000u32)
    }

    pub fn next(&mut self) -> f64 {
        self.last = self.draw();
        self.last
    }

    pub fn last(&self) -> f64 {
        self.last
    }
}

impl Default for Rng {
    fn default() -> Rng {
        Rng::new()
    }
}

/// Seconds since the epoch, for `RANDOMIZE` without an argument.
pub fn wall_clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

pub struct Runtime {
    pub scalars: HashMap<String, Value>,
    pub arrays: HashMap<String, Array>,
    pub deftype: HashMap<char, VarType>,
    pub data: Vec<Value>,
    pub data_cursor: usize,
    pub data_lines: BTreeMap<u16, usize>,
    pub for_stack: Vec<ForRecord>,
    pub exec_stack: Vec<StackEntry>,
    pub files: HashMap<usize, FileEntry>,
    pub fns: HashMap<String, FnDef>,
    pub error: ErrorState,
    pub option_base: usize,
    pub trace: bool,
    pub breakpoints: HashSet<u16>,
    pub common: HashSet<String>,
    pub rng: Rng,
}

impl Runtime {
    pub fn new() -> Runtime {
        Runtime {
            scalars: HashMap::new(),
            arrays: HashMap::new(),
            deftype: HashMap::new(),
            data: Vec::new(),
            data_cursor: 0,
            data_lines: BTreeMap::new(),
            for_stack: Vec::new(),
            exec_stack: Vec::new(),
            files: HashMap::new(),
            fns: HashMap::new(),
            error: ErrorState::default(),
            option_base: 0,
            trace: false,
            breakpoints: HashSet::new(),
            common: HashSet::new(),
            rng: Rng::new(),
        }
    }

    /// Populates the run from a loaded table: collects every `DATA` value
    /// into the ordered pool with its line index, and registers every
    /// `DEF FN` (later definitions replace earlier ones).
    pub fn load_program(&mut self, table: &StatementTable) {
        self.data.clear();
        self.data_lines.clear();
        self.data_cursor = 0;
        self.fns.clear();

        for &line in table.line_numbers() {
            let statements = match table.statements(line) {
                Some(statements) => statements,
                None => continue,
            };
            for statement in statements {
                self.load_statement(line, statement);
            }
        }
        debug!(
            "program loaded: {} data values, {} user functions",
            self.data.len(),
            self.fns.len()
        );
    }

    fn load_statement(&mut self, line: u16, statement: &Statement) {
        match statement {
            Statement::Data(items) => {
                self.data_lines.entry(line).or_insert(self.data.len());
                for item in items {
                    self.data.push(match item {
                        DataItem::Number(n) => Value::Double(*n),
                        DataItem::Str(s) => Value::String(text_to_bytes(s)),
                    });
                }
            }
            Statement::DefFn { name, params, body } => {
                self.fns.insert(
                    name.key(),
                    FnDef {
                        vtype: name.vtype,
                        params: params.clone(),
                        body: body.clone(),
                    },
                );
            }
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => {
                // DATA inside an IF branch still joins the pool.
                if let crate::ast::Branch::Stmts(stmts) = then_branch {
                    for s in stmts {
                        self.load_statement(line, s);
                    }
                }
                if let Some(crate::ast::Branch::Stmts(stmts)) = else_branch {
                    for s in stmts {
                        self.load_statement(line, s);
                    }
                }
            }
            _ => {}
        }
    }

    /// `RESTORE [n]`: rewinds the data cursor, to the first `DATA` value at
    /// or after line `n` when given.
    pub fn restore_data(&mut self, line: Option<u16>) {
        self.data_cursor = match line {
            None => 0,
            Some(n) => self
                .data_lines
                .range(n..)
                .next()
                .map(|(_, &index)| index)
                .unwrap_or(self.data.len()),
        };
    }

    /// `CLEAR` (and the clean part of `CHAIN`/`RUN`): drops variables,
    /// arrays, stacks, data cursor, error state and open files. User
    /// functions, breakpoints, the DEFtype map and the trace flag survive.
    pub fn clear_variables(&mut self) {
        self.scalars.clear();
        self.arrays.clear();
        self.for_stack.clear();
        self.exec_stack.clear();
        self.data_cursor = 0;
        self.error = ErrorState::default();
        self.close_all_files();
    }

    /// Drops every variable whose base name was not declared `COMMON`.
    pub fn retain_common_variables(&mut self) {
        let common = self.common.clone();
        let keep = |key: &String| {
            let base: String = key
                .trim_end_matches(|c| c == '%' || c == '!' || c == '#' || c == '$')
                .to_string();
            common.contains(&base)
        };
        self.scalars.retain(|key, _| keep(key));
        self.arrays.retain(|key, _| keep(key));
    }

    pub fn close_all_files(&mut self) {
        for (_, mut entry) in self.files.drain() {
            let _ = entry.handle.flush();
        }
    }
}

impl Default for Runtime {
    fn default() -> Runtime {
        Runtime::new()
    }
}
