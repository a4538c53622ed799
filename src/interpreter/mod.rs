//! The tick-driven interpreter.
//!
//! Each [`tick`](struct.Interpreter.html#method.tick) fetches the statement
//! at the current program counter, executes it, and advances (or jumps,
//! when the statement set a pending target). The loop halts for `END`,
//! `STOP`, breakpoints, an observed break flag, or an untrapped error;
//! `CHAIN`/`RUN` halt with `End` after publishing a request record the
//! outer driver consumes.

mod builtins;
mod expr;
mod io_stmt;
mod print_using;
mod stmt;

pub use self::print_using::format_using;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::trace;

use crate::ast::Program;
use crate::error::{ErrorCode, RuntimeError};
use crate::io::{Console, FileSystem};
use crate::program::{HaltReason, Pc, StatementTable};
use crate::runtime::{Runtime, StackEntry};

/// Outcome of a single tick, mirrored by `run` until it halts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickResult {
    Running,
    Halted(HaltReason),
}

/// Internal outcome of one statement.
pub(crate) enum Exec {
    Next,
    Jump(Pc),
    Halt(HaltReason),
}

/// Record published by `CHAIN`/`RUN`/`MERGE` for the outer driver.
/// `file == None` is a restart of the current program; `run_after` is false
/// only for a bare `MERGE`, which overlays lines and returns control.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainRequest {
    pub file: Option<String>,
    pub start_line: Option<u16>,
    pub keep_variables: bool,
    pub merge: bool,
    pub run_after: bool,
}

pub struct Interpreter {
    pub(crate) table: StatementTable,
    pub runtime: Runtime,
    pub(crate) console: Box<dyn Console>,
    pub(crate) fs: Box<dyn FileSystem>,
    pc: Pc,
    halted: Option<HaltReason>,
    request: Option<ChainRequest>,
    last_error: Option<RuntimeError>,
    break_flag: Arc<AtomicBool>,
    /// Suppresses re-halting on the breakpoint just continued from.
    armed_breakpoint: Option<u16>,
    pub(crate) fn_depth: usize,
}

impl Interpreter {
    pub fn new(
        program: Program,
        console: Box<dyn Console>,
        fs: Box<dyn FileSystem>,
    ) -> Interpreter {
        let deftype = program.deftype.clone();
        let table = StatementTable::from_program(program);
        let mut runtime = Runtime::new();
        runtime.deftype = deftype;
        runtime.load_program(&table);

        let (pc, halted) = match table.first() {
            Some(pc) => (pc, None),
            None => (Pc::new(0, 0), Some(HaltReason::End)),
        };
        Interpreter {
            table,
            runtime,
            console,
            fs,
            pc,
            halted,
            request: None,
            last_error: None,
            break_flag: Arc::new(AtomicBool::new(false)),
            armed_breakpoint: None,
            fn_depth: 0,
        }
    }

    pub fn pc(&self) -> Pc {
        self.pc
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halted
    }

    pub fn last_error(&self) -> Option<RuntimeError> {
        self.last_error
    }

    /// Flag an external signal source may set; observed at the top of the
    /// next tick.
    pub fn break_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.break_flag)
    }

    pub fn console(&mut self) -> &mut dyn Console {
        &mut *self.console
    }

    /// Takes the pending chain/run request, if the last halt produced one.
    pub fn take_request(&mut self) -> Option<ChainRequest> {
        self.request.take()
    }

    pub fn source_line(&self, line: u16) -> Option<&str> {
        self.table.source(line)
    }

    /// Executes exactly one statement.
    pub fn tick(&mut self) -> TickResult {
        if let Some(reason) = self.halted {
            return TickResult::Halted(reason);
        }
        if self.break_flag.swap(false, Ordering::Relaxed) {
            return self.halt(HaltReason::Break);
        }

        let pc = self.pc;
        if pc.stmt == 0
            && self.runtime.breakpoints.contains(&pc.line)
            && self.armed_breakpoint != Some(pc.line)
        {
            self.armed_breakpoint = Some(pc.line);
            return self.halt(HaltReason::Breakpoint);
        }
        if self.runtime.trace && pc.stmt == 0 {
            let text = format!("[{}]", pc.line);
            self.console.print(&text);
        }

        let statement = match self.table.statement(pc) {
            Some(statement) => statement.clone(),
            // The line vanished under us (merge); fall through to whatever
            // comes next.
            None => return self.advance_from(pc),
        };
        trace!("tick {}:{}", pc.line, pc.stmt);

        match self.exec_statement(&statement, pc) {
            Ok(Exec::Next) => self.advance_from(pc),
            Ok(Exec::Jump(target)) => {
                self.set_pc(target);
                TickResult::Running
            }
            Ok(Exec::Halt(reason)) => {
                if reason == HaltReason::Stop {
                    // STOP resumes at the following statement.
                    if let Some(next) = self.table.next(pc) {
                        self.set_pc(next);
                    }
                }
                self.halt(reason)
            }
            Err(error) => self.trap(error, pc),
        }
    }

    /// Runs until the program halts.
    pub fn run(&mut self) -> HaltReason {
        loop {
            if let TickResult::Halted(reason) = self.tick() {
                return reason;
            }
        }
    }

    /// Forces the run to end at the next tick boundary.
    pub fn stop(&mut self) {
        self.halted = Some(HaltReason::End);
    }

    /// Resumes after `STOP`, a breakpoint or a break; `false` when the halt
    /// reason is not resumable.
    pub fn cont(&mut self) -> bool {
        match self.halted {
            Some(HaltReason::Stop) | Some(HaltReason::Breakpoint) | Some(HaltReason::Break) => {
                self.halted = None;
                true
            }
            _ => false,
        }
    }

    /// Restarts the current program (the driver's answer to a fileless
    /// `RUN` request).
    pub fn rerun(&mut self, start_line: Option<u16>, keep_variables: bool) {
        if !keep_variables {
            self.runtime.clear_variables();
        }
        self.runtime.restore_data(None);
        self.last_error = None;
        self.begin_at(start_line);
    }

    /// Replaces (or overlays, for `MERGE`) the program per a chain request
    /// and prepares the next run. Plain chains keep only `COMMON`-declared
    /// variables; open files survive either way.
    pub fn chain(&mut self, program: Program, request: &ChainRequest) {
        let deftype = program.deftype.clone();
        if request.merge {
            self.table.merge(program);
            self.runtime.deftype.extend(deftype);
        } else {
            self.table = StatementTable::from_program(program);
            self.runtime.deftype = deftype;
        }
        if !request.keep_variables {
            self.runtime.retain_common_variables();
        }
        self.runtime.for_stack.clear();
        self.runtime.exec_stack.clear();
        self.runtime.error = Default::default();
        self.runtime.load_program(&self.table);
        self.last_error = None;
        self.begin_at(request.start_line);
    }

    fn begin_at(&mut self, start_line: Option<u16>) {
        let start = match start_line {
            Some(line) => self.table.find_line(line),
            None => self.table.first(),
        };
        match start {
            Some(pc) => {
                self.pc = pc;
                self.halted = None;
            }
            None => {
                if start_line.is_some() {
                    self.last_error =
                        Some(RuntimeError::new(ErrorCode::UndefinedLineNumber));
                    self.halted = Some(HaltReason::Error);
                } else {
                    self.halted = Some(HaltReason::End);
                }
            }
        }
        self.armed_breakpoint = None;
    }

    fn set_pc(&mut self, target: Pc) {
        if target.line != self.pc.line {
            self.armed_breakpoint = None;
        }
        self.pc = target;
    }

    fn advance_from(&mut self, pc: Pc) -> TickResult {
        match self.table.next(pc) {
            Some(next) => {
                self.set_pc(next);
                TickResult::Running
            }
            None => {
                // Falling off the program while a handler is active is the
                // same offense as END there.
                if self.runtime.error.error_pc.is_some() {
                    self.trap(RuntimeError::new(ErrorCode::NoResume), pc)
                } else {
                    self.halt(HaltReason::End)
                }
            }
        }
    }

    fn halt(&mut self, reason: HaltReason) -> TickResult {
        self.halted = Some(reason);
        TickResult::Halted(reason)
    }

    pub(crate) fn publish_request(&mut self, request: ChainRequest) {
        self.request = Some(request);
    }

    /// Error disposal: trap to the `ON ERROR` handler when one is set and
    /// no error is already being handled, else halt with reason `ERROR`.
    fn trap(&mut self, error: RuntimeError, pc: Pc) -> TickResult {
        let error = error.at_line(pc.line);
        self.runtime.error.code = error.code;
        self.runtime.error.line = pc.line;

        if let Some(handler) = self.runtime.error.handler {
            if self.runtime.error.error_pc.is_none() {
                if let Some(target) = self.table.find_line(handler) {
                    self.runtime.error.error_pc = Some(pc);
                    if self.runtime.error.handler_gosub {
                        let return_pc = self.table.next(pc);
                        self.runtime
                            .exec_stack
                            .push(StackEntry::Gosub { return_pc });
                    }
                    self.set_pc(target);
                    return TickResult::Running;
                }
            }
        }
        self.last_error = Some(error);
        self.halt(HaltReason::Error)
    }
}
