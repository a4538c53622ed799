//! Statement execution: the dispatch match plus control flow, assignment,
//! `DATA`/`READ`, arrays and the inert hardware stubs. File and console
//! statements live in `io_stmt`.

use super::{ChainRequest, Exec, Interpreter};
use crate::ast::{
    Branch, Expr, LValue, ResumeMode, Statement, VarRef,
};
use crate::error::{ErrorCode, ExecResult};
use crate::program::{HaltReason, Pc};
use crate::runtime::{wall_clock_seed, FnDef, ForRecord, StackEntry};
use crate::value::Value;

impl Interpreter {
    pub(crate) fn exec_statement(&mut self, statement: &Statement, pc: Pc) -> ExecResult<Exec> {
        match statement {
            Statement::Rem(_) | Statement::DefType { .. } => Ok(Exec::Next),

            Statement::Let { target, value } => {
                let value = self.eval(value)?;
                self.assign(target, value)?;
                Ok(Exec::Next)
            }

            Statement::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let branch = if self.eval(cond)?.to_bool() {
                    Some(then_branch)
                } else {
                    else_branch.as_ref()
                };
                // A branch that neither jumps nor halts falls through to
                // the next line, never to later statements on this one.
                match branch {
                    None => Ok(self.fall_to_next_line(pc)),
                    Some(Branch::Line(n)) => self.jump_to_line(*n),
                    Some(Branch::Stmts(stmts)) => match self.exec_inline(stmts, pc)? {
                        Exec::Next => Ok(self.fall_to_next_line(pc)),
                        other => Ok(other),
                    },
                }
            }

            Statement::Goto(n) => self.jump_to_line(*n),

            Statement::Gosub(n) => {
                let target = self.resolve_line(*n)?;
                let return_pc = self.table.next(pc);
                self.runtime
                    .exec_stack
                    .push(StackEntry::Gosub { return_pc });
                Ok(Exec::Jump(target))
            }

            Statement::Return { line } => self.exec_return(*line),

            Statement::For {
                var,
                from,
                to,
                step,
            } => self.exec_for(var, from, to, step.as_ref(), pc),

            Statement::Next { vars } => self.exec_next(vars),

            Statement::While { cond } => {
                if self.eval(cond)?.to_bool() {
                    self.runtime
                        .exec_stack
                        .push(StackEntry::While { loop_pc: pc });
                    Ok(Exec::Next)
                } else {
                    self.scan_past_wend(pc)
                }
            }

            Statement::Wend => self.exec_wend(),

            Statement::OnGoto {
                expr,
                targets,
                gosub,
            } => self.exec_on_goto(expr, targets, *gosub, pc),

            Statement::OnErrorGoto { line, gosub } => {
                if *line == 0 {
                    self.runtime.error.handler = None;
                } else {
                    self.resolve_line(*line)?;
                    self.runtime.error.handler = Some(*line);
                    self.runtime.error.handler_gosub = *gosub;
                }
                Ok(Exec::Next)
            }

            Statement::Resume(mode) => self.exec_resume(mode),

            Statement::ErrorStmt(code) => {
                let code = self.eval_index(code)?;
                if code < 1 || code > 255 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                Err(crate::error::RuntimeError::custom(code as i16))
            }

            Statement::Data(_) => Ok(Exec::Next),

            Statement::Read(targets) => {
                for target in targets {
                    let cursor = self.runtime.data_cursor;
                    let value = self
                        .runtime
                        .data
                        .get(cursor)
                        .cloned()
                        .ok_or(ErrorCode::OutOfData)?;
                    self.runtime.data_cursor = cursor + 1;
                    self.assign(target, value)?;
                }
                Ok(Exec::Next)
            }

            Statement::Restore(line) => {
                self.runtime.restore_data(*line);
                Ok(Exec::Next)
            }

            Statement::Dim(decls) => {
                for (var, bounds) in decls {
                    let mut dims = Vec::with_capacity(bounds.len());
                    for bound in bounds {
                        let upper = self.eval_index(bound)?;
                        if upper < 0 {
                            return Err(ErrorCode::SubscriptOutOfRange.into());
                        }
                        dims.push(upper as usize);
                    }
                    self.runtime.dim_array(var, dims)?;
                }
                Ok(Exec::Next)
            }

            Statement::Erase(vars) => {
                for var in vars {
                    self.runtime.erase_array(var)?;
                }
                Ok(Exec::Next)
            }

            Statement::DefFn { name, params, body } => {
                self.runtime.fns.insert(
                    name.key(),
                    FnDef {
                        vtype: name.vtype,
                        params: params.clone(),
                        body: body.clone(),
                    },
                );
                Ok(Exec::Next)
            }

            Statement::Swap(a, b) => {
                let value_a = self.read_lvalue(a)?;
                let value_b = self.read_lvalue(b)?;
                if value_a.vtype() != value_b.vtype() {
                    return Err(ErrorCode::TypeMismatch.into());
                }
                self.assign(a, value_b)?;
                self.assign(b, value_a)?;
                Ok(Exec::Next)
            }

            Statement::MidAssign {
                target,
                start,
                len,
                value,
            } => self.exec_mid_assign(target, start, len.as_ref(), value),

            Statement::Clear => {
                self.runtime.clear_variables();
                Ok(Exec::Next)
            }

            Statement::OptionBase(expr) => {
                let base = self.eval_index(expr)?;
                if base != 0 && base != 1 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                if !self.runtime.arrays.is_empty() && self.runtime.option_base != base as usize {
                    return Err(ErrorCode::DuplicateDefinition.into());
                }
                self.runtime.option_base = base as usize;
                Ok(Exec::Next)
            }

            Statement::Randomize(seed) => {
                let seed = match seed {
                    Some(expr) => self.eval_number(expr)? as i64 as u32,
                    None => wall_clock_seed(),
                };
                self.runtime.rng.reseed(seed);
                Ok(Exec::Next)
            }

            Statement::Tron => {
                self.runtime.trace = true;
                Ok(Exec::Next)
            }
            Statement::Troff => {
                self.runtime.trace = false;
                Ok(Exec::Next)
            }

            Statement::Cls => {
                self.console.clear_screen();
                Ok(Exec::Next)
            }

            Statement::Width { printer, value } => {
                let width = self.eval_index(value)?;
                if width < 1 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                if !printer {
                    self.console.set_width(width as usize);
                }
                Ok(Exec::Next)
            }

            // Hardware-proximate stubs: arguments are evaluated for their
            // side effects and errors, the operation itself is inert.
            Statement::Poke(a, b) | Statement::Out(a, b) => {
                self.eval_number(a)?;
                self.eval_number(b)?;
                Ok(Exec::Next)
            }
            Statement::Wait(port, mask, sel) => {
                self.eval_number(port)?;
                self.eval_number(mask)?;
                if let Some(sel) = sel {
                    self.eval_number(sel)?;
                }
                Ok(Exec::Next)
            }
            Statement::CallSub { args, .. } => {
                for arg in args {
                    self.eval(arg)?;
                }
                Ok(Exec::Next)
            }

            Statement::Stop => Ok(Exec::Halt(HaltReason::Stop)),

            Statement::End => {
                if self.runtime.error.error_pc.is_some() {
                    Err(ErrorCode::NoResume.into())
                } else {
                    Ok(Exec::Halt(HaltReason::End))
                }
            }

            Statement::Chain {
                merge,
                file,
                line,
                all,
            } => {
                let file = self.eval_string(file)?;
                let start_line = match line {
                    Some(expr) => Some(self.eval_line_number(expr)?),
                    None => None,
                };
                self.publish_request(ChainRequest {
                    file: Some(file),
                    start_line,
                    keep_variables: *all,
                    merge: *merge,
                    run_after: true,
                });
                Ok(Exec::Halt(HaltReason::End))
            }

            Statement::Merge(file) => {
                let file = self.eval_string(file)?;
                self.publish_request(ChainRequest {
                    file: Some(file),
                    start_line: None,
                    keep_variables: true,
                    merge: true,
                    run_after: false,
                });
                Ok(Exec::Halt(HaltReason::End))
            }

            Statement::Run {
                file,
                line,
                keep_variables,
            } => {
                let file = match file {
                    Some(expr) => Some(self.eval_string(expr)?),
                    None => None,
                };
                self.publish_request(ChainRequest {
                    file,
                    start_line: *line,
                    keep_variables: *keep_variables,
                    merge: false,
                    run_after: true,
                });
                Ok(Exec::Halt(HaltReason::End))
            }

            Statement::Common(vars) => {
                for var in vars {
                    self.runtime.common.insert(var.name.clone());
                }
                Ok(Exec::Next)
            }

            Statement::Kill(path) => {
                let path = self.eval_string(path)?;
                self.fs
                    .remove(&path)
                    .map_err(|_| ErrorCode::FileNotFound)?;
                Ok(Exec::Next)
            }

            Statement::NameAs { from, to } => {
                let from = self.eval_string(from)?;
                let to = self.eval_string(to)?;
                if !self.fs.exists(&from) {
                    return Err(ErrorCode::FileNotFound.into());
                }
                if self.fs.exists(&to) {
                    return Err(ErrorCode::FileAlreadyExists.into());
                }
                self.fs.rename(&from, &to).map_err(|_| ErrorCode::DiskIoError)?;
                Ok(Exec::Next)
            }

            Statement::Print {
                file,
                using,
                items,
                ..
            } => self.exec_print(file.as_ref(), using.as_ref(), items),

            Statement::Write { file, items } => self.exec_write(file.as_ref(), items),

            Statement::Input {
                file,
                prompt,
                suppress_mark,
                vars,
            } => self.exec_input(file.as_ref(), prompt.as_deref(), *suppress_mark, vars),

            Statement::LineInput { file, prompt, var } => {
                self.exec_line_input(file.as_ref(), prompt.as_deref(), var)
            }

            Statement::Open {
                file,
                mode,
                number,
                record_len,
            } => self.exec_open(file, mode, number, record_len.as_ref()),

            Statement::Close(numbers) => self.exec_close(numbers),

            Statement::Reset => {
                self.runtime.close_all_files();
                Ok(Exec::Next)
            }

            Statement::Field { number, fields } => self.exec_field(number, fields),
            Statement::Get { number, record } => self.exec_get(number, record.as_ref()),
            Statement::Put { number, record } => self.exec_put(number, record.as_ref()),
            Statement::LSet { var, value } => self.exec_justified_set(var, value, false),
            Statement::RSet { var, value } => self.exec_justified_set(var, value, true),
        }
    }

    /// Runs the nested statements of an inline `IF` branch within the
    /// enclosing statement's tick. Anything but plain fall-through aborts
    /// the rest of the branch.
    fn exec_inline(&mut self, stmts: &[Statement], pc: Pc) -> ExecResult<Exec> {
        for statement in stmts {
            match self.exec_statement(statement, pc)? {
                Exec::Next => continue,
                other => return Ok(other),
            }
        }
        Ok(Exec::Next)
    }

    pub(crate) fn resolve_line(&self, line: u16) -> ExecResult<Pc> {
        self.table
            .find_line(line)
            .ok_or_else(|| ErrorCode::UndefinedLineNumber.into())
    }

    pub(crate) fn jump_to_line(&self, line: u16) -> ExecResult<Exec> {
        self.resolve_line(line).map(Exec::Jump)
    }

    fn fall_to_next_line(&self, pc: Pc) -> Exec {
        match self.table.line_after(pc.line) {
            Some(target) => Exec::Jump(target),
            None => Exec::Halt(HaltReason::End),
        }
    }

    fn exec_for(
        &mut self,
        var: &VarRef,
        from: &Expr,
        to: &Expr,
        step: Option<&Expr>,
        pc: Pc,
    ) -> ExecResult<Exec> {
        let from = self.eval_number(from)?;
        let end = self.eval_number(to)?;
        let step = match step {
            Some(expr) => self.eval_number(expr)?,
            None => 1.0,
        };
        self.runtime.set_scalar(var, Value::Double(from))?;

        // Re-entering a FOR for the same variable abandons the old loop.
        let key = var.key();
        self.runtime.for_stack.retain(|r| r.var.key() != key);

        if (step > 0.0 && from > end) || (step < 0.0 && from < end) {
            return self.scan_past_next(pc);
        }
        self.runtime.for_stack.push(ForRecord {
            var: var.clone(),
            resume_pc: self.table.next(pc),
            end,
            step,
        });
        Ok(Exec::Next)
    }

    fn exec_next(&mut self, vars: &[VarRef]) -> ExecResult<Exec> {
        let names: Vec<Option<&VarRef>> = if vars.is_empty() {
            vec![None]
        } else {
            vars.iter().map(Some).collect()
        };
        for name in names {
            let index = match name {
                None => self
                    .runtime
                    .for_stack
                    .len()
                    .checked_sub(1)
                    .ok_or(ErrorCode::NextWithoutFor)?,
                Some(var) => {
                    let key = var.key();
                    self.runtime
                        .for_stack
                        .iter()
                        .rposition(|r| r.var.key() == key)
                        .ok_or(ErrorCode::NextWithoutFor)?
                }
            };
            let record = self.runtime.for_stack[index].clone();
            let stepped = self.runtime.get_scalar(&record.var).to_number() + record.step;
            self.runtime
                .set_scalar(&record.var, Value::Double(stepped))?;
            let finished = (record.step > 0.0 && stepped > record.end)
                || (record.step < 0.0 && stepped < record.end);
            if finished {
                self.runtime.for_stack.remove(index);
            } else {
                return match record.resume_pc {
                    Some(target) => Ok(Exec::Jump(target)),
                    None => Ok(Exec::Halt(HaltReason::End)),
                };
            }
        }
        Ok(Exec::Next)
    }

    /// Zero-trip `FOR`: scans forward for the `NEXT` that closes this loop
    /// (respecting nesting) and resumes after it.
    fn scan_past_next(&self, from: Pc) -> ExecResult<Exec> {
        let mut depth: usize = 0;
        let mut cursor = self.table.next(from);
        while let Some(pc) = cursor {
            match self.table.statement(pc) {
                Some(Statement::For { .. }) => depth += 1,
                Some(Statement::Next { vars }) => {
                    let closes = vars.len().max(1);
                    if closes > depth {
                        return match self.table.next(pc) {
                            Some(target) => Ok(Exec::Jump(target)),
                            None => Ok(Exec::Halt(HaltReason::End)),
                        };
                    }
                    depth -= closes;
                }
                _ => {}
            }
            cursor = self.table.next(pc);
        }
        Err(ErrorCode::ForWithoutNext.into())
    }

    /// False `WHILE`: scans forward for the matching `WEND` and resumes
    /// after it.
    fn scan_past_wend(&self, from: Pc) -> ExecResult<Exec> {
        let mut depth: usize = 0;
        let mut cursor = self.table.next(from);
        while let Some(pc) = cursor {
            match self.table.statement(pc) {
                Some(Statement::While { .. }) => depth += 1,
                Some(Statement::Wend) => {
                    if depth == 0 {
                        return match self.table.next(pc) {
                            Some(target) => Ok(Exec::Jump(target)),
                            None => Ok(Exec::Halt(HaltReason::End)),
                        };
                    }
                    depth -= 1;
                }
                _ => {}
            }
            cursor = self.table.next(pc);
        }
        Err(ErrorCode::WhileWithoutWend.into())
    }

    fn exec_wend(&mut self) -> ExecResult<Exec> {
        // The nearest WHILE must not be hidden behind a GOSUB frame.
        match self.runtime.exec_stack.last() {
            Some(StackEntry::While { loop_pc }) => {
                let target = *loop_pc;
                self.runtime.exec_stack.pop();
                Ok(Exec::Jump(target))
            }
            _ => Err(ErrorCode::WendWithoutWhile.into()),
        }
    }

    fn exec_return(&mut self, line: Option<u16>) -> ExecResult<Exec> {
        // WHILE entries above the GOSUB belong to loop context abandoned by
        // the return.
        loop {
            match self.runtime.exec_stack.pop() {
                Some(StackEntry::While { .. }) => continue,
                Some(StackEntry::Gosub { return_pc }) => {
                    return match line {
                        Some(n) => self.jump_to_line(n),
                        None => match return_pc {
                            Some(target) => Ok(Exec::Jump(target)),
                            None => Ok(Exec::Halt(HaltReason::End)),
                        },
                    };
                }
                None => return Err(ErrorCode::ReturnWithoutGosub.into()),
            }
        }
    }

    fn exec_on_goto(
        &mut self,
        expr: &Expr,
        targets: &[u16],
        gosub: bool,
        pc: Pc,
    ) -> ExecResult<Exec> {
        let selector = self.eval_index(expr)?;
        if selector < 0 {
            return Err(ErrorCode::IllegalFunctionCall.into());
        }
        let selector = selector as usize;
        if selector == 0 || selector > targets.len() {
            return Ok(Exec::Next);
        }
        let target = self.resolve_line(targets[selector - 1])?;
        if gosub {
            let return_pc = self.table.next(pc);
            self.runtime
                .exec_stack
                .push(StackEntry::Gosub { return_pc });
        }
        Ok(Exec::Jump(target))
    }

    fn exec_resume(&mut self, mode: &ResumeMode) -> ExecResult<Exec> {
        let error_pc = self
            .runtime
            .error
            .error_pc
            .take()
            .ok_or(ErrorCode::ResumeWithoutError)?;
        if self.runtime.error.handler_gosub {
            if let Some(StackEntry::Gosub { .. }) = self.runtime.exec_stack.last() {
                self.runtime.exec_stack.pop();
            }
        }
        match mode {
            ResumeMode::Retry => Ok(Exec::Jump(error_pc)),
            ResumeMode::Next => match self.table.next(error_pc) {
                Some(target) => Ok(Exec::Jump(target)),
                None => Ok(Exec::Halt(HaltReason::End)),
            },
            ResumeMode::Line(n) => self.jump_to_line(*n),
        }
    }

    fn exec_mid_assign(
        &mut self,
        target: &LValue,
        start: &Expr,
        len: Option<&Expr>,
        value: &Expr,
    ) -> ExecResult<Exec> {
        let mut bytes = self.read_lvalue(target)?.into_bytes()?;
        let start = self.eval_index(start)?;
        let replacement = self.eval(value)?.into_bytes()?;
        let count = match len {
            Some(expr) => {
                let n = self.eval_index(expr)?;
                if n < 0 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                n as usize
            }
            None => replacement.len(),
        };
        if start < 1 || start as usize > bytes.len() {
            return Err(ErrorCode::IllegalFunctionCall.into());
        }
        let start = start as usize - 1;
        // Never extends the target string.
        let count = count.min(replacement.len()).min(bytes.len() - start);
        bytes[start..start + count].copy_from_slice(&replacement[..count]);
        self.assign(target, Value::String(bytes))?;
        Ok(Exec::Next)
    }

    /// Stores into an lvalue, coercing to its resolved type.
    pub(crate) fn assign(&mut self, target: &LValue, value: Value) -> ExecResult<()> {
        match target {
            LValue::Var(var) => self.runtime.set_scalar(var, value),
            LValue::Element(var, subscripts) => {
                let indices = self.eval_indices(subscripts)?;
                self.runtime.set_element(var, &indices, value)
            }
        }
    }

    pub(crate) fn read_lvalue(&mut self, target: &LValue) -> ExecResult<Value> {
        match target {
            LValue::Var(var) => Ok(self.load_var(var)),
            LValue::Element(var, subscripts) => {
                let indices = self.eval_indices(subscripts)?;
                self.runtime.get_element(var, &indices)
            }
        }
    }
}
