//! Console and file statements: `PRINT` (plain and `USING`), `WRITE`,
//! `INPUT`/`LINE INPUT`, `OPEN`/`CLOSE` and the random-access quartet
//! `FIELD`/`GET`/`PUT` with `LSET`/`RSET`.

use std::collections::VecDeque;

use super::print_using::format_using;
use super::{Exec, Interpreter};
use crate::ast::{Expr, LValue, OpenMode, PrintItem, PrintSep, VarRef};
use crate::constants;
use crate::error::{ErrorCode, ExecResult};
use crate::io::{advance_column, FileMode};
use crate::runtime::{FieldDef, FileEntry};
use crate::value::{
    bytes_to_text, f64_to_i16, number_to_string, parse_number_prefix, text_to_bytes, Value,
    VarType,
};

/// Where a print-family statement sends its text.
enum PrintTarget {
    Console,
    File(i16),
}

/// A `PRINT` list element after evaluation, ready for emission.
enum Piece {
    Text(String),
    Tab(i32),
    Spc(i32),
    Empty,
}

fn map_io_error(error: &std::io::Error) -> ErrorCode {
    match error.kind() {
        std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
        _ => ErrorCode::DiskIoError,
    }
}

/// Splits an `INPUT` line into comma-separated fields; quoted fields keep
/// embedded commas, unquoted fields are whitespace-trimmed. Always yields
/// at least one field.
fn split_input_fields(line: &str) -> Vec<String> {
    let bytes = line.as_bytes();
    let len = bytes.len();
    let mut fields = Vec::new();
    let mut i = 0;
    loop {
        while i < len && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if i < len && bytes[i] == b'"' {
            i += 1;
            let start = i;
            while i < len && bytes[i] != b'"' {
                i += 1;
            }
            fields.push(line[start..i].to_string());
            if i < len {
                i += 1;
            }
            while i < len && bytes[i] != b',' {
                i += 1;
            }
        } else {
            let start = i;
            while i < len && bytes[i] != b',' {
                i += 1;
            }
            fields.push(line[start..i].trim_end().to_string());
        }
        if i >= len {
            break;
        }
        i += 1;
        if i >= len {
            fields.push(String::new());
            break;
        }
    }
    if fields.is_empty() {
        fields.push(String::new());
    }
    fields
}

impl Interpreter {
    pub(crate) fn file_entry(&mut self, number: i16) -> ExecResult<&mut FileEntry> {
        if number < 1 || number as usize > constants::MAX_FILE_NUMBER {
            return Err(ErrorCode::BadFileNumber.into());
        }
        self.runtime
            .files
            .get_mut(&(number as usize))
            .ok_or_else(|| ErrorCode::BadFileNumber.into())
    }

    fn eval_file_number(&mut self, expr: &Expr) -> ExecResult<i16> {
        let n = self.eval_index(expr)?;
        if n < 1 || n > constants::MAX_FILE_NUMBER as i32 {
            Err(ErrorCode::BadFileNumber.into())
        } else {
            Ok(n as i16)
        }
    }

    fn sink_write(&mut self, target: &PrintTarget, text: &str) -> ExecResult<()> {
        match target {
            PrintTarget::Console => {
                self.console.print(text);
                Ok(())
            }
            PrintTarget::File(n) => {
                let entry = self.file_entry(*n)?;
                entry
                    .handle
                    .write(&text_to_bytes(text))
                    .map_err(|_| ErrorCode::DiskIoError)?;
                entry.column = advance_column(entry.column, text);
                Ok(())
            }
        }
    }

    fn sink_column(&mut self, target: &PrintTarget) -> ExecResult<usize> {
        match target {
            PrintTarget::Console => Ok(self.console.column()),
            PrintTarget::File(n) => Ok(self.file_entry(*n)?.column),
        }
    }

    fn sink_width(&mut self, target: &PrintTarget) -> usize {
        match target {
            PrintTarget::Console => self.console.width(),
            // Disk output does not wrap.
            PrintTarget::File(_) => usize::max_value(),
        }
    }

    fn resolve_target(&mut self, file: Option<&Expr>) -> ExecResult<PrintTarget> {
        match file {
            None => Ok(PrintTarget::Console),
            Some(expr) => {
                let n = f64_to_i16(self.eval_number(expr)?);
                self.file_entry(n)?;
                Ok(PrintTarget::File(n))
            }
        }
    }

    pub(crate) fn exec_print(
        &mut self,
        file: Option<&Expr>,
        using: Option<&Expr>,
        items: &[PrintItem],
    ) -> ExecResult<Exec> {
        let target = self.resolve_target(file)?;

        if let Some(format) = using {
            let format = self.eval(format)?.into_bytes()?;
            let mut values = Vec::new();
            for item in items {
                if let Some(expr) = &item.expr {
                    values.push(self.eval(expr)?);
                }
            }
            let rendered = format_using(&format, &values)?;
            self.sink_write(&target, &rendered)?;
            self.sink_write(&target, "\n")?;
            return Ok(Exec::Next);
        }

        if items.is_empty() {
            self.sink_write(&target, "\n")?;
            return Ok(Exec::Next);
        }

        // Items evaluate and emit strictly left to right, so POS and TAB
        // observe the live column.
        for item in items {
            let piece = match &item.expr {
                None => Piece::Empty,
                Some(Expr::Call(name, args)) if name == "tab" && args.len() == 1 => {
                    Piece::Tab(self.eval_index(&args[0])?)
                }
                Some(Expr::Call(name, args)) if name == "spc" && args.len() == 1 => {
                    Piece::Spc(self.eval_index(&args[0])?)
                }
                Some(expr) => {
                    let value = self.eval(expr)?;
                    Piece::Text(match &value {
                        Value::String(s) => bytes_to_text(s),
                        number => format!("{} ", number_to_string(number)),
                    })
                }
            };
            let sep = item.sep;
            match piece {
                Piece::Empty => {}
                Piece::Text(text) => self.sink_write(&target, &text)?,
                Piece::Tab(column) => {
                    let stop = (column.max(1) as usize).saturating_sub(1);
                    let current = self.sink_column(&target)?;
                    if current < stop {
                        self.sink_write(&target, &" ".repeat(stop - current))?;
                    }
                }
                Piece::Spc(count) => {
                    if count > 0 {
                        self.sink_write(&target, &" ".repeat(count as usize))?;
                    }
                }
            }
            match sep {
                Some(PrintSep::Semicolon) => {}
                Some(PrintSep::Adjacent) => self.sink_write(&target, " ")?,
                Some(PrintSep::Comma) => {
                    let column = self.sink_column(&target)?;
                    let next = (column / constants::PRINT_ZONE_WIDTH + 1)
                        * constants::PRINT_ZONE_WIDTH;
                    if next >= self.sink_width(&target) {
                        self.sink_write(&target, "\n")?;
                    } else {
                        self.sink_write(&target, &" ".repeat(next - column))?;
                    }
                }
                None => self.sink_write(&target, "\n")?,
            }
        }
        Ok(Exec::Next)
    }

    pub(crate) fn exec_write(&mut self, file: Option<&Expr>, items: &[Expr]) -> ExecResult<Exec> {
        let target = self.resolve_target(file)?;
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            let value = self.eval(item)?;
            parts.push(match &value {
                Value::String(s) => format!("\"{}\"", bytes_to_text(s)),
                number => number_to_string(number).trim().to_string(),
            });
        }
        let mut line = parts.join(",");
        line.push('\n');
        self.sink_write(&target, &line)?;
        Ok(Exec::Next)
    }

    pub(crate) fn exec_input(
        &mut self,
        file: Option<&Expr>,
        prompt: Option<&str>,
        suppress_mark: bool,
        vars: &[LValue],
    ) -> ExecResult<Exec> {
        if let Some(expr) = file {
            let number = self.eval_file_number(expr)?;
            let mut queue: VecDeque<String> = VecDeque::new();
            for target in vars {
                if queue.is_empty() {
                    let line = self
                        .file_entry(number)?
                        .handle
                        .read_line()
                        .map_err(|_| ErrorCode::DiskIoError)?
                        .ok_or(ErrorCode::InputPastEnd)?;
                    queue.extend(split_input_fields(&line));
                }
                let text = queue.pop_front().unwrap_or_default();
                self.assign_input(target, &text)?;
            }
            return Ok(Exec::Next);
        }

        let prompt = match prompt {
            Some(text) => text.to_string(),
            None if suppress_mark => String::new(),
            None => "? ".to_string(),
        };
        let line = self.console.input(&prompt);
        let fields = split_input_fields(&line);
        // Too few values: assign what we have, leave the rest untouched.
        for (target, text) in vars.iter().zip(&fields) {
            self.assign_input(target, text)?;
        }
        Ok(Exec::Next)
    }

    pub(crate) fn exec_line_input(
        &mut self,
        file: Option<&Expr>,
        prompt: Option<&str>,
        var: &LValue,
    ) -> ExecResult<Exec> {
        let line = match file {
            Some(expr) => {
                let number = self.eval_file_number(expr)?;
                self.file_entry(number)?
                    .handle
                    .read_line()
                    .map_err(|_| ErrorCode::DiskIoError)?
                    .ok_or(ErrorCode::InputPastEnd)?
            }
            None => self.console.input(prompt.unwrap_or("")),
        };
        self.assign(var, Value::String(text_to_bytes(&line)))?;
        Ok(Exec::Next)
    }

    fn assign_input(&mut self, target: &LValue, text: &str) -> ExecResult<()> {
        let value = if target.var().vtype == VarType::String {
            Value::String(text_to_bytes(text))
        } else {
            // Unparsable numeric input degrades to 0.
            Value::Double(parse_number_prefix(text))
        };
        self.assign(target, value)
    }

    pub(crate) fn exec_open(
        &mut self,
        file: &Expr,
        mode: &OpenMode,
        number: &Expr,
        record_len: Option<&Expr>,
    ) -> ExecResult<Exec> {
        let number = self.eval_file_number(number)?;
        if self.runtime.files.contains_key(&(number as usize)) {
            return Err(ErrorCode::FileAlreadyOpen.into());
        }
        let name = self.eval_string(file)?;
        if name.is_empty() {
            return Err(ErrorCode::BadFileName.into());
        }
        let mode = match mode {
            OpenMode::Keyword(mode) => *mode,
            OpenMode::Classic(expr) => {
                let text = self.eval_string(expr)?;
                text.chars()
                    .next()
                    .and_then(FileMode::from_letter)
                    .ok_or(ErrorCode::BadFileMode)?
            }
        };
        let record_len = match record_len {
            Some(expr) => {
                let n = self.eval_index(expr)?;
                if n < 1 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                n as usize
            }
            None => constants::DEFAULT_RECORD_LEN,
        };
        let handle = self
            .fs
            .open(&name, mode, record_len)
            .map_err(|e| map_io_error(&e))?;
        self.runtime
            .files
            .insert(number as usize, FileEntry::new(handle, mode, record_len));
        Ok(Exec::Next)
    }

    pub(crate) fn exec_close(&mut self, numbers: &[Expr]) -> ExecResult<Exec> {
        if numbers.is_empty() {
            self.runtime.close_all_files();
            return Ok(Exec::Next);
        }
        for expr in numbers {
            let n = self.eval_index(expr)?;
            if n < 1 {
                continue;
            }
            if let Some(mut entry) = self.runtime.files.remove(&(n as usize)) {
                let _ = entry.handle.flush();
            }
        }
        Ok(Exec::Next)
    }

    pub(crate) fn exec_field(
        &mut self,
        number: &Expr,
        fields: &[(Expr, VarRef)],
    ) -> ExecResult<Exec> {
        let number = self.eval_file_number(number)?;
        let mut defs = Vec::with_capacity(fields.len());
        let mut offset = 0;
        for (width, var) in fields {
            let width = self.eval_index(width)?;
            if width < 0 {
                return Err(ErrorCode::IllegalFunctionCall.into());
            }
            if var.vtype != VarType::String {
                return Err(ErrorCode::TypeMismatch.into());
            }
            defs.push(FieldDef {
                key: var.key(),
                offset,
                width: width as usize,
            });
            offset += width as usize;
        }

        let published = {
            let entry = self.file_entry(number)?;
            if entry.mode != FileMode::Random {
                return Err(ErrorCode::BadFileMode.into());
            }
            if offset > entry.open_record_len {
                return Err(ErrorCode::FieldOverflow.into());
            }
            entry.set_fields(defs);
            entry
                .fields
                .iter()
                .map(|f| (f.key.clone(), entry.window(f).to_vec()))
                .collect::<Vec<_>>()
        };
        for (key, window) in published {
            self.runtime.set_scalar_raw(&key, Value::String(window));
        }
        Ok(Exec::Next)
    }

    fn eval_record_number(&mut self, record: Option<&Expr>) -> ExecResult<Option<usize>> {
        match record {
            None => Ok(None),
            Some(expr) => {
                let r = self.eval_index(expr)?;
                if r < 1 {
                    Err(ErrorCode::BadRecordNumber.into())
                } else {
                    Ok(Some(r as usize))
                }
            }
        }
    }

    pub(crate) fn exec_get(&mut self, number: &Expr, record: Option<&Expr>) -> ExecResult<Exec> {
        let number = self.eval_file_number(number)?;
        let record = self.eval_record_number(record)?;
        let published = {
            let entry = self.file_entry(number)?;
            if entry.mode != FileMode::Random {
                return Err(ErrorCode::BadFileMode.into());
            }
            let r = record.unwrap_or(entry.current_record + 1);
            let len = entry.record_len.max(1);
            entry
                .handle
                .seek_record(r, len)
                .map_err(|e| map_io_error(&e))?;
            let mut buffer = vec![0u8; len];
            let count = entry
                .handle
                .read_record(&mut buffer)
                .map_err(|e| map_io_error(&e))?;
            // Reads past EOF pad the record with spaces.
            for b in &mut buffer[count..] {
                *b = b' ';
            }
            entry.buffer = buffer;
            entry.current_record = r;
            entry
                .fields
                .iter()
                .map(|f| (f.key.clone(), entry.window(f).to_vec()))
                .collect::<Vec<_>>()
        };
        for (key, window) in published {
            self.runtime.set_scalar_raw(&key, Value::String(window));
        }
        Ok(Exec::Next)
    }

    pub(crate) fn exec_put(&mut self, number: &Expr, record: Option<&Expr>) -> ExecResult<Exec> {
        let number = self.eval_file_number(number)?;
        let record = self.eval_record_number(record)?;
        let entry = self.file_entry(number)?;
        if entry.mode != FileMode::Random {
            return Err(ErrorCode::BadFileMode.into());
        }
        let r = record.unwrap_or(entry.current_record + 1);
        let len = entry.record_len.max(1);
        if entry.buffer.len() < len {
            entry.buffer.resize(len, b' ');
        }
        entry
            .handle
            .seek_record(r, len)
            .map_err(|e| map_io_error(&e))?;
        let buffer = entry.buffer[..len].to_vec();
        entry
            .handle
            .write_record(&buffer)
            .map_err(|e| map_io_error(&e))?;
        let _ = entry.handle.flush();
        entry.current_record = r;
        Ok(Exec::Next)
    }

    /// `LSET` (left-justify) and `RSET` (right-justify) into the field
    /// buffer that owns the variable, refreshing the scalar alongside.
    pub(crate) fn exec_justified_set(
        &mut self,
        var: &VarRef,
        value: &Expr,
        right_justify: bool,
    ) -> ExecResult<Exec> {
        let data = self.eval(value)?.into_bytes()?;
        let key = var.key();
        let owner = self
            .runtime
            .files
            .iter()
            .find_map(|(&n, entry)| entry.field(&key).cloned().map(|f| (n, f)));
        let (number, field) = owner.ok_or(ErrorCode::IllegalFunctionCall)?;
        let window = {
            let entry = self
                .runtime
                .files
                .get_mut(&number)
                .ok_or(ErrorCode::InternalError)?;
            entry.store_field(&field, &data, right_justify);
            entry.window(&field).to_vec()
        };
        self.runtime.set_scalar_raw(&key, Value::String(window));
        Ok(Exec::Next)
    }
}
