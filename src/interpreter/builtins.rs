//! Built-in function dispatch. Functions are looked up by their canonical
//! lowercase name; arguments arrive as unevaluated expressions so the few
//! argument-less forms (`RND`, `INKEY$`, `TIMER`) share the same path.

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{ByteOrder, NativeEndian};

use super::Interpreter;
use crate::ast::Expr;
use crate::constants;
use crate::error::{message_for_code, ErrorCode, ExecResult};
use crate::io::FileMode;
use crate::value::{
    bytes_to_text, check_string_len, f64_to_i16, number_to_string, parse_number_prefix,
    text_to_bytes, Value,
};

fn want(values: &[Value], counts: &[usize]) -> ExecResult<()> {
    if counts.contains(&values.len()) {
        Ok(())
    } else if values.len() < *counts.iter().min().unwrap_or(&0) {
        Err(ErrorCode::MissingOperand.into())
    } else {
        Err(ErrorCode::IllegalFunctionCall.into())
    }
}

fn num(values: &[Value], index: usize) -> ExecResult<f64> {
    let value = values.get(index).ok_or(ErrorCode::MissingOperand)?;
    if value.is_string() {
        Err(ErrorCode::TypeMismatch.into())
    } else {
        Ok(value.to_number())
    }
}

fn int(values: &[Value], index: usize) -> ExecResult<i32> {
    Ok(i32::from(f64_to_i16(num(values, index)?)))
}

fn bytes<'a>(values: &'a [Value], index: usize) -> ExecResult<&'a [u8]> {
    values
        .get(index)
        .ok_or(ErrorCode::MissingOperand)?
        .as_bytes()
}

fn string_value(bytes: Vec<u8>) -> ExecResult<Value> {
    check_string_len(bytes.len())?;
    Ok(Value::String(bytes))
}

impl Interpreter {
    pub(crate) fn call_builtin(&mut self, name: &str, args: &[Expr]) -> ExecResult<Value> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }
        let v = &values[..];

        match name {
            // -- math -------------------------------------------------
            "abs" => Ok(Value::Double(num(v, 0)?.abs())),
            "atn" => Ok(Value::Double(num(v, 0)?.atan())),
            "cos" => Ok(Value::Double(num(v, 0)?.cos())),
            "sin" => Ok(Value::Double(num(v, 0)?.sin())),
            "tan" => Ok(Value::Double(num(v, 0)?.tan())),
            "exp" => Ok(Value::Double(num(v, 0)?.exp())),
            "log" => {
                let x = num(v, 0)?;
                if x <= 0.0 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                Ok(Value::Double(x.ln()))
            }
            "sqr" => {
                let x = num(v, 0)?;
                if x < 0.0 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                Ok(Value::Double(x.sqrt()))
            }
            "int" => Ok(Value::Double(num(v, 0)?.floor())),
            "fix" => Ok(Value::Double(num(v, 0)?.trunc())),
            "sgn" => {
                let x = num(v, 0)?;
                Ok(Value::Integer(if x > 0.0 {
                    1
                } else if x < 0.0 {
                    -1
                } else {
                    0
                }))
            }
            "rnd" => {
                want(v, &[0, 1])?;
                let draw = if v.is_empty() {
                    self.runtime.rng.next()
                } else {
                    let x = num(v, 0)?;
                    if x > 0.0 {
                        self.runtime.rng.next()
                    } else if x == 0.0 {
                        self.runtime.rng.last()
                    } else {
                        self.runtime.rng.reseed(x.abs() as u32);
                        self.runtime.rng.next()
                    }
                };
                Ok(Value::Single(draw as f32))
            }

            // -- type conversion --------------------------------------
            "cint" => Ok(Value::Integer(f64_to_i16(num(v, 0)?))),
            "csng" => Ok(Value::Single(num(v, 0)? as f32)),
            "cdbl" => Ok(Value::Double(num(v, 0)?)),

            // -- strings ----------------------------------------------
            "asc" => {
                let s = bytes(v, 0)?;
                match s.first() {
                    Some(&b) => Ok(Value::Integer(i16::from(b))),
                    None => Err(ErrorCode::IllegalFunctionCall.into()),
                }
            }
            "chr$" => {
                let n = int(v, 0)?;
                if n < 0 || n > 255 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                Ok(Value::String(vec![n as u8]))
            }
            "len" => Ok(Value::Integer(bytes(v, 0)?.len() as i16)),
            "str$" => {
                let value = values.get(0).ok_or(ErrorCode::MissingOperand)?;
                if value.is_string() {
                    return Err(ErrorCode::TypeMismatch.into());
                }
                Ok(Value::String(text_to_bytes(&number_to_string(value))))
            }
            "val" => Ok(Value::Double(parse_number_prefix(&bytes_to_text(bytes(
                v, 0,
            )?)))),
            "left$" => {
                let s = bytes(v, 0)?;
                let n = int(v, 1)?;
                if n < 0 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                let take = (n as usize).min(s.len());
                Ok(Value::String(s[..take].to_vec()))
            }
            "right$" => {
                let s = bytes(v, 0)?;
                let n = int(v, 1)?;
                if n < 0 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                let take = (n as usize).min(s.len());
                Ok(Value::String(s[s.len() - take..].to_vec()))
            }
            "mid$" => {
                want(v, &[2, 3])?;
                let s = bytes(v, 0)?;
                let start = int(v, 1)?;
                if start < 1 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                let start = start as usize - 1;
                if start >= s.len() {
                    return Ok(Value::String(Vec::new()));
                }
                let len = if v.len() == 3 {
                    let n = int(v, 2)?;
                    if n < 0 {
                        return Err(ErrorCode::IllegalFunctionCall.into());
                    }
                    n as usize
                } else {
                    s.len() - start
                };
                let end = (start + len).min(s.len());
                Ok(Value::String(s[start..end].to_vec()))
            }
            "space$" => {
                let n = int(v, 0)?;
                if n < 0 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                string_value(vec![b' '; n as usize])
            }
            "string$" => {
                want(v, &[2])?;
                let n = int(v, 0)?;
                if n < 0 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                let fill = match &values[1] {
                    Value::String(s) => match s.first() {
                        Some(&b) => b,
                        None => return Err(ErrorCode::IllegalFunctionCall.into()),
                    },
                    other => {
                        let code = f64_to_i16(other.to_number());
                        if code < 0 || code > 255 {
                            return Err(ErrorCode::IllegalFunctionCall.into());
                        }
                        code as u8
                    }
                };
                string_value(vec![fill; n as usize])
            }
            "instr" => {
                want(v, &[2, 3])?;
                let (start, hay, needle) = if v.len() == 3 {
                    (int(v, 0)?, bytes(v, 1)?, bytes(v, 2)?)
                } else {
                    (1, bytes(v, 0)?, bytes(v, 1)?)
                };
                if start < 1 || start > 255 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                let from = start as usize - 1;
                if from >= hay.len() {
                    return Ok(Value::Integer(0));
                }
                if needle.is_empty() {
                    return Ok(Value::Integer(start as i16));
                }
                let found = hay[from..]
                    .windows(needle.len())
                    .position(|w| w == needle)
                    .map(|i| from + i + 1)
                    .unwrap_or(0);
                Ok(Value::Integer(found as i16))
            }
            "hex$" => {
                let n = int(v, 0)? as i16;
                Ok(Value::String(format!("{:X}", n as u16).into_bytes()))
            }
            "oct$" => {
                let n = int(v, 0)? as i16;
                Ok(Value::String(format!("{:o}", n as u16).into_bytes()))
            }

            // -- console ----------------------------------------------
            "pos" => Ok(Value::Integer(self.console.column() as i16 + 1)),
            "lpos" => Ok(Value::Integer(0)),
            "inkey$" => Ok(Value::String(
                self.console.inkey().map(|b| vec![b]).unwrap_or_default(),
            )),
            "input$" => {
                want(v, &[1, 2])?;
                let n = int(v, 0)?;
                if n < 0 {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                let n = n as usize;
                check_string_len(n)?;
                let data = if v.len() == 2 {
                    let number = f64_to_i16(num(v, 1)?);
                    let entry = self.file_entry(number)?;
                    let data = entry
                        .handle
                        .read_chars(n)
                        .map_err(|_| ErrorCode::DiskIoError)?;
                    if data.len() < n {
                        return Err(ErrorCode::InputPastEnd.into());
                    }
                    data
                } else {
                    self.console.read_chars(n)
                };
                Ok(Value::String(data))
            }

            // -- files ------------------------------------------------
            "eof" => {
                let number = f64_to_i16(num(v, 0)?);
                let entry = self.file_entry(number)?;
                Ok(Value::Integer(if entry.handle.eof() { -1 } else { 0 }))
            }
            "lof" => {
                let number = f64_to_i16(num(v, 0)?);
                let entry = self.file_entry(number)?;
                Ok(Value::Double(entry.handle.length() as f64))
            }
            "loc" => {
                let number = f64_to_i16(num(v, 0)?);
                let entry = self.file_entry(number)?;
                let pos = entry.handle.position() as usize;
                let block = if entry.mode == FileMode::Random {
                    entry.record_len.max(1)
                } else {
                    constants::SEQUENTIAL_BLOCK
                };
                Ok(Value::Double((pos.saturating_sub(1) / block + 1) as f64))
            }

            // -- binary conversions -----------------------------------
            "mki$" => {
                let n = f64_to_i16(num(v, 0)?);
                let mut buf = [0u8; 2];
                NativeEndian::write_i16(&mut buf, n);
                Ok(Value::String(buf.to_vec()))
            }
            "mks$" => {
                let x = num(v, 0)? as f32;
                let mut buf = [0u8; 4];
                NativeEndian::write_f32(&mut buf, x);
                Ok(Value::String(buf.to_vec()))
            }
            "mkd$" => {
                let x = num(v, 0)?;
                let mut buf = [0u8; 8];
                NativeEndian::write_f64(&mut buf, x);
                Ok(Value::String(buf.to_vec()))
            }
            "cvi" => {
                let mut buf = [0u8; 2];
                copy_padded(bytes(v, 0)?, &mut buf);
                Ok(Value::Integer(NativeEndian::read_i16(&buf)))
            }
            "cvs" => {
                let mut buf = [0u8; 4];
                copy_padded(bytes(v, 0)?, &mut buf);
                Ok(Value::Single(NativeEndian::read_f32(&buf)))
            }
            "cvd" => {
                let mut buf = [0u8; 8];
                copy_padded(bytes(v, 0)?, &mut buf);
                Ok(Value::Double(NativeEndian::read_f64(&buf)))
            }

            // -- system -----------------------------------------------
            "timer" => Ok(Value::Single(seconds_since_midnight() as f32)),
            "date$" => {
                let (year, month, day) = today();
                Ok(Value::String(
                    format!("{:02}-{:02}-{:04}", month, day, year).into_bytes(),
                ))
            }
            "time$" => {
                let seconds = seconds_since_midnight() as u64;
                Ok(Value::String(
                    format!(
                        "{:02}:{:02}:{:02}",
                        seconds / 3600,
                        seconds % 3600 / 60,
                        seconds % 60
                    )
                    .into_bytes(),
                ))
            }
            "environ$" => {
                let key = bytes_to_text(bytes(v, 0)?);
                let value = env::var(&key).unwrap_or_default();
                string_value(text_to_bytes(&value))
            }
            "error$" => {
                want(v, &[0, 1])?;
                let code = if v.is_empty() {
                    self.runtime.error.code
                } else {
                    f64_to_i16(num(v, 0)?)
                };
                if code == 0 {
                    return Ok(Value::String(Vec::new()));
                }
                Ok(Value::String(message_for_code(code).as_bytes().to_vec()))
            }
            "fre" => Ok(Value::Double(constants::FRE_REPORT)),

            // Hardware-proximate stubs.
            "peek" | "inp" | "varptr" | "usr" => Ok(Value::Integer(0)),

            // TAB/SPC only mean something inside a PRINT list.
            "tab" | "spc" => Err(ErrorCode::IllegalFunctionCall.into()),

            _ => Err(ErrorCode::SyntaxError.into()),
        }
    }
}

fn copy_padded(src: &[u8], dst: &mut [u8]) {
    let take = src.len().min(dst.len());
    dst[..take].copy_from_slice(&src[..take]);
}

fn seconds_since_midnight() -> f64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_millis() % 86_400_000) as f64 / 1000.0
}

/// Civil date from the epoch day count (Gregorian calendar, UTC).
fn today() -> (i64, u32, u32) {
    let days = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_secs() / 86_400) as i64)
        .unwrap_or(0);
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
