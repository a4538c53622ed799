//! Depth-first expression evaluation.

use super::Interpreter;
use crate::ast::{BinaryOp, Expr, UnaryOp, VarRef};
use crate::constants;
use crate::error::{ErrorCode, ExecResult};
use crate::value::{
    check_string_len, f64_to_i16, numbers_equal, text_to_bytes, Value,
};

impl Interpreter {
    pub(crate) fn eval(&mut self, expr: &Expr) -> ExecResult<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Double(*n)),
            Expr::StringLit(s) => Ok(Value::String(text_to_bytes(s))),
            Expr::Var(var) => Ok(self.load_var(var)),
            Expr::Element(var, subscripts) => {
                let indices = self.eval_indices(subscripts)?;
                self.runtime.get_element(var, &indices)
            }
            Expr::Unary(op, operand) => self.eval_unary(*op, operand),
            Expr::Binary(op, lhs, rhs) => self.eval_binary(*op, lhs, rhs),
            Expr::UserFn(name, args) => self.call_user_fn(name, args),
            Expr::Call(name, args) => self.call_builtin(name, args),
        }
    }

    /// Scalar load; `ERR` and `ERL` read the error state whatever their
    /// suffix resolves to.
    pub(crate) fn load_var(&self, var: &VarRef) -> Value {
        match var.name.as_str() {
            "err" => Value::Integer(self.runtime.error.code),
            "erl" => Value::Double(f64::from(self.runtime.error.line)),
            _ => self.runtime.get_scalar(var),
        }
    }

    /// Evaluates to a number, rejecting strings (assignment-strength
    /// contexts: loop bounds, subscripts, file numbers).
    pub(crate) fn eval_number(&mut self, expr: &Expr) -> ExecResult<f64> {
        let value = self.eval(expr)?;
        if value.is_string() {
            Err(ErrorCode::TypeMismatch.into())
        } else {
            Ok(value.to_number())
        }
    }

    pub(crate) fn eval_index(&mut self, expr: &Expr) -> ExecResult<i32> {
        Ok(i32::from(f64_to_i16(self.eval_number(expr)?)))
    }

    pub(crate) fn eval_indices(&mut self, subscripts: &[Expr]) -> ExecResult<Vec<i32>> {
        subscripts.iter().map(|e| self.eval_index(e)).collect()
    }

    pub(crate) fn eval_string(&mut self, expr: &Expr) -> ExecResult<String> {
        let bytes = self.eval(expr)?.into_bytes()?;
        Ok(crate::value::bytes_to_text(&bytes))
    }

    pub(crate) fn eval_line_number(&mut self, expr: &Expr) -> ExecResult<u16> {
        let n = self.eval_number(expr)?;
        if n < 0.0 || n > f64::from(constants::MAX_LINE_NUMBER) {
            Err(ErrorCode::UndefinedLineNumber.into())
        } else {
            Ok(n as u16)
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> ExecResult<Value> {
        let value = self.eval(operand)?;
        match op {
            UnaryOp::Neg => {
                if value.is_string() {
                    Err(ErrorCode::TypeMismatch.into())
                } else {
                    Ok(Value::Double(-value.to_number()))
                }
            }
            UnaryOp::Not => Ok(Value::Integer(!value.to_i16())),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> ExecResult<Value> {
        let left = self.eval(lhs)?;
        let right = self.eval(rhs)?;

        // `+` with any string operand concatenates the string parts.
        if op == BinaryOp::Add && (left.is_string() || right.is_string()) {
            let mut bytes = match &left {
                Value::String(s) => s.clone(),
                _ => Vec::new(),
            };
            if let Value::String(s) = &right {
                bytes.extend_from_slice(s);
            }
            check_string_len(bytes.len())?;
            return Ok(Value::String(bytes));
        }

        match op {
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le
            | BinaryOp::Ge => self.compare(op, &left, &right),

            BinaryOp::And | BinaryOp::Or | BinaryOp::Xor | BinaryOp::Eqv | BinaryOp::Imp => {
                let a = left.to_i16();
                let b = right.to_i16();
                Ok(Value::Integer(match op {
                    BinaryOp::And => a & b,
                    BinaryOp::Or => a | b,
                    BinaryOp::Xor => a ^ b,
                    BinaryOp::Eqv => !(a ^ b),
                    BinaryOp::Imp => !a | b,
                    _ => unreachable!(),
                }))
            }

            BinaryOp::IntDiv | BinaryOp::Mod => {
                let a = left.to_i16();
                let b = right.to_i16();
                if b == 0 {
                    return Err(ErrorCode::DivisionByZero.into());
                }
                Ok(Value::Integer(match op {
                    BinaryOp::IntDiv => a.wrapping_div(b),
                    _ => a.wrapping_rem(b),
                }))
            }

            _ => {
                let a = left.to_number();
                let b = right.to_number();
                let result = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => {
                        if b == 0.0 {
                            return Err(ErrorCode::DivisionByZero.into());
                        }
                        a / b
                    }
                    BinaryOp::Pow => {
                        let r = a.powf(b);
                        if r.is_nan() {
                            return Err(ErrorCode::IllegalFunctionCall.into());
                        }
                        r
                    }
                    _ => unreachable!(),
                };
                Ok(Value::Double(result))
            }
        }
    }

    fn compare(&self, op: BinaryOp, left: &Value, right: &Value) -> ExecResult<Value> {
        let ordering = match (left, right) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::String(_), _) | (_, Value::String(_)) => {
                return Err(ErrorCode::TypeMismatch.into());
            }
            _ => {
                let a = left.to_number();
                let b = right.to_number();
                if numbers_equal(a, b) {
                    std::cmp::Ordering::Equal
                } else {
                    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
                }
            }
        };
        let truth = match op {
            BinaryOp::Eq => ordering == std::cmp::Ordering::Equal,
            BinaryOp::Ne => ordering != std::cmp::Ordering::Equal,
            BinaryOp::Lt => ordering == std::cmp::Ordering::Less,
            BinaryOp::Gt => ordering == std::cmp::Ordering::Greater,
            BinaryOp::Le => ordering != std::cmp::Ordering::Greater,
            BinaryOp::Ge => ordering != std::cmp::Ordering::Less,
            _ => unreachable!(),
        };
        Ok(Value::Double(if truth {
            constants::TRUE
        } else {
            constants::FALSE
        }))
    }

    /// `FN` call: bind arguments over the parameter cells, evaluate the
    /// body, restore the shadowed cells, coerce to the function's type.
    fn call_user_fn(&mut self, name: &VarRef, args: &[Expr]) -> ExecResult<Value> {
        let def = self
            .runtime
            .fns
            .get(&name.key())
            .cloned()
            .ok_or(ErrorCode::UndefinedUserFunction)?;
        if def.params.len() != args.len() {
            return Err(ErrorCode::IllegalFunctionCall.into());
        }
        if self.fn_depth >= constants::MAX_FN_DEPTH {
            return Err(ErrorCode::OutOfMemory.into());
        }

        let mut arguments = Vec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.eval(arg)?);
        }

        let mut shadowed = Vec::with_capacity(def.params.len());
        for (param, value) in def.params.iter().zip(arguments) {
            shadowed.push((param.key(), self.runtime.scalars.get(&param.key()).cloned()));
            self.runtime.set_scalar(param, value)?;
        }

        self.fn_depth += 1;
        let result = self.eval(&def.body);
        self.fn_depth -= 1;

        for (key, old) in shadowed {
            match old {
                Some(value) => self.runtime.scalars.insert(key, value),
                None => self.runtime.scalars.remove(&key),
            };
        }
        result?.coerce(def.vtype)
    }
}
