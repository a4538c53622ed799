//! Scalar and array storage. Scalars auto-initialize to their type's zero
//! on first read; arrays auto-dimension to upper bound 10 per axis on first
//! subscripted use without `DIM`.

use super::Runtime;
use crate::ast::VarRef;
use crate::error::{ErrorCode, ExecResult};
use crate::value::{Value, VarType};

const IMPLICIT_UPPER_BOUND: usize = 10;

/// A dimensioned array: inclusive upper bounds per axis, row-major data,
/// lower bound from `OPTION BASE`.
pub struct Array {
    pub vtype: VarType,
    pub base: usize,
    pub dims: Vec<usize>,
    pub data: Vec<Value>,
}

impl Array {
    pub fn new(vtype: VarType, base: usize, dims: Vec<usize>) -> ExecResult<Array> {
        let mut size: usize = 1;
        for &upper in &dims {
            if upper < base {
                return Err(ErrorCode::SubscriptOutOfRange.into());
            }
            size = size
                .checked_mul(upper - base + 1)
                .ok_or(ErrorCode::OutOfMemory)?;
        }
        Ok(Array {
            vtype,
            base,
            dims,
            data: vec![vtype.zero(); size],
        })
    }

    /// Flattens a subscript list, checking `base ..= upper` on every axis.
    fn offset(&self, indices: &[i32]) -> ExecResult<usize> {
        if indices.len() != self.dims.len() {
            return Err(ErrorCode::SubscriptOutOfRange.into());
        }
        let mut offset = 0;
        for (&index, &upper) in indices.iter().zip(&self.dims) {
            if index < self.base as i32 || index > upper as i32 {
                return Err(ErrorCode::SubscriptOutOfRange.into());
            }
            let span = upper - self.base + 1;
            offset = offset * span + (index as usize - self.base);
        }
        Ok(offset)
    }

    pub fn get(&self, indices: &[i32]) -> ExecResult<Value> {
        Ok(self.data[self.offset(indices)?].clone())
    }

    pub fn set(&mut self, indices: &[i32], value: Value) -> ExecResult<()> {
        let offset = self.offset(indices)?;
        self.data[offset] = value.coerce(self.vtype)?;
        Ok(())
    }
}

impl Runtime {
    /// Reads a scalar; unset variables yield the type's zero.
    pub fn get_scalar(&self, var: &VarRef) -> Value {
        self.scalars
            .get(&var.key())
            .cloned()
            .unwrap_or_else(|| var.vtype.zero())
    }

    /// Assigns a scalar, coercing to the variable's resolved type.
    pub fn set_scalar(&mut self, var: &VarRef, value: Value) -> ExecResult<()> {
        let value = value.coerce(var.vtype)?;
        self.scalars.insert(var.key(), value);
        Ok(())
    }

    /// Overwrites a scalar cell without coercion (field-variable refresh).
    pub fn set_scalar_raw(&mut self, key: &str, value: Value) {
        self.scalars.insert(key.to_string(), value);
    }

    /// `DIM`: explicit dimensioning; redimensioning raises
    /// *Duplicate definition*.
    pub fn dim_array(&mut self, var: &VarRef, dims: Vec<usize>) -> ExecResult<()> {
        let key = var.key();
        if self.arrays.contains_key(&key) {
            return Err(ErrorCode::DuplicateDefinition.into());
        }
        let array = Array::new(var.vtype, self.option_base, dims)?;
        self.arrays.insert(key, array);
        Ok(())
    }

    fn auto_dim(&mut self, var: &VarRef, rank: usize) -> ExecResult<()> {
        let dims = vec![IMPLICIT_UPPER_BOUND; rank];
        let array = Array::new(var.vtype, self.option_base, dims)?;
        self.arrays.insert(var.key(), array);
        Ok(())
    }

    pub fn get_element(&mut self, var: &VarRef, indices: &[i32]) -> ExecResult<Value> {
        if !self.arrays.contains_key(&var.key()) {
            self.auto_dim(var, indices.len())?;
        }
        self.arrays[&var.key()].get(indices)
    }

    pub fn set_element(&mut self, var: &VarRef, indices: &[i32], value: Value) -> ExecResult<()> {
        let key = var.key();
        if !self.arrays.contains_key(&key) {
            self.auto_dim(var, indices.len())?;
        }
        self.arrays
            .get_mut(&key)
            .expect("array just ensured")
            .set(indices, value)
    }

    /// `ERASE a`: the array must exist.
    pub fn erase_array(&mut self, var: &VarRef) -> ExecResult<()> {
        match self.arrays.remove(&var.key()) {
            Some(_) => Ok(()),
            None => Err(ErrorCode::IllegalFunctionCall.into()),
        }
    }
}
