//! Calculator stack
//!
//! A growable sequence of [`Value`]s with the top at the end. Every
//! removing operation checks depth first, so a failing call never leaves
//! a half-popped stack behind.

use crate::error::{CalcError, Result};
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    values: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Stack::default()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Remove and return the top value
    pub fn pop(&mut self) -> Result<Value> {
        self.values
            .pop()
            .ok_or_else(|| CalcError::underflow(1, 0))
    }

    /// Pop two values for a binary operation, returned as `(a, b)` where
    /// `b` was on top.
    ///
    /// Fails without removing anything when fewer than two values are
    /// present.
    pub fn pop_two(&mut self) -> Result<(Value, Value)> {
        self.require(2)?;
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }

    /// Borrow the top value without removing it
    pub fn peek(&self) -> Result<&Value> {
        self.values.last().ok_or_else(|| CalcError::underflow(1, 0))
    }

    /// Fail with `StackUnderflow` unless at least `needed` values are present
    pub fn require(&self, needed: usize) -> Result<()> {
        if self.values.len() < needed {
            return Err(CalcError::underflow(needed, self.values.len()));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.values.len()
    }

    /// Pop until empty; clearing an empty stack is not an error
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Values bottom to top
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }
}

impl From<Vec<Value>> for Stack {
    fn from(values: Vec<Value>) -> Self {
        Stack { values }
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut stack = Stack::new();
        stack.push(Value::Scalar(1.0));
        stack.push(Value::Scalar(2.0));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop(), Ok(Value::Scalar(2.0)));
        assert_eq!(stack.pop(), Ok(Value::Scalar(1.0)));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut stack = Stack::new();
        assert!(matches!(
            stack.pop(),
            Err(CalcError::StackUnderflow { needed: 1, depth: 0 })
        ));
        assert!(stack.peek().is_err());
    }

    #[test]
    fn test_pop_two_is_all_or_nothing() {
        let mut stack = Stack::from(vec![Value::Scalar(1.0)]);
        assert!(matches!(
            stack.pop_two(),
            Err(CalcError::StackUnderflow { needed: 2, depth: 1 })
        ));
        assert_eq!(stack.depth(), 1);

        stack.push(Value::Scalar(2.0));
        let (a, b) = stack.pop_two().unwrap();
        assert_eq!(a, Value::Scalar(1.0));
        assert_eq!(b, Value::Scalar(2.0));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let stack = Stack::from(vec![Value::Scalar(3.0)]);
        assert_eq!(stack.peek(), Ok(&Value::Scalar(3.0)));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut stack = Stack::from(vec![Value::Scalar(0.0), Value::Scalar(0.0)]);
        stack.clear();
        assert!(stack.is_empty());
        stack.clear();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_empty_differs_from_zero_filled() {
        let zeros = Stack::from(vec![Value::Scalar(0.0)]);
        assert_ne!(zeros, Stack::new());
        assert!(!zeros.is_empty());
    }
}
