//! Native primitives for the builtin word library
//!
//! The closed set of operations a definition can bind with
//! `native <tag>`. Everything else in the library is a composition of
//! these.
//!
//! Stack effects:
//!
//! ```text
//! dup       ( a -- a a )
//! drop      ( a -- )
//! swap      ( a b -- b a )
//! clear     ( ... -- )
//! add       ( a b -- a+b )          broadcast
//! subtract  ( a b -- a-b )          broadcast
//! multiply  ( a b -- a*b )          broadcast
//! divide    ( a b -- a/b )          broadcast, IEEE division
//! negate    ( a -- -a )
//! empty     ( -- [] )
//! concat    ( a b -- [a.. b..] )
//! collect   ( ... -- [...] )        concat until one value remains
//! sum       ( a -- n )
//! product   ( a -- n )
//! count     ( a -- n )              -1 for a scalar
//! ```

use progcalc_core::{Result, Stack, Value, broadcast, concat, count, negate, reduce};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Dup,
    Drop,
    Swap,
    Clear,
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
    Empty,
    Concat,
    Collect,
    Sum,
    Product,
    Count,
}

impl Primitive {
    pub const ALL: [Primitive; 15] = [
        Primitive::Dup,
        Primitive::Drop,
        Primitive::Swap,
        Primitive::Clear,
        Primitive::Add,
        Primitive::Subtract,
        Primitive::Multiply,
        Primitive::Divide,
        Primitive::Negate,
        Primitive::Empty,
        Primitive::Concat,
        Primitive::Collect,
        Primitive::Sum,
        Primitive::Product,
        Primitive::Count,
    ];

    /// Tag used after `native` in definition bodies
    pub fn tag(self) -> &'static str {
        match self {
            Primitive::Dup => "dup",
            Primitive::Drop => "drop",
            Primitive::Swap => "swap",
            Primitive::Clear => "clear",
            Primitive::Add => "add",
            Primitive::Subtract => "subtract",
            Primitive::Multiply => "multiply",
            Primitive::Divide => "divide",
            Primitive::Negate => "negate",
            Primitive::Empty => "empty",
            Primitive::Concat => "concat",
            Primitive::Collect => "collect",
            Primitive::Sum => "sum",
            Primitive::Product => "product",
            Primitive::Count => "count",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Primitive> {
        let tag = tag.to_ascii_lowercase();
        Primitive::ALL.into_iter().find(|p| p.tag() == tag)
    }

    /// Run the primitive against the live stack
    ///
    /// Fails with `StackUnderflow` before removing anything when the stack
    /// is too shallow.
    pub fn apply(self, stack: &mut Stack) -> Result<()> {
        match self {
            Primitive::Dup => {
                let top = stack.peek()?.clone();
                stack.push(top);
            }
            Primitive::Drop => {
                stack.pop()?;
            }
            Primitive::Swap => {
                let (a, b) = stack.pop_two()?;
                stack.push(b);
                stack.push(a);
            }
            Primitive::Clear => stack.clear(),
            Primitive::Add => binary(stack, |a, b| a + b)?,
            Primitive::Subtract => binary(stack, |a, b| a - b)?,
            Primitive::Multiply => binary(stack, |a, b| a * b)?,
            Primitive::Divide => binary(stack, |a, b| a / b)?,
            Primitive::Negate => {
                let a = stack.pop()?;
                stack.push(negate(&a));
            }
            Primitive::Empty => stack.push(Value::empty_list()),
            Primitive::Concat => {
                let (a, b) = stack.pop_two()?;
                stack.push(concat(a, b));
            }
            Primitive::Collect => {
                stack.require(1)?;
                while stack.depth() > 1 {
                    let (a, b) = stack.pop_two()?;
                    stack.push(concat(a, b));
                }
            }
            Primitive::Sum => {
                let a = stack.pop()?;
                stack.push(Value::Scalar(reduce(&a, 0.0, |x, y| x + y)));
            }
            Primitive::Product => {
                let a = stack.pop()?;
                stack.push(Value::Scalar(reduce(&a, 1.0, |x, y| x * y)));
            }
            Primitive::Count => {
                let a = stack.pop()?;
                stack.push(Value::Scalar(count(&a) as f64));
            }
        }
        Ok(())
    }
}

fn binary<F>(stack: &mut Stack, op: F) -> Result<()>
where
    F: Fn(f64, f64) -> f64,
{
    let (a, b) = stack.pop_two()?;
    stack.push(broadcast(&a, &b, op));
    Ok(())
}
