//! Value model for the calculator
//!
//! A stack entry is either a scalar number or an ordered list of values.
//! All binary arithmetic goes through [`broadcast`], so the scalar/list
//! combinations behave the same for every operator:
//!
//! ```text
//! 2 3 *                 => 6
//! [1 2 3] 4 *           => [4 8 12]
//! 4 [1 2 3] *           => [4 8 12]
//! [1 2 3] [4 5 6] *     => [4 10 18]
//! [1 2] [1 2 3] +       => [2 4]        (shorter length wins)
//! ```
//!
//! Lists may nest. Nested elements are broadcast recursively, but the
//! builtin words only ever produce flat lists of scalars.

use std::fmt;

/// Value: what lives on the calculator stack
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// IEEE 754 double; division by zero yields Infinity/NaN, never an error
    Scalar(f64),

    /// Ordered sequence of values
    List(Vec<Value>),
}

impl Value {
    /// Build a flat list of scalars
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = f64>,
    {
        Value::List(items.into_iter().map(Value::Scalar).collect())
    }

    /// The empty list
    pub fn empty_list() -> Value {
        Value::List(Vec::new())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(n) => Some(*n),
            Value::List(_) => None,
        }
    }
}

/// True iff `v` is the list variant
pub fn is_list(v: &Value) -> bool {
    v.is_list()
}

/// Apply a binary operator with the broadcasting rule
///
/// - scalar, scalar: `op(a, b)`
/// - list, scalar: `op(x, b)` for each element `x` of `a`
/// - scalar, list: `op(a, x)` for each element `x` of `b`
/// - list, list: elementwise over the shorter of the two lengths; the
///   excess elements of the longer list are dropped
pub fn broadcast<F>(a: &Value, b: &Value, op: F) -> Value
where
    F: Fn(f64, f64) -> f64,
{
    broadcast_with(a, b, &op)
}

fn broadcast_with<F>(a: &Value, b: &Value, op: &F) -> Value
where
    F: Fn(f64, f64) -> f64,
{
    match (a, b) {
        (Value::Scalar(x), Value::Scalar(y)) => Value::Scalar(op(*x, *y)),
        (Value::List(xs), Value::Scalar(_)) => {
            Value::List(xs.iter().map(|x| broadcast_with(x, b, op)).collect())
        }
        (Value::Scalar(_), Value::List(ys)) => {
            Value::List(ys.iter().map(|y| broadcast_with(a, y, op)).collect())
        }
        (Value::List(xs), Value::List(ys)) => Value::List(
            xs.iter()
                .zip(ys.iter())
                .map(|(x, y)| broadcast_with(x, y, op))
                .collect(),
        ),
    }
}

/// Flat concatenation; scalar operands are wrapped as singleton lists
pub fn concat(a: Value, b: Value) -> Value {
    let mut items = match a {
        Value::List(xs) => xs,
        scalar => vec![scalar],
    };
    match b {
        Value::List(ys) => items.extend(ys),
        scalar => items.push(scalar),
    }
    Value::List(items)
}

/// Fold a list left-to-right starting from `identity`
///
/// A scalar is returned unchanged; the identity only seeds the
/// accumulator for lists. Nested list elements are reduced first.
pub fn reduce<F>(v: &Value, identity: f64, op: F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    reduce_with(v, identity, &op)
}

fn reduce_with<F>(v: &Value, identity: f64, op: &F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    match v {
        Value::Scalar(n) => *n,
        Value::List(xs) => xs
            .iter()
            .fold(identity, |acc, x| op(acc, reduce_with(x, identity, op))),
    }
}

/// Negate a scalar, or every element of a list
pub fn negate(v: &Value) -> Value {
    match v {
        Value::Scalar(n) => Value::Scalar(-n),
        Value::List(xs) => Value::List(xs.iter().map(negate).collect()),
    }
}

/// List length, or `-1` for a scalar
pub fn count(v: &Value) -> i64 {
    match v {
        Value::Scalar(_) => -1,
        Value::List(xs) => xs.len() as i64,
    }
}

/// Render a number the way the calculator display shows it
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        if n > 0.0 {
            write!(f, "Infinity")
        } else {
            write!(f, "-Infinity")
        }
    } else if n == 0.0 {
        // -0 displays as 0
        write!(f, "0")
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form with an explicit sign on positive exponents: 1e+21, 1e-7
        let exp = format!("{:e}", n);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                write!(f, "{}e+{}", mantissa, power)
            }
            _ => write!(f, "{}", exp),
        }
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(n) => fmt_number(*n, f),
            Value::List(xs) => {
                write!(f, "[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")
            }
        }
    }
}
