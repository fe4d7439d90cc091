//! progcalc core: the value domain of an RPN calculator
//!
//! Key design principles:
//! - Value: a scalar number or an ordered list of values
//! - Broadcasting: one rule shared by every binary arithmetic word
//! - Stack: removing operations check depth before touching anything
//!
//! # Modules
//!
//! - `error`: Error kinds raised by words, the registry and the dispatcher
//! - `value`: Core Value enum plus broadcast/concat/reduce/negate/count
//! - `stack`: Stack operations with underflow detection

pub mod error;
pub mod stack;
pub mod value;

// Re-export key types and functions
pub use error::{CalcError, CompileError, Result};
pub use stack::Stack;
pub use value::{Value, broadcast, concat, count, is_list, negate, reduce};
