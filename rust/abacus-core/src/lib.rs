//! Abacus Core
//!
//! Shared types used across the compiler, runtime and hosts: the dynamic
//! `Value`, the interned struct-key table, the function registry and the
//! unified error model.

pub mod error;
pub mod functions;
pub mod json;
pub mod keys;
pub mod value;

pub use error::{Error, ErrorKind};
pub use functions::{Arity, FunctionImpl, Registry, RegistryId, RegistryOptions};
pub use value::{StructValue, Value};
