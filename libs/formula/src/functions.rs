//! Builtin function table
//!
//! Maps function names to [`Builtin`] and carries the accepted argument range.
//! Uses a compile-time perfect hash map (phf) for lookups without allocation.

use crate::error::{Error, Result};
use phf::phf_map;
use std::fmt;

/// Functions callable from a formula.
///
/// A call weighs its arguments like a parenthesized group; arguments that are
/// plain numbers (such as the degree of `root`) never become entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Root,
}

/// Function metadata
#[derive(Debug, Clone, Copy)]
pub struct FunctionMetadata {
    pub function: Builtin,
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
}

static FUNCTIONS_BY_NAME: phf::Map<&'static str, FunctionMetadata> = phf_map! {
    "root" => FunctionMetadata { function: Builtin::Root, name: "root", min_args: 1, max_args: 2 },
};

impl Builtin {
    /// Resolve a function name
    pub fn lookup(name: &str) -> Option<Builtin> {
        FUNCTIONS_BY_NAME.get(name).map(|m| m.function)
    }

    pub fn metadata(self) -> &'static FunctionMetadata {
        match self {
            Builtin::Root => &FUNCTIONS_BY_NAME["root"],
        }
    }

    pub fn name(self) -> &'static str {
        self.metadata().name
    }

    /// Validate the argument count of a call
    pub fn validate_args(self, arg_count: usize) -> Result<()> {
        let metadata = self.metadata();
        if arg_count < metadata.min_args || arg_count > metadata.max_args {
            return Err(Error::ArityOutOfRange {
                function: metadata.name,
                min: metadata.min_args,
                max: metadata.max_args,
                got: arg_count,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
