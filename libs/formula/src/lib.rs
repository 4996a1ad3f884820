//! Weighted grade formulas
//!
//! Compiles a formula such as `(SE1 + 5((SE2 + SE3)/2) + SE4)/7` into named
//! entities with integer weightings, then computes weighted averages over them
//! or solves for the value one entity needs to reach a target average.
//!
//! ```text
//! Formula text
//!      |
//!   Lexer + literal readers
//!      |
//!   Compiler -> expression tree (exact rational weights)
//!      |
//!   Flatten + normalize -> GradeEntity list
//!      |
//!   WeightSolver (average / solve_for)
//! ```
//!
//! ```
//! use gradus_formula::{CompileOptions, WeightSolver};
//!
//! let mut solver = WeightSolver::from_formula("(a + 2b)/3", &CompileOptions::default()).unwrap();
//! solver.set_value("a", 4.0).unwrap();
//! assert_eq!(solver.solve_for("b", 3.0).unwrap(), 2.5);
//! ```

#![forbid(unsafe_code)]

pub mod ast;
pub mod compiler;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod literal;
pub mod rational;
pub mod record;
pub mod solver;

// Re-export main types
pub use compiler::{compile, CompileOptions, CompiledFormula, Compiler, WeightNormalization};
pub use error::{Error, Result};
pub use functions::Builtin;
pub use lexer::{CharSource, IterSource, Lexer};
pub use rational::Rational;
pub use record::{EntityRecord, FormulaRecord};
pub use solver::{GradeEntity, WeightSolver};
