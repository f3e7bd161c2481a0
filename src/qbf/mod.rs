//! Quadratic Binary Function (QBF) maximization.
//!
//! A QBF instance is an `n × n` coefficient matrix `A`; the objective of a
//! binary vector `x` is `xᵀAx`. [`Qbf`] implements
//! [`Evaluator`](crate::ga::Evaluator), so it plugs straight into
//! [`BinaryProblem`](crate::ga::BinaryProblem).
//!
//! # Instance format
//!
//! Whitespace separated: the dimension `n`, then the upper triangle of `A`
//! row by row (`n` values, then `n - 1`, ..., then `1`).

mod error;
mod instance;

pub use error::InstanceError;
pub use instance::Qbf;
