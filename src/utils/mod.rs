//! Utility functions shared by the solvers.

pub mod matrix;

pub use matrix::add_intercept_column;
