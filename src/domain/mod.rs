//! Core domain types and validation logic.

pub mod error;
pub mod collector;
pub mod catalog;
pub mod expression;
pub mod policy;
pub mod validator;
pub mod outcome;
