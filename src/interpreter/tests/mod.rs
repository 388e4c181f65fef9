//! Tests for the loop interpreter
//!
//! Organized by feature area

mod closure_tests;
mod helpers;
