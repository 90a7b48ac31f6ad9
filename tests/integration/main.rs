//! Integration test harness.

mod engine_test;
mod parser_test;
