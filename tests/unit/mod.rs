//! Unit tests for individual components

mod allocation_test;
mod audit_test;
mod builders_test;
mod config_test;
mod error_test;
mod forms_test;
mod util_test;
