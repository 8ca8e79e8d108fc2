pub(crate) mod common;
mod security_tests;
