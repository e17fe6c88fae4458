#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod errors;
pub(crate) mod json_schema;
pub mod server;
pub mod server_info;
pub mod tools;
