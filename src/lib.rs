#![forbid(unsafe_code)]

pub mod builder;
pub mod clients;
pub mod config;
pub mod datamodel;
pub mod reporter;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
