//! Fixed instructions used by the workflow
//!
//! The city step is not loaded from configuration: it has no inputs, so its
//! instruction is a constant.

mod city;

pub use city::{CITY_EXPECTED_OUTPUT, CITY_TASK};
