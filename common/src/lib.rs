#![deny(warnings)]
pub mod logging;
