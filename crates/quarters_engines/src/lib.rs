#![forbid(unsafe_code)]

pub mod audit;
pub mod catalog;
pub mod selector;
