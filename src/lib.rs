pub mod app;
pub mod assemble;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod hierarchy;
pub mod identity;
pub mod merge;
pub mod output;
pub mod project;
pub mod resolve;
pub mod sheet;
