// src/core/mod.rs

pub mod application;
pub mod command;
pub mod commons;
pub mod errors;
pub mod flag;
pub mod flag_registry;
pub mod flag_set;
pub mod phase;
pub mod resolver;
pub mod task;
pub mod worker;
