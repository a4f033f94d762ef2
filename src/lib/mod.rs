#[macro_use]
extern crate lazy_static;
extern crate tracing;

pub mod cli;
pub mod controller;
pub mod ftl;
pub mod helper;
pub mod logger;
pub mod metrics;
pub mod page;
pub mod render;
pub mod settings;
