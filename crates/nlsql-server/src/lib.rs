//! nlsql service: question → SQL → rows, over HTTP

pub mod config;
pub mod history;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod pipeline;

pub use pipeline::{Conversion, ConvertError, Converter};
