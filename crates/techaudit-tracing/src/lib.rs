//! Tracing bootstrap shared by the techaudit binaries: fmt logging to stderr
//! plus optional OTLP span export.

pub mod config;
pub mod otlp;
pub mod spans;

pub use config::{LogFormat, OtlpProtocol, TracingConfig};
pub use otlp::{init_tracing, TracingGuard};
