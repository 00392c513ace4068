//! Sensor domain logic for the envgauge exporter.
//!
//! Everything in this crate is free of HTTP and metrics concerns: the
//! sensor data model, the reader that turns a data file into a
//! [`reader::Reading`], and the error kinds a read can fail with.

pub mod error;
pub mod reader;
pub mod sensor;
pub mod types;
