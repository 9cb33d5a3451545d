//! Golden-testing bridge between a ported microanalysis library and the EPQ
//! reference oracle. The oracle runs out-of-process; this crate owns request
//! canonicalization, the batch wire protocol, the subprocess adapter, the
//! session result cache, schema validation, and the collection-time
//! orchestrator that glues them to a test run.

pub mod cache;
pub mod domain;
pub mod harness;
pub mod modules;
pub mod oracle;
pub mod schema;
pub mod wire;
