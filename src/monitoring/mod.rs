/*!
 * Monitoring
 * Tracing subscriber setup and timed operation spans
 */

mod tracer;

pub use tracer::{init_tracing, OperationSpan};
