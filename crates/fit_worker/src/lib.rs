//! `fit_worker`: request/response protocol and the threaded job runner.
//!
//! A `Worker` runs each submitted `Request` on its own named thread. Responses
//! come back over an ordered channel: zero or more progress messages, then
//! exactly one terminal message.

mod job;
mod protocol;

pub use job::{CancelHandle, Job, Worker, WorkerConfig};
pub use protocol::{Action, Request, Response, ResponsePayload, UNKNOWN_ACTION};
