//! EVS engine: connector transport, job submission, status polling and
//! invocation execution.
mod api;
mod engine;
mod host;
mod poll;
mod run;
mod submit;
mod types;

pub use api::{EvsApi, RawResponse, ReqwestApi, TransportSettings};
pub use engine::EngineHandle;
pub use host::{ChannelHostSink, HostSink};
pub use poll::poll_job;
pub use run::{run_transfer, stop_best_effort};
pub use submit::{new_job_id, submit_job};
pub use types::{EngineEvent, InvocationId};
