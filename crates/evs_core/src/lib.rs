//! EVS core: request building, response parsing and the pure poll state machine.
mod config;
mod error;
mod outcome;
mod output;
mod poll;
mod request;
mod response;

pub use config::{input_names, InputSource, NodeInputs, PollPolicy};
pub use error::EvsError;
pub use outcome::{resolve, PollOutcome, TransferReport};
pub use output::{CreationOutputs, OutputRecord, OutputUpdate};
pub use poll::{
    classify, update, PollEffect, PollExit, PollMsg, PollSnapshot, PollState, FAILURE_STATUSES,
    SUCCESS_STATUSES,
};
pub use request::{
    job_name_from_path, normalize_base, parse_metadata, JobRequest, MetadataEntry, MetadataInput,
    API_ROOT, DEFAULT_JOB_NAME,
};
pub use response::{parse_body, resolve_job_id, status_fields, StatusFields};
