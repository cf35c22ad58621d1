use evs_core::{EvsError, OutputUpdate, TransferReport};

/// Identifies one invocation submitted to an [`crate::EngineHandle`].
pub type InvocationId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Progress notification for the host's dashboard connector.
    Progress {
        invocation: InvocationId,
        percent: u32,
    },
    /// A push to the host's output setter.
    Outputs {
        invocation: InvocationId,
        update: OutputUpdate,
    },
    Completed {
        invocation: InvocationId,
        result: Result<TransferReport, EvsError>,
    },
}
