use std::sync::mpsc;

use evs_core::OutputUpdate;

use crate::{EngineEvent, InvocationId};

/// Side effects an invocation has on its host: live progress and named outputs.
pub trait HostSink: Send + Sync {
    fn report_progress(&self, percent: u32);
    fn set_outputs(&self, update: &OutputUpdate);
}

/// Forwards host side effects as [`EngineEvent`]s tagged with the invocation.
pub struct ChannelHostSink {
    invocation: InvocationId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelHostSink {
    pub fn new(invocation: InvocationId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { invocation, tx }
    }
}

impl HostSink for ChannelHostSink {
    fn report_progress(&self, percent: u32) {
        let _ = self.tx.send(EngineEvent::Progress {
            invocation: self.invocation,
            percent,
        });
    }

    fn set_outputs(&self, update: &OutputUpdate) {
        let _ = self.tx.send(EngineEvent::Outputs {
            invocation: self.invocation,
            update: update.clone(),
        });
    }
}
