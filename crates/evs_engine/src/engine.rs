use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::engine_error;
use evs_core::{EvsError, NodeInputs};

use crate::host::ChannelHostSink;
use crate::{run_transfer, EngineEvent, EvsApi, InvocationId, ReqwestApi, TransportSettings};

enum EngineCommand {
    Run {
        invocation: InvocationId,
        inputs: NodeInputs,
    },
}

/// Runs invocations on a background tokio runtime and reports their events.
///
/// Invocations are independent tasks; they share only the transport.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: TransportSettings) -> Result<Self, EvsError> {
        let api = ReqwestApi::new(settings)?;
        Ok(Self::with_api(Arc::new(api)))
    }

    pub fn with_api(api: Arc<dyn EvsApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    /// Queue an invocation. `false` means the engine thread is gone and no
    /// events will follow.
    #[must_use]
    pub fn submit(&self, invocation: InvocationId, inputs: NodeInputs) -> bool {
        self.cmd_tx
            .send(EngineCommand::Run { invocation, inputs })
            .is_ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Block until the next event; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    api: &dyn EvsApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Run { invocation, inputs } => {
            let sink = ChannelHostSink::new(invocation, event_tx.clone());
            let result = run_transfer(api, &inputs, &sink).await;
            let _ = event_tx.send(EngineEvent::Completed { invocation, result });
        }
    }
}
