use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{select, Receiver, Sender};
use tracing::{debug, trace, warn};

use crate::error::{StageFailure, StageFailureCause};
use crate::layers::Layer;
use crate::math::vector::Vector;
use crate::pipeline::cancel::CancellationToken;

pub(crate) type FailureLog = Arc<Mutex<Vec<StageFailure>>>;

/// How a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageExit {
    /// Input closed and fully drained.
    Completed,
    /// Downstream hung up.
    Disconnected,
    Cancelled,
    Failed,
}

/// One layer of a running pipeline, bound to its input and output queues.
pub(crate) struct Stage {
    pub(crate) index: usize,
    pub(crate) layer: Arc<dyn Layer>,
    pub(crate) input: Receiver<Vector>,
    pub(crate) output: Sender<Vector>,
    pub(crate) cancel: CancellationToken,
    pub(crate) failures: FailureLog,
}

impl Stage {
    /// Runs until the input is drained, downstream disconnects, the layer
    /// fails or cancellation is raised. Dropping `self` on return closes the
    /// output queue, which is how completion reaches the next stage.
    pub(crate) fn run(self) {
        let mut processed = 0usize;

        let exit = loop {
            let input = select! {
                recv(self.input) -> msg => match msg {
                    Ok(vector) => vector,
                    Err(_) => break StageExit::Completed,
                },
                recv(self.cancel.signal()) -> _ => break StageExit::Cancelled,
            };
            // Both arms can be ready at once; queued work is dropped once
            // cancelled.
            if self.cancel.is_cancelled() {
                break StageExit::Cancelled;
            }

            let output = match self.feed(&input) {
                Ok(output) => output,
                Err(cause) => {
                    warn!(stage = self.index, layer = self.layer.name(), %cause, "stage failed");
                    record_failure(&self.failures, StageFailure {
                        stage: self.index,
                        layer: self.layer.name().to_owned(),
                        cause,
                    });
                    break StageExit::Failed;
                }
            };
            trace!(stage = self.index, item = processed, "stage produced output");

            select! {
                send(self.output, output) -> res => if res.is_err() {
                    break StageExit::Disconnected;
                },
                recv(self.cancel.signal()) -> _ => break StageExit::Cancelled,
            }
            processed += 1;
        };

        debug!(stage = self.index, layer = self.layer.name(), processed, ?exit, "stage finished");
    }

    fn feed(&self, input: &Vector) -> Result<Vector, StageFailureCause> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.layer.feed(input))) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(err)) => Err(StageFailureCause::Layer(Box::new(err))),
            Err(payload) => Err(StageFailureCause::Panic(panic_message(payload))),
        }
    }
}

/// Posts every input, in order, into the first stage's queue. Dropping
/// `output` at the end tells stage 0 there is no more input.
///
/// A panicking input iterator is recorded against stage 0 under the layer
/// name `"input"`.
pub(crate) fn produce<I>(inputs: I, output: Sender<Vector>, cancel: CancellationToken, failures: FailureLog)
where
    I: Iterator<Item = Vector>,
{
    let mut inputs = inputs;
    let mut posted = 0usize;

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        while !cancel.is_cancelled() {
            let Some(vector) = inputs.next() else { break };
            select! {
                send(output, vector) -> res => if res.is_err() {
                    break;
                },
                recv(cancel.signal()) -> _ => break,
            }
            posted += 1;
        }
    }));

    if let Err(payload) = result {
        let cause = StageFailureCause::Panic(panic_message(payload));
        warn!(%cause, "input sequence panicked");
        record_failure(&failures, StageFailure { stage: 0, layer: "input".to_owned(), cause });
    }
    // The failure is logged before stage 0 can observe the closed queue.
    drop(output);
    debug!(posted, cancelled = cancel.is_cancelled(), "producer finished");
}

fn record_failure(failures: &FailureLog, failure: StageFailure) {
    failures
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(failure);
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
