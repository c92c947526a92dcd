use std::mem;
use std::sync::{Arc, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, Receiver};
use tracing::{debug, warn};

use crate::error::{NnError, PipelineError, Result};
use crate::layers::Layer;
use crate::math::vector::Vector;
use crate::pipeline::cancel::{cancellation, CancelHandle, CancellationToken};
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::stage::{produce, FailureLog, Stage};

type Inputs = Box<dyn Iterator<Item = Vector> + Send>;

/// Lazy output of `Network::feed_stream`.
///
/// Nothing runs until the first call to `next()`, which starts one worker
/// thread per layer plus a producer thread pulling from the inputs. Outputs
/// arrive in input order.
///
/// The producer is never joined: it may be parked inside the caller's input
/// iterator indefinitely. It exits on its own at its next send once the
/// stream has ended, without touching any layer.
///
/// # Failures
/// A stage whose layer errors or panics stops, and its failure is recorded.
/// Outputs already computed downstream of it are still yielded. Once they
/// are exhausted, the next call yields a single `Err(NnError::Pipeline)`
/// carrying every recorded failure, then `None`. Failures are never reported
/// ahead of outputs that precede them.
///
/// # Cancellation
/// Dropping the stream, calling `cancel()`, or cancelling through a
/// `CancelHandle` stops every worker at its next queue operation and
/// discards in-flight vectors. Drop joins every stage thread before
/// returning.
pub struct FeedStream {
    state: StreamState,
    handle: CancelHandle,
    token: CancellationToken,
}

enum StreamState {
    Pending(PendingRun),
    /// No layers: inputs flow straight through.
    Passthrough(Inputs),
    Running(RunningPipeline),
    Done,
}

struct PendingRun {
    layers: Arc<[Arc<dyn Layer>]>,
    inputs: Inputs,
    config: PipelineConfig,
}

struct RunningPipeline {
    output: Receiver<Vector>,
    workers: Vec<JoinHandle<()>>,
    failures: FailureLog,
}

impl FeedStream {
    pub(crate) fn new(layers: Arc<[Arc<dyn Layer>]>, inputs: Inputs, config: PipelineConfig) -> FeedStream {
        let (handle, token) = cancellation();
        let state = if layers.is_empty() {
            StreamState::Passthrough(inputs)
        } else {
            StreamState::Pending(PendingRun { layers, inputs, config })
        };
        FeedStream { state, handle, token }
    }

    /// Stops the pipeline. The next `next()` joins the workers and ends the
    /// stream, reporting any stage failures recorded before cancellation.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// A handle that can cancel this stream from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }
}

impl Iterator for FeedStream {
    type Item = Result<Vector>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match mem::replace(&mut self.state, StreamState::Done) {
                StreamState::Done => return None,
                StreamState::Passthrough(mut inputs) => {
                    if self.token.is_cancelled() {
                        return None;
                    }
                    let vector = inputs.next()?;
                    self.state = StreamState::Passthrough(inputs);
                    return Some(Ok(vector));
                }
                StreamState::Pending(pending) => {
                    if self.token.is_cancelled() {
                        return None;
                    }
                    match pending.start(&self.handle, &self.token) {
                        Ok(run) => self.state = StreamState::Running(run),
                        Err(err) => return Some(Err(err)),
                    }
                }
                StreamState::Running(run) => {
                    if let Some(vector) = run.recv(&self.token) {
                        self.state = StreamState::Running(run);
                        return Some(Ok(vector));
                    }
                    // Stage 0 may still be waiting on a blocked producer.
                    self.handle.cancel();
                    return run.finish().err().map(|err| Err(err.into()));
                }
            }
        }
    }
}

impl Drop for FeedStream {
    fn drop(&mut self) {
        if let StreamState::Running(run) = mem::replace(&mut self.state, StreamState::Done) {
            self.handle.cancel();
            if let Err(err) = run.finish() {
                warn!(%err, "stream dropped with unreported stage failures");
            }
        }
    }
}

impl PendingRun {
    /// Wires `input -> stage 0 -> ... -> stage n-1 -> output` and spawns a
    /// thread for each link. Only the stage threads are kept for joining.
    fn start(self, handle: &CancelHandle, token: &CancellationToken) -> Result<RunningPipeline> {
        let PendingRun { layers, inputs, config } = self;
        let failures = FailureLog::default();
        let mut workers = Vec::with_capacity(layers.len());

        debug!(stages = layers.len(), capacity = config.capacity, "starting pipeline");

        let (input_tx, mut upstream) = bounded(config.capacity);
        for (index, layer) in layers.iter().enumerate() {
            let (output, next_upstream) = bounded(config.capacity);
            let stage = Stage {
                index,
                layer: Arc::clone(layer),
                input: upstream,
                output,
                cancel: token.clone(),
                failures: Arc::clone(&failures),
            };
            upstream = next_upstream;

            let name = format!("{}-{index}", config.thread_name_prefix);
            match thread::Builder::new().name(name).spawn(move || stage.run()) {
                Ok(worker) => workers.push(worker),
                Err(err) => return Err(abort_start(err, workers, handle)),
            }
        }

        let producer = {
            let token = token.clone();
            let failures = Arc::clone(&failures);
            let name = format!("{}-input", config.thread_name_prefix);
            thread::Builder::new()
                .name(name)
                .spawn(move || produce(inputs, input_tx, token, failures))
        };
        if let Err(err) = producer {
            return Err(abort_start(err, workers, handle));
        }

        Ok(RunningPipeline { output: upstream, workers, failures })
    }
}

/// Tears down the stages that did start before a spawn failed.
fn abort_start(err: std::io::Error, workers: Vec<JoinHandle<()>>, handle: &CancelHandle) -> NnError {
    warn!(%err, started = workers.len(), "could not start pipeline worker");
    handle.cancel();
    join_all(workers);
    NnError::Spawn(err)
}

fn join_all(workers: Vec<JoinHandle<()>>) {
    for worker in workers {
        let name = worker.thread().name().unwrap_or("unnamed").to_owned();
        if worker.join().is_err() {
            warn!(worker = %name, "pipeline worker panicked outside its layer");
        }
    }
}

impl RunningPipeline {
    /// Next output, or `None` once the last stage has closed its queue or
    /// cancellation is raised.
    fn recv(&self, token: &CancellationToken) -> Option<Vector> {
        let received = select! {
            recv(self.output) -> msg => msg.ok(),
            recv(token.signal()) -> _ => None,
        };
        received.filter(|_| !token.is_cancelled())
    }

    /// Joins every stage and hands back the failures they recorded.
    ///
    /// Callers raise cancellation first, so no stage is left waiting on
    /// input. A stage in the middle of `feed` completes it and records any
    /// failure before exiting.
    fn finish(self) -> std::result::Result<(), PipelineError> {
        let RunningPipeline { output, workers, failures } = self;
        drop(output);
        join_all(workers);

        let failures = mem::take(&mut *failures.lock().unwrap_or_else(PoisonError::into_inner));
        debug!(failures = failures.len(), "pipeline finished");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::new(failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::Identity;

    fn layers(n: usize) -> Arc<[Arc<dyn Layer>]> {
        (0..n).map(|_| Arc::new(Identity) as Arc<dyn Layer>).collect()
    }

    fn inputs(n: usize) -> Inputs {
        Box::new((0..n).map(|i| Vector::from([i as f64])))
    }

    #[test]
    fn empty_network_passes_inputs_through() {
        let got: Vec<f64> = FeedStream::new(layers(0), inputs(4), PipelineConfig::default())
            .map(|v| v.unwrap()[0])
            .collect();
        assert_eq!(got, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn nothing_starts_before_first_pull() {
        let stream = FeedStream::new(layers(2), inputs(3), PipelineConfig::default());
        assert!(matches!(stream.state, StreamState::Pending(_)));
    }

    #[test]
    fn identity_stages_preserve_order() {
        let got: Vec<f64> = FeedStream::new(layers(3), inputs(50), PipelineConfig::new(1))
            .map(|v| v.unwrap()[0])
            .collect();
        assert_eq!(got, (0..50).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn rendezvous_queues_still_flow() {
        let got = FeedStream::new(layers(2), inputs(5), PipelineConfig::new(0)).count();
        assert_eq!(got, 5);
    }

    #[test]
    fn cancel_before_start_yields_nothing() {
        let mut stream = FeedStream::new(layers(2), inputs(5), PipelineConfig::default());
        stream.cancel();
        assert!(stream.next().is_none());
        assert!(stream.is_cancelled());
    }

    #[test]
    fn cancel_mid_stream_ends_iteration() {
        let mut stream = FeedStream::new(layers(2), inputs(1000), PipelineConfig::new(2));
        assert!(stream.next().unwrap().is_ok());
        stream.cancel();
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }
}
