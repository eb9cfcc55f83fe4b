//! Async loader runner.
//!
//! A single tokio task owns the [`QueueController`] and is the only place
//! that awaits a fetch. Callers talk to it through a cloneable
//! [`LoaderHandle`], which sends commands over an unbounded channel and reads
//! the latest published status from a `watch` channel.
//!
//! # Concurrency Model
//!
//! - One runner task per loader; no locks around the controller
//! - At most one fetch task in flight, spawned from the controller's drain
//! - Commands are still processed while a fetch is in flight, so items can
//!   be enqueued during loading
//! - Event handlers run on the runner task; they may hold a `LoaderHandle`
//!   and enqueue more work without deadlocking, since sending never blocks
//!
//! Commands are applied in the order they were sent, so `cancel()` followed
//! by `enqueue()` always drops the enqueued items.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use seqload_core::{
    DecoratorPort, EventName, FetchError, LoaderConfig, LoaderError, LoaderEvent, LoaderStatus,
    ResourceDescriptor, TransportPort,
};

use crate::controller::QueueController;
use crate::dispatcher::EventHandler;

/// Commands sent from handles to the runner.
enum Command {
    Enqueue(Vec<ResourceDescriptor>),
    Start,
    Cancel,
    Subscribe(EventName, EventHandler),
    EmitCustom(String, serde_json::Value),
    Shutdown,
}

/// Status published by the runner after every step.
#[derive(Clone, Debug, Default)]
struct RunnerStatus {
    status: LoaderStatus,
    /// Number of commands applied so far.
    processed: u64,
}

/// Cloneable handle to a running loader.
#[derive(Clone)]
pub struct LoaderHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<RunnerStatus>,
    cancel: CancellationToken,
    sent: Arc<AtomicU64>,
}

impl LoaderHandle {
    /// Append descriptors to the loader's queue.
    ///
    /// Once the loader is cancelled the items are silently dropped.
    pub fn enqueue<I>(&self, descriptors: I) -> Result<(), LoaderError>
    where
        I: IntoIterator<Item = ResourceDescriptor>,
    {
        if self.cancel.is_cancelled() {
            tracing::debug!(target: "seqload.loader", "Enqueue after cancel dropped");
            return Ok(());
        }
        self.send(Command::Enqueue(descriptors.into_iter().collect()))
    }

    /// Ask the runner to start draining.
    pub fn start(&self) -> Result<(), LoaderError> {
        self.send(Command::Start)
    }

    /// Stop draining. The fetch in flight still settles normally.
    pub fn cancel(&self) -> Result<(), LoaderError> {
        self.cancel.cancel();
        self.send(Command::Cancel)
    }

    /// Whether `cancel()` has been called on any handle of this loader.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Register `handler` for `name`, replacing any previous handler.
    pub fn on<F>(&self, name: impl Into<EventName>, handler: F) -> Result<(), LoaderError>
    where
        F: FnMut(&LoaderEvent) + Send + 'static,
    {
        self.send(Command::Subscribe(name.into(), Box::new(handler)))
    }

    /// Emit a caller-defined event through the loader's dispatcher.
    pub fn emit_custom(
        &self,
        name: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<(), LoaderError> {
        self.send(Command::EmitCustom(name.into(), payload))
    }

    /// Stop waiting for new commands once those already sent are applied.
    ///
    /// The runner keeps draining until the queue is exhausted (or cancelled)
    /// and then exits. Commands sent while it drains, such as enqueues from
    /// event handlers, are still applied.
    pub fn shutdown(&self) -> Result<(), LoaderError> {
        self.send(Command::Shutdown)
    }

    /// Latest published status.
    pub fn status(&self) -> LoaderStatus {
        self.status.borrow().status.clone()
    }

    /// Whether the latest published status has nothing queued or outstanding.
    pub fn is_complete(&self) -> bool {
        self.status.borrow().status.is_complete()
    }

    /// Wait until every command sent so far has been applied and the loader
    /// has gone quiet (complete, or cancelled with nothing in flight).
    pub async fn wait_settled(&self) -> Result<LoaderStatus, LoaderError> {
        let target = self.sent.load(Ordering::SeqCst);
        let mut status = self.status.clone();
        status
            .wait_for(|s| s.processed >= target && s.status.is_quiescent())
            .await
            .map(|s| s.status.clone())
            .map_err(|_| LoaderError::RunnerStopped)
    }

    fn send(&self, command: Command) -> Result<(), LoaderError> {
        self.commands
            .send(command)
            .map_err(|_| LoaderError::RunnerStopped)?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A spawned loader: its handle plus the runner task.
pub struct Loader {
    handle: LoaderHandle,
    task: JoinHandle<QueueController>,
}

impl Loader {
    /// Build a controller from `config` and spawn its runner.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        config: LoaderConfig,
        transport: Arc<dyn TransportPort>,
        decorator: Arc<dyn DecoratorPort>,
    ) -> Self {
        spawn_loader(QueueController::new(config, decorator), transport)
    }

    /// Handle for sending commands to this loader.
    pub const fn handle(&self) -> &LoaderHandle {
        &self.handle
    }

    /// Shut down and wait for the runner to finish draining.
    ///
    /// Returns the controller so its results can be inspected.
    pub async fn finish(self) -> Result<QueueController, LoaderError> {
        // An already-stopped runner still hands back its controller
        let _ = self.handle.shutdown();
        self.task.await.map_err(|e| {
            tracing::error!(target: "seqload.loader", error = %e, "Loader runner failed");
            LoaderError::RunnerStopped
        })
    }
}

/// Spawn a runner task that owns `controller`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_loader(controller: QueueController, transport: Arc<dyn TransportPort>) -> Loader {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(RunnerStatus {
        status: controller.status(),
        processed: 0,
    });

    let cancel = CancellationToken::new();
    if controller.is_cancelled() {
        cancel.cancel();
    }

    let runner = Runner {
        controller,
        transport,
        commands: commands_rx,
        status_tx,
        in_flight: None,
        processed: 0,
    };
    let task = tokio::spawn(runner.run());

    Loader {
        handle: LoaderHandle {
            commands: commands_tx,
            status: status_rx,
            cancel,
            sent: Arc::new(AtomicU64::new(0)),
        },
        task,
    }
}

/// The fetch currently in flight.
struct InFlight {
    descriptor: ResourceDescriptor,
    task: JoinHandle<Result<Bytes, FetchError>>,
}

struct Runner {
    controller: QueueController,
    transport: Arc<dyn TransportPort>,
    commands: mpsc::UnboundedReceiver<Command>,
    status_tx: watch::Sender<RunnerStatus>,
    in_flight: Option<InFlight>,
    processed: u64,
}

impl Runner {
    async fn run(mut self) -> QueueController {
        tracing::debug!(target: "seqload.loader", "Loader runner started");
        let mut accepting = true;

        loop {
            if !accepting {
                self.apply_queued();
            }
            self.publish();
            if !accepting && self.in_flight.is_none() {
                break;
            }

            tokio::select! {
                biased;

                joined = join_in_flight(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.on_joined(joined);
                }

                command = self.commands.recv(), if accepting => {
                    match command {
                        Some(command) => {
                            self.processed += 1;
                            accepting = self.apply(command);
                        }
                        // Every handle dropped
                        None => accepting = false,
                    }
                }
            }
        }

        tracing::debug!(
            target: "seqload.loader",
            processed = self.processed,
            "Loader runner stopped"
        );
        self.controller
    }

    /// Apply every command already in the channel without waiting.
    ///
    /// Used after shutdown, where handlers may still enqueue from inside a
    /// settlement.
    fn apply_queued(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.processed += 1;
            self.apply(command);
        }
    }

    /// Apply one command. Returns `false` once the runner should stop
    /// accepting commands.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Enqueue(items) => {
                let next = self.controller.enqueue(items);
                self.issue(next);
            }
            Command::Start => {
                let next = self.controller.start();
                self.issue(next);
            }
            Command::Cancel => self.controller.cancel(),
            Command::Subscribe(name, handler) => {
                self.controller.on(name, handler);
            }
            Command::EmitCustom(name, payload) => {
                self.controller.emit_custom(name, payload);
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn on_joined(&mut self, joined: Result<Result<Bytes, FetchError>, JoinError>) {
        let Some(flight) = self.in_flight.take() else {
            return;
        };
        let outcome = joined.unwrap_or_else(|e| {
            tracing::warn!(
                target: "seqload.loader",
                key = %flight.descriptor.key,
                error = %e,
                "Transport task failed"
            );
            Err(FetchError::other(format!("transport task failed: {e}")))
        });

        let next = self.controller.settle(&flight.descriptor, outcome);
        self.issue(next);
    }

    fn issue(&mut self, next: Option<ResourceDescriptor>) {
        let Some(descriptor) = next else {
            return;
        };

        let transport = Arc::clone(&self.transport);
        let encoding = self.controller.config().response_encoding;
        let request = descriptor.clone();
        let task = tokio::spawn(async move { transport.fetch(&request, encoding).await });

        self.in_flight = Some(InFlight { descriptor, task });
    }

    fn publish(&self) {
        self.status_tx.send_replace(RunnerStatus {
            status: self.controller.status(),
            processed: self.processed,
        });
    }
}

async fn join_in_flight(
    slot: &mut Option<InFlight>,
) -> Result<Result<Bytes, FetchError>, JoinError> {
    match slot {
        Some(flight) => (&mut flight.task).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use seqload_core::{BatchState, ResponseEncoding};

    use crate::decorate::AudioDecorator;

    /// Transport that fails keys starting with `bad` and counts fetches.
    #[derive(Default)]
    struct CountingTransport {
        calls: Mutex<HashMap<String, u32>>,
        delay: Duration,
    }

    #[async_trait]
    impl TransportPort for CountingTransport {
        async fn fetch(
            &self,
            descriptor: &ResourceDescriptor,
            _encoding: ResponseEncoding,
        ) -> Result<Bytes, FetchError> {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(descriptor.key.to_string())
                .or_default() += 1;
            tokio::time::sleep(self.delay).await;
            if descriptor.key.as_str().starts_with("bad") {
                Err(FetchError::network_with_status("server error", 500))
            } else {
                Ok(Bytes::from(descriptor.key.to_string()))
            }
        }
    }

    fn loader(transport: Arc<CountingTransport>) -> Loader {
        Loader::spawn(
            LoaderConfig::default(),
            transport,
            Arc::new(AudioDecorator::new()),
        )
    }

    #[tokio::test]
    async fn test_drains_whole_queue() {
        let transport = Arc::new(CountingTransport::default());
        let loader = loader(Arc::clone(&transport));
        let handle = loader.handle().clone();

        handle
            .enqueue(["1.bin", "2.bin", "bad.bin"].map(ResourceDescriptor::new))
            .unwrap();
        let status = handle.wait_settled().await.unwrap();

        assert!(status.is_complete());
        assert_eq!(status.state, BatchState::Finished);
        assert_eq!(status.results.loaded, 2);
        assert_eq!(status.results.errored, 1);
        assert_eq!(transport.calls.lock().unwrap().len(), 3);

        let controller = loader.finish().await.unwrap();
        assert!(controller.results().has_loaded(&"2.bin".into()));
    }

    #[tokio::test]
    async fn test_handle_methods_fail_after_runner_stops() {
        let transport = Arc::new(CountingTransport::default());
        let loader = loader(transport);
        let handle = loader.handle().clone();

        loader.finish().await.unwrap();
        assert_eq!(handle.start(), Err(LoaderError::RunnerStopped));
    }

    #[tokio::test]
    async fn test_enqueue_from_handler() {
        let transport = Arc::new(CountingTransport::default());
        let loader = loader(Arc::clone(&transport));
        let handle = loader.handle().clone();

        // Chain a follow-up item from inside the itemLoaded handler
        let chained = handle.clone();
        handle
            .on(EventName::ItemLoaded, move |event| {
                if event
                    .descriptor()
                    .is_some_and(|item| item.key.as_str() == "first.bin")
                {
                    chained
                        .enqueue([ResourceDescriptor::new("second.bin")])
                        .unwrap();
                }
            })
            .unwrap();

        handle.enqueue([ResourceDescriptor::new("first.bin")]).unwrap();
        let controller = loader.finish().await.unwrap();

        assert!(controller.results().has_loaded(&"second.bin".into()));
        assert_eq!(transport.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_while_fetch_in_flight() {
        let transport = Arc::new(CountingTransport {
            delay: Duration::from_secs(5),
            ..Default::default()
        });
        let loader = loader(Arc::clone(&transport));
        let handle = loader.handle().clone();

        handle.enqueue([ResourceDescriptor::new("a.bin")]).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.status().outstanding, 1);

        handle
            .enqueue(["a.bin", "b.bin"].map(ResourceDescriptor::new))
            .unwrap();
        let status = handle.wait_settled().await.unwrap();

        assert_eq!(status.results.loaded, 2);
        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.get("a.bin"), Some(&1));
        assert_eq!(calls.get("b.bin"), Some(&1));
    }
}
