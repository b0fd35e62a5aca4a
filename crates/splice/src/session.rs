use std::collections::VecDeque;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use logging::trace_splice;
use record::FileRecord;

use crate::error::{SpliceError, StageResult};
use crate::feed::Feed;

/// Messages sent from the worker thread back to the session.
///
/// Everything travels over one channel so that an output emitted before a
/// demand is always observed before that demand.
pub(crate) enum Event {
    Demand,
    Output(FileRecord),
    Failed(crate::error::StageError),
    Done,
}

/// Hand-off state between the session and its sub-pipeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandOff {
    /// The sub-pipeline asked for a record and nothing has been handed over.
    Idle,
    /// The sub-pipeline is working: either starting up or processing the
    /// record it was last given.
    AwaitingResult,
}

/// What [`SpliceSession::next_event`] observed.
#[derive(Debug)]
pub enum SpliceEvent {
    /// A record produced by the sub-pipeline, in emission order.
    Output(FileRecord),
    /// The sub-pipeline is idle and nothing is queued; submit a record or
    /// close the input.
    NeedsInput,
    /// The input was closed and the sub-pipeline has flushed everything.
    Finished,
}

/// Drives one sub-pipeline on a worker thread with gated admission.
///
/// Records submitted while the sub-pipeline is busy are queued and admitted
/// strictly in submission order, one at a time, each only after the
/// sub-pipeline asks for more input.
pub struct SpliceSession {
    feed: Option<Sender<FileRecord>>,
    events: Receiver<Event>,
    backlog: VecDeque<FileRecord>,
    hand_off: HandOff,
    closing: bool,
    finished: bool,
    worker: Option<JoinHandle<()>>,
    admitted: u64,
    emitted: u64,
}

impl SpliceSession {
    /// Starts `handler` on a worker thread.
    ///
    /// The handler receives the [`Feed`] and returns the sub-pipeline's
    /// output stream. The stream is created and drained on the worker, so it
    /// does not need to be `Send`.
    pub fn spawn<F, S>(handler: F) -> Result<Self, SpliceError>
    where
        F: FnOnce(Feed) -> S + Send + 'static,
        S: IntoIterator<Item = StageResult>,
    {
        let (feed_tx, feed_rx) = bounded::<FileRecord>(1);
        let (event_tx, event_rx) = bounded::<Event>(1);
        let demand_tx = event_tx.clone();

        let worker = thread::Builder::new()
            .name("pipekit-splice".to_owned())
            .spawn(move || worker_main(handler, Feed::new(demand_tx, feed_rx), &event_tx))
            .map_err(SpliceError::Spawn)?;

        Ok(Self {
            feed: Some(feed_tx),
            events: event_rx,
            backlog: VecDeque::new(),
            hand_off: HandOff::AwaitingResult,
            closing: false,
            finished: false,
            worker: Some(worker),
            admitted: 0,
            emitted: 0,
        })
    }

    /// Queues a record for the sub-pipeline.
    ///
    /// The record is handed over immediately when the sub-pipeline is idle
    /// and nothing else is waiting; otherwise it joins the backlog.
    pub fn submit(&mut self, record: FileRecord) -> Result<(), SpliceError> {
        if self.closing || self.finished {
            return Err(SpliceError::Closed);
        }
        if self.hand_off == HandOff::Idle && self.backlog.is_empty() {
            self.admit(record);
        } else {
            self.backlog.push_back(record);
        }
        Ok(())
    }

    /// Signals that no further records will be submitted.
    ///
    /// Queued records are still admitted. Once the backlog drains the
    /// sub-pipeline's input ends, and it may emit any buffered output before
    /// [`SpliceEvent::Finished`] is reported.
    pub fn close(&mut self) {
        if self.closing {
            return;
        }
        self.closing = true;
        trace_splice!(
            "input closed after {} admitted, {} queued",
            self.admitted,
            self.backlog.len()
        );
        self.release_feed_if_drained();
    }

    /// Blocks until the sub-pipeline produces output, needs input, or ends.
    ///
    /// After an error has been returned, or after [`SpliceEvent::Finished`],
    /// every further call reports [`SpliceEvent::Finished`].
    pub fn next_event(&mut self) -> Result<SpliceEvent, SpliceError> {
        loop {
            if self.finished {
                return Ok(SpliceEvent::Finished);
            }
            if self.hand_off == HandOff::Idle && !self.closing && self.backlog.is_empty() {
                return Ok(SpliceEvent::NeedsInput);
            }

            let Ok(event) = self.events.recv() else {
                self.finished = true;
                return Err(self.join_worker().err().unwrap_or(SpliceError::WorkerPanicked));
            };

            match event {
                Event::Demand => {
                    if let Some(record) = self.backlog.pop_front() {
                        self.admit(record);
                    } else {
                        self.hand_off = HandOff::Idle;
                        self.release_feed_if_drained();
                    }
                }
                Event::Output(record) => {
                    self.emitted += 1;
                    trace_splice!("output #{}: {}", self.emitted, record.path().display());
                    return Ok(SpliceEvent::Output(record));
                }
                Event::Failed(error) => {
                    self.finished = true;
                    self.shutdown();
                    return Err(SpliceError::Stage(error));
                }
                Event::Done => {
                    self.finished = true;
                    trace_splice!(
                        "sub-pipeline finished: {} admitted, {} emitted",
                        self.admitted,
                        self.emitted
                    );
                    self.join_worker()?;
                    return Ok(SpliceEvent::Finished);
                }
            }
        }
    }

    /// Current hand-off state.
    #[must_use]
    pub const fn hand_off(&self) -> HandOff {
        self.hand_off
    }

    /// Number of submitted records waiting for admission.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.backlog.len()
    }

    /// Number of records handed to the sub-pipeline so far.
    #[must_use]
    pub const fn admitted(&self) -> u64 {
        self.admitted
    }

    /// Number of records the sub-pipeline has emitted so far.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Whether the input side has been closed.
    #[must_use]
    pub const fn is_closing(&self) -> bool {
        self.closing
    }

    fn admit(&mut self, record: FileRecord) {
        self.hand_off = HandOff::AwaitingResult;
        self.admitted += 1;
        trace_splice!("admit #{}: {}", self.admitted, record.path().display());
        if let Some(feed) = &self.feed {
            // A send only fails once the sub-pipeline stopped reading its
            // input; the record is dropped with it.
            let _ = feed.send(record);
        }
    }

    fn release_feed_if_drained(&mut self) {
        if self.closing && self.backlog.is_empty() {
            self.feed = None;
        }
    }

    fn join_worker(&mut self) -> Result<(), SpliceError> {
        match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| SpliceError::WorkerPanicked),
            None => Ok(()),
        }
    }

    /// Disconnects both channels and waits for the worker to unwind.
    fn shutdown(&mut self) {
        self.feed = None;
        self.backlog.clear();
        drop(std::mem::replace(&mut self.events, crossbeam_channel::never()));
        let _ = self.join_worker();
    }
}

impl Drop for SpliceSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SpliceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpliceSession")
            .field("hand_off", &self.hand_off)
            .field("queued", &self.backlog.len())
            .field("closing", &self.closing)
            .field("finished", &self.finished)
            .field("admitted", &self.admitted)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

/// Body of the worker thread: build the sub-pipeline and forward its output.
fn worker_main<F, S>(handler: F, feed: Feed, events: &Sender<Event>)
where
    F: FnOnce(Feed) -> S,
    S: IntoIterator<Item = StageResult>,
{
    for item in handler(feed) {
        match item {
            Ok(record) => {
                if events.send(Event::Output(record)).is_err() {
                    return;
                }
            }
            Err(error) => {
                let _ = events.send(Event::Failed(error));
                return;
            }
        }
    }
    let _ = events.send(Event::Done);
}
