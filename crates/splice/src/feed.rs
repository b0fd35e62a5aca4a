use crossbeam_channel::{Receiver, Sender};
use record::FileRecord;

use crate::session::Event;

/// Input side of a sub-pipeline.
///
/// Each call to [`Iterator::next`] announces demand to the owning session and
/// then blocks until the session hands over the next record or closes the
/// input. The sub-pipeline therefore never holds more than one record that it
/// has pulled but not yet answered for.
pub struct Feed {
    demand: Sender<Event>,
    records: Receiver<FileRecord>,
    pulled: u64,
}

impl Feed {
    pub(crate) const fn new(demand: Sender<Event>, records: Receiver<FileRecord>) -> Self {
        Self {
            demand,
            records,
            pulled: 0,
        }
    }

    /// Number of records this feed has handed to the sub-pipeline.
    #[must_use]
    pub const fn pulled(&self) -> u64 {
        self.pulled
    }
}

impl Iterator for Feed {
    type Item = FileRecord;

    fn next(&mut self) -> Option<FileRecord> {
        if self.demand.send(Event::Demand).is_err() {
            return None;
        }
        let record = self.records.recv().ok()?;
        self.pulled += 1;
        Some(record)
    }
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed").field("pulled", &self.pulled).finish_non_exhaustive()
    }
}
