//! Finding descriptions: the initial scan and the debounced mutation watcher.
//!
//! Field collections insert and remove whole subtrees asynchronously. The
//! watcher only queues child-list changes inside the observed editor
//! regions, restarts the quiet-period timer on every new batch, and hands
//! the whole batch over once the timer fires.

use crate::attach::is_settled;
use crate::config::HostSelectors;
use crate::dom::{Document, MutationRecord};
use crate::timer::{Scheduler, TimerKind};
use std::collections::HashSet;
use std::time::Duration;

/// Every description element currently in the document, in document order.
pub fn scan_descriptions(doc: &Document, selectors: &HostSelectors) -> Vec<u64> {
    doc.find_all(doc.root(), &selectors.description)
}

/// Descriptions inserted by `batch` that still need attachment.
///
/// Finite per batch; nodes removed again before the batch closed are skipped.
pub fn newly_added_descriptions<'a>(
    doc: &'a Document,
    selectors: &'a HostSelectors,
    batch: &'a [MutationRecord],
) -> impl Iterator<Item = u64> + 'a {
    let mut seen = HashSet::new();
    batch
        .iter()
        .flat_map(|record| record.added.iter().copied())
        .filter(move |&added| doc.contains(added))
        .flat_map(move |added| {
            let own = selectors.description.matches(doc, added).then_some(added);
            own.into_iter().chain(doc.find_all(added, &selectors.description))
        })
        .filter(move |&id| seen.insert(id))
        .filter(move |&id| !is_settled(doc, id))
}

/// Debounced child-list observer over the dynamic editor regions.
#[derive(Debug, Default)]
pub struct MutationWatcher {
    regions: Vec<u64>,
    batch: Vec<MutationRecord>,
    debounce: Option<u64>,
}

impl MutationWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)connect to every region matching the configured selector.
    /// Returns the number of regions observed.
    pub fn observe(&mut self, doc: &Document, selectors: &HostSelectors, scheduler: &mut Scheduler) -> usize {
        self.disconnect(scheduler);
        self.regions = doc.find_all(doc.root(), &selectors.dynamic_regions);
        tracing::debug!("Observing {} dynamic region(s)", self.regions.len());
        self.regions.len()
    }

    /// Stop observing and drop anything queued.
    pub fn disconnect(&mut self, scheduler: &mut Scheduler) {
        scheduler.cancel_slot(&mut self.debounce);
        self.regions.clear();
        self.batch.clear();
    }

    pub fn is_connected(&self) -> bool {
        !self.regions.is_empty()
    }

    pub fn regions(&self) -> &[u64] {
        &self.regions
    }

    pub fn has_pending_batch(&self) -> bool {
        !self.batch.is_empty()
    }

    fn observes(&self, doc: &Document, target: u64) -> bool {
        self.regions
            .iter()
            .any(|&region| doc.is_inclusive_ancestor(region, target))
    }

    /// Queue the records that fall inside observed regions and restart the
    /// quiet-period timer if anything was queued.
    pub fn record(
        &mut self,
        doc: &Document,
        scheduler: &mut Scheduler,
        records: Vec<MutationRecord>,
        quiet_period: Duration,
    ) -> usize {
        let before = self.batch.len();
        for record in records {
            if !record.added.is_empty() && self.observes(doc, record.target) {
                self.batch.push(record);
            }
        }
        let queued = self.batch.len() - before;
        if queued > 0 {
            scheduler.cancel_slot(&mut self.debounce);
            self.debounce = Some(scheduler.schedule(TimerKind::MutationDebounce, quiet_period));
        }
        queued
    }

    /// Quiet period over: hand the batch to the caller.
    pub fn take_batch(&mut self) -> Vec<MutationRecord> {
        self.debounce = None;
        std::mem::take(&mut self.batch)
    }
}
