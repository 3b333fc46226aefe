//! Legend membership tracking
//!
//! The shared legend must list each task at most once, even when a task is
//! represented by several graph objects (one per CPU a task migrated
//! across). [`LegendMembership`] enforces that invariant and batches the
//! redraw side effect: a bulk clear triggers exactly one replot, not one per
//! entry.
//!
//! Side effects go through the [`LegendSink`] trait so the membership logic
//! can be exercised without a plot.

use std::collections::BTreeMap;

use super::graph::{GraphId, GraphSet};
use crate::types::Pid;

/// Receiver of legend registration side effects
pub trait LegendSink {
    /// Register a graph's series in the shared legend
    fn add_to_legend(&mut self, graph: GraphId);

    /// Unregister a graph's series from the shared legend
    fn remove_from_legend(&mut self, graph: GraphId);

    /// Schedule one redraw of the plot
    fn replot(&mut self);
}

/// Tracks which pids currently have a legend entry
///
/// Invariant: at most one entry per pid at any time.
#[derive(Debug, Clone, Default)]
pub struct LegendMembership {
    entries: BTreeMap<Pid, GraphId>,
}

impl LegendMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `graph` to the legend under `pid`.
    ///
    /// If the pid already has an entry this is a no-op returning `false`,
    /// with no sink side effects, so the caller can skip redundant
    /// legend-insertion work. Otherwise the mapping is inserted, the graph is
    /// registered with the sink, and a single replot is triggered.
    pub fn add(&mut self, pid: Pid, graph: GraphId, sink: &mut dyn LegendSink) -> bool {
        if self.entries.contains_key(&pid) {
            return false;
        }

        self.entries.insert(pid, graph);
        sink.add_to_legend(graph);
        sink.replot();
        true
    }

    /// Drop the entry for `pid` if present. Idempotent.
    ///
    /// Performs no sink side effects: the unregistration is assumed already
    /// done or pending from the event that removed the graph.
    pub fn remove(&mut self, pid: Pid) {
        self.entries.remove(&pid);
    }

    /// Unregister every entry and clear the mapping.
    ///
    /// Triggers exactly one replot regardless of how many entries existed.
    pub fn remove_all(&mut self, sink: &mut dyn LegendSink) {
        for graph in self.entries.values() {
            sink.remove_from_legend(*graph);
        }
        sink.replot();
        self.entries.clear();
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.entries.contains_key(&pid)
    }

    /// The graph registered for `pid`, if any.
    pub fn graph_for(&self, pid: Pid) -> Option<GraphId> {
        self.entries.get(&pid).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Production sink: records registrations during dispatch and applies them
/// to the graph set afterwards.
///
/// Membership methods take the graph set immutably for task lookups, so the
/// side effects are deferred rather than applied through a second mutable
/// borrow.
#[derive(Debug, Default)]
pub struct DeferredLegendSink {
    added: Vec<GraphId>,
    removed: Vec<GraphId>,
    replot_requested: bool,
}

impl DeferredLegendSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the recorded `in_legend` flags and request a repaint if any
    /// replot was triggered.
    pub fn apply(self, graphs: &mut GraphSet, ctx: &egui::Context) {
        for id in self.added {
            if let Some(view) = graphs.get_mut(id) {
                view.in_legend = true;
            }
        }
        for id in self.removed {
            if let Some(view) = graphs.get_mut(id) {
                view.in_legend = false;
            }
        }
        if self.replot_requested {
            ctx.request_repaint();
        }
    }
}

impl LegendSink for DeferredLegendSink {
    fn add_to_legend(&mut self, graph: GraphId) {
        self.added.push(graph);
    }

    fn remove_from_legend(&mut self, graph: GraphId) {
        self.removed.push(graph);
    }

    fn replot(&mut self) {
        self.replot_requested = true;
    }
}

/// Counting sink for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub added: Vec<GraphId>,
    pub removed: Vec<GraphId>,
    pub replots: usize,
}

#[cfg(test)]
impl LegendSink for RecordingSink {
    fn add_to_legend(&mut self, graph: GraphId) {
        self.added.push(graph);
    }

    fn remove_from_legend(&mut self, graph: GraphId) {
        self.removed.push(graph);
    }

    fn replot(&mut self) {
        self.replots += 1;
    }
}
