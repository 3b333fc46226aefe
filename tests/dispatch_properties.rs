//! Integration tests for selection and legend dispatch
//!
//! These drive the legend membership, the task info panel, and the selection
//! dialog's batch dispatch through the public API, without a running UI.

use std::collections::BTreeMap;

use proptest::prelude::*;

use tracevis_rs::frontend::dialogs::TaskSelectState;
use tracevis_rs::frontend::{
    AppAction, GraphId, GraphKind, GraphSet, LegendMembership, LegendSink, TaskInfoPanel,
};
use tracevis_rs::types::{Pid, TaskIdentity, TaskRecord};

/// Sink that counts every side effect
#[derive(Debug, Default)]
struct CountingSink {
    added: Vec<GraphId>,
    removed: Vec<GraphId>,
    replots: usize,
}

impl LegendSink for CountingSink {
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

fn selected_graph(set: &mut GraphSet, pid: Pid, name: &str, cpu: u32) -> GraphId {
    let g = set.create(GraphKind::PerCpu(cpu));
    g.set_task(TaskIdentity::new(pid, name));
    g.selected = true;
    g.id()
}

fn dialog_with_tasks(pids: &[(Pid, &str)]) -> TaskSelectState {
    let mut map = BTreeMap::new();
    for &(pid, name) in pids {
        map.insert(pid, TaskRecord::new(pid, name));
    }
    let mut state = TaskSelectState::default();
    state.model.begin_reset();
    state.model.set_task_map(map, 1.0);
    state.model.end_reset();
    state
}

#[test]
fn second_add_for_same_pid_keeps_original_view() {
    let mut set = GraphSet::new();
    let first = selected_graph(&mut set, 7, "irq/7", 0);
    let second = selected_graph(&mut set, 7, "irq/7", 1);

    let mut legend = LegendMembership::new();
    let mut sink = CountingSink::default();

    assert!(legend.add(7, first, &mut sink));
    assert!(!legend.add(7, second, &mut sink));

    assert_eq!(legend.graph_for(7), Some(first));
    assert_eq!(sink.added, vec![first]);
    assert_eq!(sink.replots, 1);
}

#[test]
fn remove_all_yields_exactly_one_redraw_for_any_entry_count() {
    for entry_count in [0u32, 1, 5] {
        let mut set = GraphSet::new();
        let mut legend = LegendMembership::new();
        let mut sink = CountingSink::default();

        for pid in 1..=entry_count {
            let id = selected_graph(&mut set, pid, "task", 0);
            legend.add(pid, id, &mut sink);
        }
        let replots_before = sink.replots;

        legend.remove_all(&mut sink);

        assert_eq!(
            sink.replots,
            replots_before + 1,
            "entry_count={}",
            entry_count
        );
        assert_eq!(sink.removed.len(), entry_count as usize);
        for pid in 1..=entry_count {
            assert!(!legend.contains(pid));
        }
    }
}

#[test]
fn set_focus_on_taskless_view_leaves_prior_focus() {
    let mut set = GraphSet::new();
    let good = selected_graph(&mut set, 42, "sshd", 0);
    let taskless = set.create(GraphKind::Unified).id();

    let mut panel = TaskInfoPanel::new();
    panel.set_focus(set.get(good).unwrap());
    panel.set_focus(set.get(taskless).unwrap());

    assert_eq!(panel.focused(), Some(good));
    assert_eq!(
        panel.request_add_graph(&set),
        Some(AppAction::AddTaskGraph(42))
    );
}

#[test]
fn add_graphs_emits_per_valid_row_in_row_order() {
    // Rows: 0 -> pid 7, 1 -> pid 42; row 5 does not resolve
    let mut dialog = dialog_with_tasks(&[(7, "irq/7"), (42, "sshd")]);
    dialog.click_row(0, true);
    dialog.click_row(1, true);
    dialog.click_row(5, true);

    let actions = dialog.request_add_graphs();
    assert_eq!(
        actions,
        vec![AppAction::AddTaskGraph(7), AppAction::AddTaskGraph(42)]
    );
}

#[test]
fn create_filter_collapses_duplicates_into_one_event() {
    // Two tasks; selecting both rows plus an unresolvable one yields one
    // event whose map has exactly the two resolved pids
    let mut dialog = dialog_with_tasks(&[(3, "rcu_preempt"), (9, "ksoftirqd/0")]);
    dialog.click_row(0, true);
    dialog.click_row(1, true);
    dialog.click_row(7, true);

    let AppAction::CreateFilter(map) = dialog.request_create_filter() else {
        panic!("expected a single CreateFilter action");
    };
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&3), Some(&3));
    assert_eq!(map.get(&9), Some(&9));
}

#[test]
fn sentinel_only_selection_emits_no_graph_or_legend_events() {
    let mut dialog = dialog_with_tasks(&[(0, "swapper")]);
    dialog.click_row(0, false);

    assert!(dialog.request_add_graphs().is_empty());
    assert!(dialog.request_add_to_legend().is_empty());

    // But the filter keeps the sentinel
    let AppAction::CreateFilter(map) = dialog.request_create_filter() else {
        panic!("expected CreateFilter");
    };
    assert_eq!(map.get(&0), Some(&0));
}

#[test]
fn cleared_focus_makes_every_action_a_noop() {
    let mut set = GraphSet::new();
    let id = selected_graph(&mut set, 42, "sshd", 0);

    let mut panel = TaskInfoPanel::new();
    panel.set_focus(set.get(id).unwrap());
    panel.clear_focus();

    let mut sink = CountingSink::default();
    assert!(panel.request_add_graph(&set).is_none());
    assert!(panel.request_remove_graph(&set).is_none());
    assert!(panel.request_find_wakeup(&set).is_none());
    assert!(!panel.add_focused_to_legend(&set, &mut sink));
    assert!(sink.added.is_empty());
    assert_eq!(sink.replots, 0);
    assert!(panel.legend().is_empty());
}

// ==================== Property tests ====================

#[derive(Debug, Clone)]
enum LegendOp {
    Add { pid: Pid, graph: usize },
    Remove { pid: Pid },
    RemoveAll,
}

fn legend_op() -> impl Strategy<Value = LegendOp> {
    prop_oneof![
        (0u32..5, 0usize..8).prop_map(|(pid, graph)| LegendOp::Add { pid, graph }),
        (0u32..5).prop_map(|pid| LegendOp::Remove { pid }),
        Just(LegendOp::RemoveAll),
    ]
}

proptest! {
    /// For any op sequence: at most one entry per pid, first add wins until
    /// removal, and replots equal successful adds plus bulk clears.
    #[test]
    fn legend_membership_invariants(ops in proptest::collection::vec(legend_op(), 0..64)) {
        let mut set = GraphSet::new();
        let graph_ids: Vec<GraphId> = (0..8)
            .map(|i| selected_graph(&mut set, i, "task", 0))
            .collect();

        let mut legend = LegendMembership::new();
        let mut sink = CountingSink::default();
        let mut reference: BTreeMap<Pid, GraphId> = BTreeMap::new();
        let mut expected_replots = 0usize;

        for op in ops {
            match op {
                LegendOp::Add { pid, graph } => {
                    let id = graph_ids[graph];
                    let inserted = legend.add(pid, id, &mut sink);
                    // First add wins; a duplicate is rejected
                    prop_assert_eq!(inserted, !reference.contains_key(&pid));
                    if inserted {
                        reference.insert(pid, id);
                        expected_replots += 1;
                    }
                }
                LegendOp::Remove { pid } => {
                    legend.remove(pid);
                    reference.remove(&pid);
                }
                LegendOp::RemoveAll => {
                    legend.remove_all(&mut sink);
                    reference.clear();
                    expected_replots += 1;
                }
            }

            prop_assert_eq!(legend.len(), reference.len());
            for (pid, id) in &reference {
                prop_assert_eq!(legend.graph_for(*pid), Some(*id));
            }
            prop_assert_eq!(sink.replots, expected_replots);
        }
    }

    /// Batch dispatch never emits the sentinel and never exceeds the
    /// selection size.
    #[test]
    fn dialog_dispatch_bounds(selected in proptest::collection::btree_set(0usize..12, 0..12)) {
        let mut dialog = dialog_with_tasks(&[
            (0, "swapper"),
            (3, "rcu_preempt"),
            (7, "irq/7"),
            (42, "sshd"),
        ]);
        for row in &selected {
            dialog.click_row(*row, true);
        }

        let actions = dialog.request_add_graphs();
        prop_assert!(actions.len() <= selected.len());
        for action in &actions {
            let AppAction::AddTaskGraph(pid) = action else {
                panic!("unexpected action kind");
            };
            prop_assert_ne!(*pid, 0);
        }
    }
}
