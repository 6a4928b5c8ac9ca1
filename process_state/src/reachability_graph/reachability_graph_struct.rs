use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use thiserror::Error;

use crate::core::Marking;

/// ID of a marking in a [`ReachabilityGraph`]
pub type MarkingId = usize;

/// ID of an edge in a [`ReachabilityGraph`]
pub type EdgeId = usize;

/// Errors when replaying an activity sequence on a [`ReachabilityGraph`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// The graph has no initial marking to start from
    #[error("Reachability graph has no initial marking")]
    NoInitialMarking,
    /// No outgoing edge of the current marking carries the activity
    #[error("Activity '{activity}' (position {position}) is not enabled in marking {marking_id}")]
    ActivityNotEnabled {
        /// Activity label
        activity: String,
        /// Position of the activity in the replayed sequence
        position: usize,
        /// Marking in which the activity was expected to be enabled
        marking_id: MarkingId,
    },
    /// Several outgoing edges of the current marking carry the activity
    #[error("Activity '{activity}' (position {position}) leads to {targets} markings from marking {marking_id}")]
    NonDeterministic {
        /// Activity label
        activity: String,
        /// Position of the activity in the replayed sequence
        position: usize,
        /// Marking with the ambiguous outgoing edges
        marking_id: MarkingId,
        /// Number of reachable target markings
        targets: usize,
    },
}

///
/// Reachability graph of a process model
///
/// Nodes are the markings observable between two activity executions, edges are labelled
/// with the executed activity. At most one edge exists per (activity, source, target).
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachabilityGraph {
    /// Markings by ID
    pub markings: BTreeMap<MarkingId, Marking>,
    /// Marking IDs by marking
    pub marking_to_id: HashMap<Marking, MarkingId>,
    /// Edges by ID as (source marking, target marking)
    pub edges: BTreeMap<EdgeId, (MarkingId, MarkingId)>,
    /// Activity label of each edge
    pub edge_to_activity: BTreeMap<EdgeId, String>,
    /// Edges of each activity label
    pub activity_to_edges: HashMap<String, BTreeSet<EdgeId>>,
    /// Incoming edges of each marking
    pub incoming_edges: HashMap<MarkingId, BTreeSet<EdgeId>>,
    /// Outgoing edges of each marking
    pub outgoing_edges: HashMap<MarkingId, BTreeSet<EdgeId>>,
    /// ID of the initial marking
    pub initial_marking_id: Option<MarkingId>,
}

impl ReachabilityGraph {
    /// Create new empty [`ReachabilityGraph`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marking (if not present yet) and return its ID
    ///
    /// If `is_initial` is set, the marking becomes the initial marking of the graph.
    pub fn add_marking(&mut self, marking: Marking, is_initial: bool) -> MarkingId {
        let marking_id = match self.marking_to_id.get(&marking) {
            Some(marking_id) => *marking_id,
            None => {
                let marking_id = self
                    .markings
                    .keys()
                    .next_back()
                    .map_or(0, |last| last + 1);
                self.insert_marking(marking_id, marking);
                marking_id
            }
        };
        if is_initial {
            self.initial_marking_id = Some(marking_id);
        }
        marking_id
    }

    pub(crate) fn insert_marking(&mut self, marking_id: MarkingId, marking: Marking) {
        self.marking_to_id.insert(marking.clone(), marking_id);
        self.markings.insert(marking_id, marking);
        self.incoming_edges.entry(marking_id).or_default();
        self.outgoing_edges.entry(marking_id).or_default();
    }

    /// Add an edge labelled `activity` between two markings (added if not present yet)
    ///
    /// Returns the ID of the new edge, or of the existing edge with the same label, source and target.
    pub fn add_edge(&mut self, activity: &str, source: &Marking, target: &Marking) -> EdgeId {
        let source_id = self.add_marking(source.clone(), false);
        let target_id = self.add_marking(target.clone(), false);
        self.add_edge_between(activity, source_id, target_id)
    }

    pub(crate) fn add_edge_between(
        &mut self,
        activity: &str,
        source_id: MarkingId,
        target_id: MarkingId,
    ) -> EdgeId {
        if let Some(existing) = self.find_edge(activity, source_id, target_id) {
            return existing;
        }
        let edge_id = self.edges.keys().next_back().map_or(0, |last| last + 1);
        self.edges.insert(edge_id, (source_id, target_id));
        self.edge_to_activity.insert(edge_id, activity.to_string());
        self.activity_to_edges
            .entry(activity.to_string())
            .or_default()
            .insert(edge_id);
        self.outgoing_edges
            .entry(source_id)
            .or_default()
            .insert(edge_id);
        self.incoming_edges
            .entry(target_id)
            .or_default()
            .insert(edge_id);
        edge_id
    }

    fn find_edge(&self, activity: &str, source_id: MarkingId, target_id: MarkingId) -> Option<EdgeId> {
        self.outgoing_edges.get(&source_id)?.iter().copied().find(|edge| {
            self.edges[edge].1 == target_id && self.edge_to_activity[edge] == activity
        })
    }

    /// ID of `marking`, if present
    pub fn get_marking_id(&self, marking: &Marking) -> Option<MarkingId> {
        self.marking_to_id.get(marking).copied()
    }

    /// The initial marking, if set
    pub fn initial_marking(&self) -> Option<&Marking> {
        self.initial_marking_id
            .and_then(|marking_id| self.markings.get(&marking_id))
    }

    /// All activity labels of the graph (sorted)
    pub fn activities(&self) -> BTreeSet<&str> {
        self.activity_to_edges.keys().map(String::as_str).collect()
    }

    /// Replay `activities` from the initial marking
    ///
    /// Returns the marking reached after each activity. Fails if an activity is not enabled,
    /// or if it leads to more than one marking.
    pub fn get_markings_from_activity_sequence<S: AsRef<str>>(
        &self,
        activities: &[S],
    ) -> Result<Vec<&Marking>, ReplayError> {
        let mut current = self.initial_marking_id.ok_or(ReplayError::NoInitialMarking)?;
        let mut reached = Vec::with_capacity(activities.len());
        for (position, activity) in activities.iter().enumerate() {
            let activity = activity.as_ref();
            let targets: Vec<MarkingId> = self
                .outgoing_edges
                .get(&current)
                .into_iter()
                .flatten()
                .filter(|edge| self.edge_to_activity[*edge] == activity)
                .map(|edge| self.edges[edge].1)
                .unique()
                .collect();
            current = match targets.as_slice() {
                [] => {
                    return Err(ReplayError::ActivityNotEnabled {
                        activity: activity.to_string(),
                        position,
                        marking_id: current,
                    })
                }
                [target] => *target,
                _ => {
                    return Err(ReplayError::NonDeterministic {
                        activity: activity.to_string(),
                        position,
                        marking_id: current,
                        targets: targets.len(),
                    })
                }
            };
            reached.push(&self.markings[&current]);
        }
        Ok(reached)
    }
}
