use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use tracing::{debug, info, warn};

use crate::core::Marking;
use crate::reachability_graph::{MarkingId, ReachabilityGraph};

/// Reserved activity label marking the start of a trace
pub const TRACE_START: &str = "DEFAULT_TRACE_START_LABEL";

/// Sequence of activity labels, most recent activity last
pub type NGram = Vec<String>;

///
/// Index from the last (at most N) executed activities to the markings a process instance
/// can be in after executing them
///
/// The index keeps the marking bodies of the [`ReachabilityGraph`] it was built from, so it
/// resolves marking IDs without the graph.
///
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NGramIndex {
    /// Maximal length of indexed n-grams
    pub n_gram_size_limit: usize,
    /// Markings of the underlying reachability graph
    pub markings: BTreeMap<MarkingId, Marking>,
    /// Markings reachable by each n-gram
    #[serde_as(as = "Vec<(_, _)>")]
    pub associations: HashMap<NGram, BTreeSet<MarkingId>>,
}

/// Builder of an [`NGramIndex`] for a fixed [`ReachabilityGraph`]
#[derive(Debug, Clone)]
pub struct NGramIndexBuilder<'a> {
    graph: &'a ReachabilityGraph,
    n_gram_size_limit: usize,
}

/// Marking to expand, the n-gram leading from it to the target, and the target marking
type Expansion = (MarkingId, NGram, MarkingId);

impl NGramIndex {
    /// Prepare the index of `graph` with n-grams of length at most `n_gram_size_limit`
    ///
    /// A size limit of 0 is raised to 1.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(graph: &ReachabilityGraph, n_gram_size_limit: usize) -> NGramIndexBuilder<'_> {
        if n_gram_size_limit == 0 {
            warn!("N-gram size limit 0 is not supported, using 1 instead");
        }
        NGramIndexBuilder {
            graph,
            n_gram_size_limit: n_gram_size_limit.max(1),
        }
    }

    /// IDs of the markings reachable by `n_gram`
    pub fn get_marking_ids<S: AsRef<str>>(&self, n_gram: &[S]) -> Option<&BTreeSet<MarkingId>> {
        self.associations.get(&to_n_gram(n_gram))
    }

    /// Markings reachable by `n_gram` (ordered by marking ID)
    pub fn get_marking_state<S: AsRef<str>>(&self, n_gram: &[S]) -> Vec<&Marking> {
        self.get_marking_ids(n_gram)
            .map(|ids| self.resolve(ids).collect())
            .unwrap_or_default()
    }

    ///
    /// Best estimate of the marking reached after executing `history`
    ///
    /// Looks up the last N activities (prefixed with [`TRACE_START`] if the history is shorter),
    /// dropping the oldest activity until exactly one marking matches. If no suffix is
    /// deterministic, one marking of the longest matching suffix is returned.
    /// Marking IDs without a stored marking are skipped. Returns [`None`] if no suffix of the
    /// history is known.
    ///
    pub fn get_best_marking_state_for<S: AsRef<str>>(&self, history: &[S]) -> Option<&Marking> {
        let key = self.lookup_key(history);
        let mut fallback = None;
        for start in 0..key.len() {
            let Some(ids) = self.associations.get(&key[start..]) else {
                continue;
            };
            let Some(first) = self.resolve(ids).next() else {
                continue;
            };
            if ids.len() == 1 {
                return Some(first);
            }
            if fallback.is_none() {
                fallback = Some(first);
            }
        }
        fallback
    }

    /// [`NGramIndex::get_best_marking_state_for`] for many histories in parallel
    pub fn get_best_marking_states_for_all<H: AsRef<[String]> + Sync>(
        &self,
        histories: &[H],
    ) -> Vec<Option<&Marking>> {
        histories
            .par_iter()
            .map(|history| self.get_best_marking_state_for(history.as_ref()))
            .collect()
    }

    /// Check that all markings of this index carry the same IDs in `graph`
    pub fn is_consistent_with(&self, graph: &ReachabilityGraph) -> bool {
        self.markings.len() == graph.markings.len()
            && self
                .markings
                .iter()
                .all(|(id, marking)| graph.markings.get(id) == Some(marking))
            && self
                .associations
                .values()
                .flatten()
                .all(|id| self.markings.contains_key(id))
    }

    fn lookup_key<S: AsRef<str>>(&self, history: &[S]) -> NGram {
        let n = self.n_gram_size_limit;
        let starts_with_sentinel = history.first().is_some_and(|a| a.as_ref() == TRACE_START);
        if history.len() >= n || starts_with_sentinel {
            to_n_gram(&history[history.len().saturating_sub(n)..])
        } else {
            std::iter::once(TRACE_START.to_string())
                .chain(history.iter().map(|a| a.as_ref().to_string()))
                .collect()
        }
    }

    fn resolve<'a>(
        &'a self,
        ids: &'a BTreeSet<MarkingId>,
    ) -> impl Iterator<Item = &'a Marking> + 'a {
        ids.iter().filter_map(|id| self.markings.get(id))
    }
}

impl NGramIndexBuilder<'_> {
    ///
    /// Build the index
    ///
    /// Starting from every marking, incoming edges are followed backwards level by level.
    /// Each traversed path records its (reversed) activity labels as n-gram of its start
    /// marking, and the initial marking additionally records the n-gram prefixed with
    /// [`TRACE_START`]. Only n-grams still matching more than one marking after a level
    /// are grown further.
    ///
    pub fn build(self) -> NGramIndex {
        let now = Instant::now();
        let graph = self.graph;
        let limit = self.n_gram_size_limit;
        let mut associations: HashMap<NGram, BTreeSet<MarkingId>> = HashMap::new();
        let mut frontier: Vec<Expansion> = graph
            .markings
            .keys()
            .map(|id| (*id, NGram::new(), *id))
            .collect();

        let mut depth = 0;
        while !frontier.is_empty() {
            let mut next: Vec<Expansion> = Vec::new();
            for (marking, n_gram, target) in frontier {
                if Some(marking) == graph.initial_marking_id {
                    let with_start = std::iter::once(TRACE_START.to_string())
                        .chain(n_gram.iter().cloned())
                        .collect();
                    associations.entry(with_start).or_default().insert(target);
                }
                for edge in graph.incoming_edges.get(&marking).into_iter().flatten() {
                    let (source, _) = graph.edges[edge];
                    let grown: NGram = std::iter::once(graph.edge_to_activity[edge].clone())
                        .chain(n_gram.iter().cloned())
                        .collect();
                    associations
                        .entry(grown.clone())
                        .or_default()
                        .insert(target);
                    if grown.len() < limit {
                        next.push((source, grown, target));
                    }
                }
            }
            frontier = next
                .into_iter()
                .unique()
                .filter(|(_, n_gram, _)| associations.get(n_gram).is_some_and(|ids| ids.len() > 1))
                .collect();
            depth += 1;
            debug!(
                depth,
                associations = associations.len(),
                pending = frontier.len(),
                "Expanded n-gram level"
            );
        }

        info!(
            n_gram_size_limit = limit,
            n_grams = associations.len(),
            "Built n-gram index in {:?}",
            now.elapsed()
        );
        NGramIndex {
            n_gram_size_limit: limit,
            markings: graph.markings.clone(),
            associations,
        }
    }
}

fn to_n_gram<S: AsRef<str>>(activities: &[S]) -> NGram {
    activities.iter().map(|a| a.as_ref().to_string()).collect()
}
