use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info};

use crate::core::{ModelError, TokenMarking};
use crate::reachability_graph::ReachabilityGraph;

use super::marking_advancement::MarkingAdvancer;
use super::options::ReachabilityGraphOptions;
use super::semantics::ExecutionSemantics;

/// Reference marking, observable step, and the advanced marking enabling the step
type Candidate = (TokenMarking, usize, TokenMarking);

///
/// Build the reachability graph of `model`
///
/// States are the markings advanced until their next decision point; edges are labelled with
/// the observable steps fired between them. Each reference marking is fully advanced once,
/// and each (reference, step, advanced marking) candidate is fired once.
///
pub fn build_reachability_graph<S: ExecutionSemantics + ?Sized>(
    model: &S,
    options: &ReachabilityGraphOptions,
) -> Result<ReachabilityGraph, ModelError> {
    let now = Instant::now();
    let initial = model
        .initial_tokens()?
        .ok_or(ModelError::NoInitialMarking)?;
    let mut advancer = MarkingAdvancer::new(model, options);

    let initial = advancer.advance_until_decision_point(&initial);
    let mut graph = ReachabilityGraph::new();
    graph.add_marking(model.to_marking(&initial), true);

    let mut expanded_references: HashSet<TokenMarking> = HashSet::new();
    let mut explored_candidates: HashSet<Candidate> = HashSet::new();
    expanded_references.insert(initial.clone());
    let mut stack = candidates_of(&mut advancer, &initial);

    while let Some(candidate) = stack.pop() {
        if explored_candidates.contains(&candidate) {
            continue;
        }
        let (reference, step, advanced) = &candidate;
        let source = model.to_marking(reference);
        for fired in model.fire(*step, advanced) {
            let target = advancer.advance_until_decision_point(&fired);
            graph.add_edge(model.step_label(*step), &source, &model.to_marking(&target));
            if expanded_references.insert(target.clone()) {
                let new_candidates = candidates_of(&mut advancer, &target);
                debug!(
                    marking = ?model.to_marking(&target),
                    candidates = new_candidates.len(),
                    "Exploring new reference marking"
                );
                stack.extend(new_candidates);
            }
        }
        explored_candidates.insert(candidate);
    }

    info!(
        markings = graph.markings.len(),
        edges = graph.edges.len(),
        cached_markings = advancer.cached_markings(),
        "Built reachability graph in {:?}",
        now.elapsed()
    );
    Ok(graph)
}

fn candidates_of<S: ExecutionSemantics + ?Sized>(
    advancer: &mut MarkingAdvancer<'_, S>,
    reference: &TokenMarking,
) -> Vec<Candidate> {
    advancer
        .advance_full_marking(reference)
        .into_iter()
        .map(|(step, advanced)| (reference.clone(), step, advanced))
        .collect()
}
