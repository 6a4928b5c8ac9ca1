use std::collections::{BTreeSet, HashMap, HashSet};

use itertools::Itertools;

use crate::core::{Marking, ModelError, TokenMarking};

use super::options::ReachabilityGraphOptions;
use super::semantics::{ExecutionSemantics, StepRole};

/// Observable step (dense index) paired with the marking that enables it
pub type EnabledStep = (usize, TokenMarking);

/// Markings reached from one marking by firing silent steps only
#[derive(Debug, Clone, Default)]
struct Exploration {
    /// Observable steps enabled in reached markings where no silent step can fire
    enabled: Vec<EnabledStep>,
    /// Reached markings where no step at all can fire
    dead_ends: Vec<TokenMarking>,
}

///
/// Advances markings of one model by firing silent steps
///
/// Holds the memoization cache of one reachability graph build.
/// The cache only stores explorations started from scratch (without previously explored
/// markings), so cached and uncached advancement always return the same results.
///
#[derive(Debug)]
pub struct MarkingAdvancer<'a, S: ExecutionSemantics + ?Sized> {
    model: &'a S,
    roles: Vec<StepRole>,
    cached_search: bool,
    cache: HashMap<TokenMarking, Exploration>,
}

impl<'a, S: ExecutionSemantics + ?Sized> MarkingAdvancer<'a, S> {
    /// Create a new advancer for `model` with an empty cache
    pub fn new(model: &'a S, options: &ReachabilityGraphOptions) -> Self {
        let roles = (0..model.step_count())
            .map(|step| model.step_role(step, options))
            .collect();
        Self {
            model,
            roles,
            cached_search: options.cached_search,
            cache: HashMap::new(),
        }
    }

    /// Number of memoized markings
    pub fn cached_markings(&self) -> usize {
        self.cache.len()
    }

    fn can_fire(&self, step: usize, marking: &TokenMarking) -> bool {
        self.model.is_enabled(step, marking) && self.model.may_advance(step, marking)
    }

    fn enabled_steps(
        &self,
        marking: &TokenMarking,
        role_filter: impl Fn(StepRole) -> bool,
    ) -> Vec<usize> {
        (0..self.roles.len())
            .filter(|step| role_filter(self.roles[*step]) && self.can_fire(*step, marking))
            .collect()
    }

    /// Fire silent steps that are not decision points until none is enabled
    ///
    /// Stuck markings are returned unchanged. The result is a fixed point: advancing it again is a no-op.
    pub fn advance_until_decision_point(&self, marking: &TokenMarking) -> TokenMarking {
        let mut advanced = marking.clone();
        let mut seen = HashSet::new();
        loop {
            let next_step = (0..self.roles.len()).find(|step| {
                self.roles[*step] == StepRole::Silent && self.can_fire(*step, &advanced)
            });
            let Some(step) = next_step else {
                return advanced;
            };
            // Cycle of silent steps
            if !seen.insert(advanced.clone()) {
                return advanced;
            }
            match self.model.fire(step, &advanced).into_iter().next() {
                Some(next) => advanced = next,
                None => return advanced,
            }
        }
    }

    /// Advance `marking` branch by branch until observable steps are enabled
    ///
    /// Returns each enabled observable step together with the marking enabling it, in which
    /// only the branches needed to enable the step are advanced.
    pub fn advance_full_marking(&mut self, marking: &TokenMarking) -> Vec<EnabledStep> {
        self.advance_full_marking_within(marking, None)
    }

    fn advance_full_marking_within(
        &mut self,
        marking: &TokenMarking,
        explored: Option<&mut HashSet<TokenMarking>>,
    ) -> Vec<EnabledStep> {
        let advanced = self.advance_until_decision_point(marking);
        let mut results = BTreeSet::new();
        for (step, fully_advanced) in self.explore_silent_steps(&advanced, explored).enabled {
            let result = if self.model.is_enabled(step, &advanced) {
                // Already enabled before any decision was taken
                advanced.clone()
            } else {
                self.try_rollback(&fully_advanced, &advanced, step)
            };
            results.insert((step, result));
        }
        results.into_iter().collect()
    }

    /// Level-by-level exploration of all silent firings from `marking`
    ///
    /// Collects the enabled observable steps of every reached marking in which no silent
    /// step is enabled, and the reached markings in which nothing is enabled at all.
    /// Parallel splits restart the full advancement on the split marking, sharing the
    /// explored set so that cycles terminate.
    fn explore_silent_steps(
        &mut self,
        marking: &TokenMarking,
        explored: Option<&mut HashSet<TokenMarking>>,
    ) -> Exploration {
        let from_scratch = explored.is_none();
        if from_scratch && self.cached_search {
            if let Some(cached) = self.cache.get(marking) {
                return cached.clone();
            }
        }
        let mut local_explored = HashSet::new();
        let explored = match explored {
            Some(explored) => explored,
            None => &mut local_explored,
        };

        let mut enabled = BTreeSet::new();
        let mut dead_ends = BTreeSet::new();
        let mut level = vec![marking.clone()];
        while !level.is_empty() {
            let mut next_level = Vec::new();
            for current in level {
                if !explored.insert(current.clone()) {
                    continue;
                }
                let silent = self.enabled_steps(&current, StepRole::is_silent);
                let Some(&selected) = silent.first() else {
                    let observable =
                        self.enabled_steps(&current, |role| role == StepRole::Observable);
                    if observable.is_empty() {
                        dead_ends.insert(current);
                    } else {
                        enabled.extend(observable.into_iter().map(|step| (step, current.clone())));
                    }
                    continue;
                };
                // The selected step plus all alternatives competing for its tokens
                let consumed = self.model.step_inputs(selected);
                let to_fire: Vec<usize> = silent
                    .iter()
                    .copied()
                    .filter(|step| {
                        *step == selected || !self.model.step_inputs(*step).is_disjoint(consumed)
                    })
                    .collect();
                for step in to_fire {
                    for fired in self.model.fire(step, &current) {
                        if fired.difference(&current).count() > 1 {
                            enabled.extend(
                                self.advance_full_marking_within(&fired, Some(&mut *explored)),
                            );
                        } else {
                            next_level.push(fired);
                        }
                    }
                }
            }
            level = next_level;
        }

        let exploration = Exploration {
            enabled: enabled.into_iter().collect(),
            dead_ends: dead_ends.into_iter().collect(),
        };
        if from_scratch && self.cached_search {
            self.cache.insert(marking.clone(), exploration.clone());
        }
        exploration
    }

    /// Undo the advancement of every branch of `reference` not needed to enable `step`
    ///
    /// Looks for the smallest combination of branches (tokens of `reference`) whose isolated
    /// advancement reaches the enabling tokens within `advanced`. The advancement of the
    /// remaining branches is then replaced by their original tokens.
    fn try_rollback(
        &mut self,
        advanced: &TokenMarking,
        reference: &TokenMarking,
        step: usize,
    ) -> TokenMarking {
        let enabling: TokenMarking = self
            .model
            .step_inputs(step)
            .intersection(advanced)
            .copied()
            .collect();
        // Powerset in ascending size, without the empty and the full combination
        let combinations: Vec<TokenMarking> = reference
            .iter()
            .copied()
            .powerset()
            .filter(|combination| !combination.is_empty() && combination.len() < reference.len())
            .map(|combination| combination.into_iter().collect())
            .collect();

        let mut needed = reference.clone();
        'search: for combination in combinations {
            for (_, reached) in self.explore_silent_steps(&combination, None).enabled {
                if enabling.is_subset(&reached) && reached.is_subset(advanced) {
                    needed = combination;
                    break 'search;
                }
            }
        }

        let other_branches: TokenMarking = reference.difference(&needed).copied().collect();
        if other_branches.is_empty() {
            return advanced.clone();
        }
        // Branches stuck in front of a join count as reached as well
        let exploration = self.explore_silent_steps(&other_branches, None);
        let reached_by_others = exploration
            .enabled
            .iter()
            .map(|(_, reached)| reached)
            .chain(&exploration.dead_ends);
        for reached in reached_by_others {
            if reached.is_subset(advanced) {
                let mut rolled_back: TokenMarking =
                    advanced.difference(reached).copied().collect();
                rolled_back.extend(&other_branches);
                return rolled_back;
            }
        }
        advanced.clone()
    }
}

/// Advance a [`Marking`] of `model` until the next decision point
pub fn advance_marking_until_decision_point<S: ExecutionSemantics + ?Sized>(
    model: &S,
    marking: &Marking,
    options: &ReachabilityGraphOptions,
) -> Result<Marking, ModelError> {
    let tokens = model.to_token_marking(marking)?;
    let advancer = MarkingAdvancer::new(model, options);
    Ok(model.to_marking(&advancer.advance_until_decision_point(&tokens)))
}

/// Fully advance a [`Marking`] of `model`, see [`MarkingAdvancer::advance_full_marking`]
///
/// Returns pairs of enabled step ID and the marking enabling it.
pub fn advance_full_marking<S: ExecutionSemantics + ?Sized>(
    model: &S,
    marking: &Marking,
    options: &ReachabilityGraphOptions,
) -> Result<Vec<(String, Marking)>, ModelError> {
    let tokens = model.to_token_marking(marking)?;
    let mut advancer = MarkingAdvancer::new(model, options);
    Ok(advancer
        .advance_full_marking(&tokens)
        .into_iter()
        .map(|(step, result)| (model.step_id(step).to_string(), model.to_marking(&result)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpmn::BpmnModel;
    use crate::core::marking::marking_of;
    use crate::petri_net::PetriNet;
    use crate::utils::test_fixtures::{
        bpmn_model_with_and_and_nested_xor, bpmn_model_with_and_and_xor,
        bpmn_model_with_inclusive_gateways, bpmn_model_with_loop_inside_and,
        bpmn_model_with_three_loops_inside_and,
        bpmn_model_with_two_loops_inside_and_followed_by_xor_within_and,
        petri_net_with_loop_inside_and, petri_net_with_three_loops_inside_and,
        petri_net_with_two_loops_inside_and_followed_by_xor_within_and,
        petri_net_with_xor_within_and,
    };

    fn advance_bpmn(model: &BpmnModel, marking: &[&str]) -> Vec<(String, Marking)> {
        model.advance_full_marking(&marking_of(marking.iter().copied())).unwrap()
    }

    fn advance_petri(net: &PetriNet, marking: &[&str]) -> Vec<(String, Marking)> {
        net.advance_full_marking(&marking_of(marking.iter().copied())).unwrap()
    }

    fn enabled(step: &str, marking: &[&str]) -> (String, Marking) {
        (step.to_string(), marking_of(marking.iter().copied()))
    }

    #[test]
    fn advance_until_decision_point_simple_model() {
        let model = bpmn_model_with_and_and_xor();
        let advance = |marking: &[&str]| {
            model
                .advance_marking_until_decision_point(&marking_of(marking.iter().copied()))
                .unwrap()
        };
        assert_eq!(advance(&["3"]), marking_of(["5", "6"]));
        assert_eq!(advance(&["9", "10"]), marking_of(["12"]));
        assert_eq!(advance(&["18"]), marking_of(["21"]));
        // Stuck markings stay as they are
        assert_eq!(advance(&["9"]), marking_of(["9"]));
    }

    #[test]
    fn advance_until_decision_point_is_idempotent() {
        let model = bpmn_model_with_loop_inside_and();
        for marking in [vec!["3"], vec!["12", "6"], vec!["14", "15"], vec!["1"]] {
            let once = model
                .advance_marking_until_decision_point(&marking_of(marking))
                .unwrap();
            let twice = model.advance_marking_until_decision_point(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn advance_full_marking_simple_model() {
        let model = bpmn_model_with_and_and_xor();

        let markings = advance_bpmn(&model, &["3"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("7", &["5", "6"])));
        assert!(markings.contains(&enabled("8", &["5", "6"])));

        let markings = advance_bpmn(&model, &["9", "10"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("16", &["14"])));
        assert!(markings.contains(&enabled("17", &["15"])));

        let markings = advance_bpmn(&model, &["21"]);
        assert_eq!(markings, vec![enabled("22", &["21"])]);
    }

    #[test]
    fn advance_full_marking_loop_model() {
        let model = bpmn_model_with_loop_inside_and();

        let markings = advance_bpmn(&model, &["3"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("10", &["9", "6"])));
        assert!(markings.contains(&enabled("8", &["9", "6"])));

        // C stays enabled by the untouched branch instead of the looped-back one
        let markings = advance_bpmn(&model, &["11", "6"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("10", &["9", "6"])));
        assert!(markings.contains(&enabled("8", &["11", "6"])));

        let markings = advance_bpmn(&model, &["11", "15"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("10", &["9", "15"])));
        assert!(markings.contains(&enabled("18", &["17"])));

        let markings = advance_bpmn(&model, &["17"]);
        assert_eq!(markings, vec![enabled("18", &["17"])]);
    }

    #[test]
    fn advance_full_marking_rolls_back_independent_branches() {
        let net = petri_net_with_xor_within_and();

        let markings = advance_petri(&net, &["2"]);
        assert_eq!(markings.len(), 6);
        assert!(markings.contains(&enabled("19", &["13", "5", "6"])));
        assert!(markings.contains(&enabled("20", &["14", "5", "6"])));
        assert!(markings.contains(&enabled("21", &["4", "15", "6"])));
        assert!(markings.contains(&enabled("22", &["4", "16", "6"])));
        assert!(markings.contains(&enabled("23", &["4", "5", "17"])));
        assert!(markings.contains(&enabled("24", &["4", "5", "18"])));

        // Closing the AND-join needs all three branches
        let markings = advance_petri(&net, &["37", "38", "39"]);
        assert_eq!(markings, vec![enabled("42", &["41"])]);

        let markings = advance_petri(&net, &["37", "38", "6"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("23", &["37", "38", "17"])));
        assert!(markings.contains(&enabled("24", &["37", "38", "18"])));
    }

    #[test]
    fn advance_full_marking_petri_loop() {
        let net = petri_net_with_loop_inside_and();

        let markings = advance_petri(&net, &["8", "5"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("6", &["4", "5"])));
        assert!(markings.contains(&enabled("7", &["8", "5"])));

        let markings = advance_petri(&net, &["8", "9"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("6", &["4", "9"])));
        assert!(markings.contains(&enabled("13", &["12"])));
    }

    #[test]
    fn no_spurious_advancement() {
        let model = bpmn_model_with_loop_inside_and();
        for marking in [vec!["9", "6"], vec!["11", "6"], vec!["9", "15"]] {
            let marking = marking_of(marking);
            let advanced = model.advance_marking_until_decision_point(&marking).unwrap();
            let enabled_before = model.get_enabled_nodes(&advanced).unwrap();
            for (node, result) in model.advance_full_marking(&marking).unwrap() {
                // Nodes enabled before advancing keep their non-advanced marking
                if enabled_before.contains(&node) {
                    assert_eq!(result, advanced);
                }
            }
        }
    }

    fn advance_bpmn_until_decision_point(model: &BpmnModel, marking: &[&str]) -> Marking {
        model
            .advance_marking_until_decision_point(&marking_of(marking.iter().copied()))
            .unwrap()
    }

    #[test]
    fn advance_nested_xor_within_and() {
        let model = bpmn_model_with_and_and_nested_xor();
        assert_eq!(advance_bpmn_until_decision_point(&model, &["3"]), marking_of(["4", "6"]));
        assert_eq!(
            advance_bpmn_until_decision_point(&model, &["6", "16"]),
            marking_of(["6", "21"])
        );
        assert_eq!(advance_bpmn_until_decision_point(&model, &["17", "20"]), marking_of(["27"]));

        let markings = advance_bpmn(&model, &["3"]);
        assert_eq!(markings.len(), 4);
        assert!(markings.contains(&enabled("10", &["8", "6"])));
        assert!(markings.contains(&enabled("14", &["12", "6"])));
        assert!(markings.contains(&enabled("15", &["13", "6"])));
        assert!(markings.contains(&enabled("19", &["4", "6"])));

        assert_eq!(advance_bpmn(&model, &["6", "16"]), vec![enabled("19", &["6", "21"])]);
        assert_eq!(advance_bpmn(&model, &["17", "20"]), vec![enabled("23", &["27"])]);
    }

    #[test]
    fn advance_two_loops_inside_and() {
        let model = bpmn_model_with_two_loops_inside_and_followed_by_xor_within_and();
        assert_eq!(advance_bpmn_until_decision_point(&model, &["3"]), marking_of(["9", "10"]));
        assert_eq!(
            advance_bpmn_until_decision_point(&model, &["13", "14"]),
            marking_of(["13", "14"])
        );
        assert_eq!(
            advance_bpmn_until_decision_point(&model, &["19", "20"]),
            marking_of(["24", "25"])
        );
        assert_eq!(advance_bpmn_until_decision_point(&model, &["36", "39"]), marking_of(["43"]));

        let markings = advance_bpmn(&model, &["3"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("11", &["9", "10"])));
        assert!(markings.contains(&enabled("12", &["9", "10"])));

        // Each loop is either repeated alone or both are left for the choices behind the join
        let markings = advance_bpmn(&model, &["13", "14"]);
        assert_eq!(markings.len(), 6);
        assert!(markings.contains(&enabled("11", &["9", "14"])));
        assert!(markings.contains(&enabled("12", &["13", "10"])));
        assert!(markings.contains(&enabled("32", &["28", "25"])));
        assert!(markings.contains(&enabled("33", &["29", "25"])));
        assert!(markings.contains(&enabled("34", &["24", "30"])));
        assert!(markings.contains(&enabled("35", &["24", "31"])));
    }

    #[test]
    fn advance_three_loops_inside_and() {
        let model = bpmn_model_with_three_loops_inside_and();
        assert_eq!(advance_bpmn_until_decision_point(&model, &["1"]), marking_of(["3", "26"]));
        assert_eq!(
            advance_bpmn_until_decision_point(&model, &["7", "4"]),
            marking_of(["13", "14", "26"])
        );
        assert_eq!(
            advance_bpmn_until_decision_point(&model, &["17", "18", "28"]),
            marking_of(["17", "18", "28"])
        );

        let markings = advance_bpmn(&model, &["1"]);
        assert_eq!(markings.len(), 2);
        assert!(markings.contains(&enabled("5", &["3", "26"])));
        assert!(markings.contains(&enabled("27", &["3", "26"])));

        let markings = advance_bpmn(&model, &["7", "4"]);
        assert_eq!(markings.len(), 3);
        for node in ["15", "16", "27"] {
            assert!(markings.contains(&enabled(node, &["13", "14", "26"])));
        }

        let markings = advance_bpmn(&model, &["17", "18", "28"]);
        assert_eq!(markings.len(), 4);
        assert!(markings.contains(&enabled("15", &["13", "18", "28"])));
        assert!(markings.contains(&enabled("16", &["17", "14", "28"])));
        assert!(markings.contains(&enabled("27", &["17", "18", "26"])));
        assert!(markings.contains(&enabled("32", &["31", "28"])));

        let net = petri_net_with_three_loops_inside_and();
        let markings = advance_petri(&net, &["10", "11", "20"]);
        assert_eq!(markings.len(), 4);
        assert!(markings.contains(&enabled("8", &["6", "11", "20"])));
        assert!(markings.contains(&enabled("9", &["10", "7", "20"])));
        assert!(markings.contains(&enabled("19", &["10", "11", "18"])));
        assert!(markings.contains(&enabled("16", &["15", "20"])));
    }

    #[test]
    fn inclusive_join_waits_for_pending_branches() {
        let model = bpmn_model_with_inclusive_gateways();
        assert_eq!(
            advance_bpmn_until_decision_point(&model, &["9", "6"]),
            marking_of(["9", "6"])
        );
        assert_eq!(advance_bpmn_until_decision_point(&model, &["9", "10"]), marking_of(["12"]));
        // Nothing can reach the other incoming flow anymore
        assert_eq!(advance_bpmn_until_decision_point(&model, &["9"]), marking_of(["12"]));

        let markings = advance_bpmn(&model, &["3"]);
        assert_eq!(markings.len(), 4);
        assert!(markings.contains(&enabled("7", &["5"])));
        assert!(markings.contains(&enabled("7", &["5", "6"])));
        assert!(markings.contains(&enabled("8", &["6"])));
        assert!(markings.contains(&enabled("8", &["5", "6"])));
    }

    #[test]
    fn cached_and_uncached_advancement_agree() {
        let net = petri_net_with_xor_within_and();
        let tokens = net.to_token_marking(&marking_of(["4", "5", "6"])).unwrap();
        let mut cached = MarkingAdvancer::new(&net, &ReachabilityGraphOptions::default());
        let mut uncached = MarkingAdvancer::new(&net, &ReachabilityGraphOptions::uncached());

        let first = cached.advance_full_marking(&tokens);
        assert!(cached.cached_markings() > 0);
        assert_eq!(first, cached.advance_full_marking(&tokens));
        assert_eq!(first, uncached.advance_full_marking(&tokens));
        assert_eq!(uncached.cached_markings(), 0);

        let net = petri_net_with_two_loops_inside_and_followed_by_xor_within_and();
        let mut cached = MarkingAdvancer::new(&net, &ReachabilityGraphOptions::default());
        let mut uncached = MarkingAdvancer::new(&net, &ReachabilityGraphOptions::uncached());
        for marking in [vec!["2"], vec!["8", "9"], vec!["13"], vec!["21", "24"]] {
            let tokens = net.to_token_marking(&marking_of(marking)).unwrap();
            assert_eq!(
                cached.advance_full_marking(&tokens),
                uncached.advance_full_marking(&tokens)
            );
        }
    }
}
