use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{Marking, ModelError, TokenMarking};
use crate::execution::marking_advancement;
use crate::execution::options::ReachabilityGraphOptions;
use crate::execution::reachability_builder::build_reachability_graph;
use crate::execution::semantics::{ExecutionSemantics, StepRole};
use crate::reachability_graph::ReachabilityGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Place in a Petri net
pub struct Place {
    /// Place ID
    pub id: String,
    /// Display name
    pub name: String,
    /// IDs of the transitions with an arc into this place
    #[serde(skip)]
    pub incoming: BTreeSet<String>,
    /// IDs of the transitions this place has an arc to
    #[serde(skip)]
    pub outgoing: BTreeSet<String>,
}

impl Place {
    /// More than one outgoing transition
    pub fn is_split(&self) -> bool {
        self.outgoing.len() > 1
    }
    /// More than one incoming transition
    pub fn is_join(&self) -> bool {
        self.incoming.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Transition in a Petri net
pub struct Transition {
    /// Transition ID
    pub id: String,
    /// Transition label (activity name)
    pub name: String,
    /// Silent transition (never labels a reachability graph edge)
    pub invisible: bool,
    /// IDs of the places with an arc into this transition
    #[serde(skip)]
    pub incoming: BTreeSet<String>,
    /// IDs of the places this transition has an arc to
    #[serde(skip)]
    pub outgoing: BTreeSet<String>,
}

impl Transition {
    /// Visible transition
    pub fn is_task(&self) -> bool {
        !self.invisible
    }
    /// More than one outgoing place
    pub fn is_split(&self) -> bool {
        self.outgoing.len() > 1
    }
    /// More than one incoming place
    pub fn is_join(&self) -> bool {
        self.incoming.len() > 1
    }
}

/// Serialized form of a [`PetriNet`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetriNetDescription {
    /// Places
    pub places: Vec<Place>,
    /// Transitions
    pub transitions: Vec<Transition>,
    /// Arcs as (source ID, target ID)
    pub arcs: Vec<(String, String)>,
    /// Initial marking
    pub initial_marking: Option<Marking>,
    /// Final markings
    #[serde(default)]
    pub final_markings: Vec<Marking>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "PetriNetDescription", into = "PetriNetDescription")]
///
/// A safe Petri net of [`Place`]s and [`Transition`]s
///
/// Markings are sets of place IDs (at most one token per place).
/// Invisible transitions play the role of gateways.
pub struct PetriNet {
    places: Vec<Place>,
    transitions: Vec<Transition>,
    id_to_place: HashMap<String, usize>,
    id_to_transition: HashMap<String, usize>,
    transition_inputs: Vec<TokenMarking>,
    transition_outputs: Vec<TokenMarking>,
    initial_marking: Option<Marking>,
    final_markings: Vec<Marking>,
}

impl PetriNet {
    /// Create new [`PetriNet`] with no places or transitions
    pub fn new() -> Self {
        Self::default()
    }

    /// All places, in insertion order
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// All transitions, in insertion order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Get place by ID
    pub fn get_place(&self, place_id: &str) -> Option<&Place> {
        self.id_to_place.get(place_id).map(|index| &self.places[*index])
    }

    /// Get transition by ID
    pub fn get_transition(&self, transition_id: &str) -> Option<&Transition> {
        self.id_to_transition
            .get(transition_id)
            .map(|index| &self.transitions[*index])
    }

    fn is_known_id(&self, id: &str) -> bool {
        self.id_to_place.contains_key(id) || self.id_to_transition.contains_key(id)
    }

    /// Add a place (with an optional passed ID)
    ///
    /// If no ID is passed, a new UUID will be generated
    pub fn add_place(&mut self, place_id: Option<&str>, name: &str) -> Result<String, ModelError> {
        let place_id = place_id.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        if self.is_known_id(&place_id) {
            return Err(ModelError::DuplicateId(place_id));
        }
        self.id_to_place.insert(place_id.clone(), self.places.len());
        self.places.push(Place {
            id: place_id.clone(),
            name: name.to_string(),
            incoming: BTreeSet::new(),
            outgoing: BTreeSet::new(),
        });
        Ok(place_id)
    }

    /// Add a transition (with an optional passed ID)
    ///
    /// If no ID is passed, a new UUID will be generated
    pub fn add_transition(
        &mut self,
        transition_id: Option<&str>,
        name: &str,
        invisible: bool,
    ) -> Result<String, ModelError> {
        let transition_id =
            transition_id.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        if self.is_known_id(&transition_id) {
            return Err(ModelError::DuplicateId(transition_id));
        }
        self.id_to_transition
            .insert(transition_id.clone(), self.transitions.len());
        self.transitions.push(Transition {
            id: transition_id.clone(),
            name: name.to_string(),
            invisible,
            incoming: BTreeSet::new(),
            outgoing: BTreeSet::new(),
        });
        self.transition_inputs.push(TokenMarking::new());
        self.transition_outputs.push(TokenMarking::new());
        Ok(transition_id)
    }

    /// Add an arc from a place to a transition or from a transition to a place
    pub fn add_edge(&mut self, source_id: &str, target_id: &str) -> Result<(), ModelError> {
        let invalid = |reason: &str| ModelError::InvalidArc {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            reason: reason.to_string(),
        };
        match (
            self.id_to_place.get(source_id).copied(),
            self.id_to_transition.get(source_id).copied(),
            self.id_to_place.get(target_id).copied(),
            self.id_to_transition.get(target_id).copied(),
        ) {
            (Some(place), _, _, Some(transition)) => {
                self.places[place].outgoing.insert(target_id.to_string());
                self.transitions[transition]
                    .incoming
                    .insert(source_id.to_string());
                self.transition_inputs[transition].insert(place);
                Ok(())
            }
            (_, Some(transition), Some(place), _) => {
                self.transitions[transition]
                    .outgoing
                    .insert(target_id.to_string());
                self.places[place].incoming.insert(source_id.to_string());
                self.transition_outputs[transition].insert(place);
                Ok(())
            }
            (Some(_), _, Some(_), _) => Err(invalid("place to place")),
            (_, Some(_), _, Some(_)) => Err(invalid("transition to transition")),
            (None, None, _, _) => Err(ModelError::UnknownNode(source_id.to_string())),
            _ => Err(ModelError::UnknownNode(target_id.to_string())),
        }
    }

    fn remove_edge(&mut self, place: usize, transition: usize) {
        let place_id = self.places[place].id.clone();
        let transition_id = self.transitions[transition].id.clone();
        self.places[place].outgoing.remove(&transition_id);
        self.transitions[transition].incoming.remove(&place_id);
        self.transition_inputs[transition].remove(&place);
    }

    /// Initial marking
    pub fn initial_marking(&self) -> Option<&Marking> {
        self.initial_marking.as_ref()
    }

    /// Set the initial marking (all places must exist)
    pub fn set_initial_marking(&mut self, marking: Marking) -> Result<(), ModelError> {
        self.require_places(&marking)?;
        self.initial_marking = Some(marking);
        Ok(())
    }

    /// Final markings (any of them is accepted as a final marking)
    pub fn final_markings(&self) -> &[Marking] {
        &self.final_markings
    }

    /// Add an accepted final marking (all places must exist)
    pub fn add_final_marking(&mut self, marking: Marking) -> Result<(), ModelError> {
        self.require_places(&marking)?;
        self.final_markings.push(marking);
        Ok(())
    }

    /// Whether `marking` is one of the final markings
    pub fn is_final_marking(&self, marking: &Marking) -> bool {
        self.final_markings.contains(marking)
    }

    fn require_places(&self, marking: &Marking) -> Result<(), ModelError> {
        match marking.iter().find(|id| !self.id_to_place.contains_key(*id)) {
            Some(unknown) => Err(ModelError::UnknownToken(unknown.clone())),
            None => Ok(()),
        }
    }

    /// IDs of the places whose outgoing transitions mix invisible transitions and tasks
    pub fn mixed_decision_points(&self) -> Vec<String> {
        self.places
            .iter()
            .filter(|place| {
                let invisible = place
                    .outgoing
                    .iter()
                    .filter(|id| self.get_transition(id).is_some_and(|t| t.invisible))
                    .count();
                invisible > 0 && invisible < place.outgoing.len()
            })
            .map(|place| place.id.clone())
            .collect()
    }

    /// Whether every place is followed either only by invisible transitions or only by tasks
    pub fn fulfills_preconditions(&self) -> bool {
        self.mixed_decision_points().is_empty()
    }

    /// Like [`PetriNet::fulfills_preconditions`], reporting the first offending place
    pub fn check_preconditions(&self) -> Result<(), ModelError> {
        match self.mixed_decision_points().into_iter().next() {
            Some(place_id) => Err(ModelError::MixedDecisionPoint { place_id }),
            None => Ok(()),
        }
    }

    /// Make every mixed place a pure decision point
    ///
    /// Each task `t` following a mixed place `p` is moved behind a new invisible transition
    /// and a new place: `p -> tau -> p' -> t`.
    /// Returns the IDs of the added invisible transitions.
    pub fn repair_mixed_decision_points(&mut self) -> Result<Vec<String>, ModelError> {
        let mut added = Vec::new();
        for place_id in self.mixed_decision_points() {
            let place = self.id_to_place[&place_id];
            let tasks: Vec<String> = self.places[place]
                .outgoing
                .iter()
                .filter(|id| self.get_transition(id).is_some_and(Transition::is_task))
                .cloned()
                .collect();
            for task_id in tasks {
                let task = self.id_to_transition[&task_id];
                self.remove_edge(place, task);
                let tau_id = self.add_transition(None, &format!("tau_{task_id}"), true)?;
                let new_place_id = self.add_place(None, &format!("before_{task_id}"))?;
                self.add_edge(&place_id, &tau_id)?;
                self.add_edge(&tau_id, &new_place_id)?;
                self.add_edge(&new_place_id, &task_id)?;
                added.push(tau_id);
            }
        }
        Ok(added)
    }

    /// Simulate the execution of `transition_id` in `marking`
    ///
    /// Returns `None` if the transition is not enabled.
    pub fn simulate_execution(
        &self,
        transition_id: &str,
        marking: &Marking,
    ) -> Result<Option<Marking>, ModelError> {
        let transition = self.require_step(transition_id)?;
        let tokens = self.to_token_marking(marking)?;
        Ok(self
            .fire(transition, &tokens)
            .first()
            .map(|result| self.to_marking(result)))
    }

    fn enabled_transitions_where(
        &self,
        marking: &Marking,
        filter: impl Fn(&Transition) -> bool,
    ) -> Result<BTreeSet<String>, ModelError> {
        let tokens = self.to_token_marking(marking)?;
        Ok(self
            .transitions
            .iter()
            .enumerate()
            .filter(|(index, transition)| filter(transition) && self.is_enabled(*index, &tokens))
            .map(|(_, transition)| transition.id.clone())
            .collect())
    }

    /// IDs of the transitions whose incoming places all hold a token
    pub fn get_enabled_transitions(&self, marking: &Marking) -> Result<BTreeSet<String>, ModelError> {
        self.enabled_transitions_where(marking, |_| true)
    }

    /// IDs of the enabled visible transitions
    pub fn get_enabled_tasks(&self, marking: &Marking) -> Result<BTreeSet<String>, ModelError> {
        self.enabled_transitions_where(marking, Transition::is_task)
    }

    /// IDs of the enabled invisible transitions
    pub fn get_enabled_invisible_transitions(
        &self,
        marking: &Marking,
    ) -> Result<BTreeSet<String>, ModelError> {
        self.enabled_transitions_where(marking, |transition| transition.invisible)
    }

    /// Fire invisible transitions not following a split place until none is left
    pub fn advance_marking_until_decision_point(
        &self,
        marking: &Marking,
    ) -> Result<Marking, ModelError> {
        marking_advancement::advance_marking_until_decision_point(
            self,
            marking,
            &ReachabilityGraphOptions::default(),
        )
    }

    /// Advance `marking` branch by branch until tasks are enabled
    ///
    /// Returns pairs of enabled transition ID and the (minimally advanced) marking enabling it.
    pub fn advance_full_marking(
        &self,
        marking: &Marking,
    ) -> Result<Vec<(String, Marking)>, ModelError> {
        marking_advancement::advance_full_marking(
            self,
            marking,
            &ReachabilityGraphOptions::default(),
        )
    }

    /// Compute the reachability graph of this Petri net
    ///
    /// Fails with [`ModelError::MixedDecisionPoint`] if [`PetriNet::fulfills_preconditions`] does not hold.
    pub fn get_reachability_graph(
        &self,
        options: &ReachabilityGraphOptions,
    ) -> Result<ReachabilityGraph, ModelError> {
        self.check_preconditions()?;
        build_reachability_graph(self, options)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ExecutionSemantics for PetriNet {
    fn token_count(&self) -> usize {
        self.places.len()
    }

    fn token_id(&self, token: usize) -> &str {
        &self.places[token].id
    }

    fn token_index(&self, token_id: &str) -> Option<usize> {
        self.id_to_place.get(token_id).copied()
    }

    fn step_count(&self) -> usize {
        self.transitions.len()
    }

    fn step_id(&self, step: usize) -> &str {
        &self.transitions[step].id
    }

    fn step_label(&self, step: usize) -> &str {
        &self.transitions[step].name
    }

    fn step_index(&self, step_id: &str) -> Option<usize> {
        self.id_to_transition.get(step_id).copied()
    }

    fn step_role(&self, step: usize, _options: &ReachabilityGraphOptions) -> StepRole {
        if !self.transitions[step].invisible {
            StepRole::Observable
        } else if self.transition_inputs[step]
            .iter()
            .any(|place| self.places[*place].is_split())
        {
            StepRole::DecisionPoint
        } else {
            StepRole::Silent
        }
    }

    fn step_inputs(&self, step: usize) -> &TokenMarking {
        &self.transition_inputs[step]
    }

    fn is_enabled(&self, step: usize, marking: &TokenMarking) -> bool {
        self.transition_inputs[step].is_subset(marking)
    }

    fn fire(&self, step: usize, marking: &TokenMarking) -> Vec<TokenMarking> {
        if !self.is_enabled(step, marking) {
            return Vec::new();
        }
        let mut result: TokenMarking = marking
            .difference(&self.transition_inputs[step])
            .copied()
            .collect();
        result.extend(&self.transition_outputs[step]);
        vec![result]
    }

    fn initial_tokens(&self) -> Result<Option<TokenMarking>, ModelError> {
        self.initial_marking
            .as_ref()
            .filter(|marking| !marking.is_empty())
            .map(|marking| self.to_token_marking(marking))
            .transpose()
    }
}

impl TryFrom<PetriNetDescription> for PetriNet {
    type Error = ModelError;

    fn try_from(description: PetriNetDescription) -> Result<Self, Self::Error> {
        let mut net = PetriNet::new();
        for place in &description.places {
            net.add_place(Some(&place.id), &place.name)?;
        }
        for transition in &description.transitions {
            net.add_transition(Some(&transition.id), &transition.name, transition.invisible)?;
        }
        for (source_id, target_id) in &description.arcs {
            net.add_edge(source_id, target_id)?;
        }
        if let Some(initial_marking) = description.initial_marking {
            net.set_initial_marking(initial_marking)?;
        }
        for final_marking in description.final_markings {
            net.add_final_marking(final_marking)?;
        }
        Ok(net)
    }
}

impl From<PetriNet> for PetriNetDescription {
    fn from(net: PetriNet) -> Self {
        let mut arcs = Vec::new();
        for place in &net.places {
            for transition_id in &place.outgoing {
                arcs.push((place.id.clone(), transition_id.clone()));
            }
        }
        for transition in &net.transitions {
            for place_id in &transition.outgoing {
                arcs.push((transition.id.clone(), place_id.clone()));
            }
        }
        Self {
            places: net.places,
            transitions: net.transitions,
            arcs,
            initial_marking: net.initial_marking,
            final_markings: net.final_markings,
        }
    }
}
