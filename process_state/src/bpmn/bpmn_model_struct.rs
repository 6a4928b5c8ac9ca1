use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{Marking, ModelError, TokenMarking};
use crate::execution::marking_advancement;
use crate::execution::options::ReachabilityGraphOptions;
use crate::execution::reachability_builder::build_reachability_graph;
use crate::execution::semantics::{ExecutionSemantics, StepRole};
use crate::reachability_graph::ReachabilityGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Type of a [`Node`] in a [`BpmnModel`]
pub enum BpmnNodeType {
    /// Task (activity)
    Task,
    /// Start event (no incoming flows)
    StartEvent,
    /// Intermediate event
    IntermediateEvent,
    /// End event (no outgoing flows)
    EndEvent,
    /// Exclusive (XOR) gateway
    ExclusiveGateway,
    /// Parallel (AND) gateway
    ParallelGateway,
    /// Inclusive (OR) gateway
    InclusiveGateway,
}

impl BpmnNodeType {
    /// Start, intermediate or end event
    pub fn is_event(self) -> bool {
        matches!(
            self,
            BpmnNodeType::StartEvent | BpmnNodeType::IntermediateEvent | BpmnNodeType::EndEvent
        )
    }

    /// Exclusive, parallel or inclusive gateway
    pub fn is_gateway(self) -> bool {
        matches!(
            self,
            BpmnNodeType::ExclusiveGateway
                | BpmnNodeType::ParallelGateway
                | BpmnNodeType::InclusiveGateway
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Node (task, event or gateway) of a [`BpmnModel`]
pub struct Node {
    /// Node ID
    pub id: String,
    /// Display name, used as activity label
    pub name: String,
    /// Node type
    pub node_type: BpmnNodeType,
    /// IDs of the incoming [`Flow`]s
    #[serde(skip)]
    pub incoming_flows: BTreeSet<String>,
    /// IDs of the outgoing [`Flow`]s
    #[serde(skip)]
    pub outgoing_flows: BTreeSet<String>,
}

impl Node {
    /// More than one outgoing flow
    pub fn is_split(&self) -> bool {
        self.outgoing_flows.len() > 1
    }
    /// More than one incoming flow
    pub fn is_join(&self) -> bool {
        self.incoming_flows.len() > 1
    }
    /// Node is a task
    pub fn is_task(&self) -> bool {
        self.node_type == BpmnNodeType::Task
    }
    /// Node is an event
    pub fn is_event(&self) -> bool {
        self.node_type.is_event()
    }
    /// Node is a gateway
    pub fn is_gateway(&self) -> bool {
        self.node_type.is_gateway()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Directed sequence flow between two [`Node`]s
pub struct Flow {
    /// Flow ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Source node ID
    pub source: String,
    /// Target node ID
    pub target: String,
}

/// Serialized form of a [`BpmnModel`]: nodes and flows in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BpmnModelDescription {
    /// Nodes (incoming/outgoing flows are derived from `flows`)
    pub nodes: Vec<Node>,
    /// Flows
    pub flows: Vec<Flow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "BpmnModelDescription", into = "BpmnModelDescription")]
///
/// A BPMN-like process model of [`Node`]s connected by [`Flow`]s
///
/// Every flow is assigned a dense index when it is added. Markings are sets of flow IDs.
pub struct BpmnModel {
    nodes: Vec<Node>,
    flows: Vec<Flow>,
    id_to_node: HashMap<String, usize>,
    id_to_flow: HashMap<String, usize>,
    node_inputs: Vec<TokenMarking>,
    node_outputs: Vec<TokenMarking>,
}

impl BpmnModel {
    /// Create new [`BpmnModel`] with no nodes or flows
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All flows, in insertion order
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    /// Get node by ID
    pub fn get_node(&self, node_id: &str) -> Option<&Node> {
        self.id_to_node.get(node_id).map(|index| &self.nodes[*index])
    }

    /// Get flow by ID
    pub fn get_flow(&self, flow_id: &str) -> Option<&Flow> {
        self.id_to_flow.get(flow_id).map(|index| &self.flows[*index])
    }

    /// Add a task
    pub fn add_task(&mut self, task_id: &str, task_name: &str) -> Result<(), ModelError> {
        self.add_node(BpmnNodeType::Task, task_id, task_name)
    }

    /// Add an event of the given (event) type
    pub fn add_event(
        &mut self,
        event_type: BpmnNodeType,
        event_id: &str,
        event_name: &str,
    ) -> Result<(), ModelError> {
        if !event_type.is_event() {
            return Err(ModelError::WrongNodeKind {
                node_id: event_id.to_string(),
                expected: "event",
            });
        }
        self.add_node(event_type, event_id, event_name)
    }

    /// Add a gateway of the given (gateway) type
    pub fn add_gateway(
        &mut self,
        gateway_type: BpmnNodeType,
        gateway_id: &str,
        gateway_name: &str,
    ) -> Result<(), ModelError> {
        if !gateway_type.is_gateway() {
            return Err(ModelError::WrongNodeKind {
                node_id: gateway_id.to_string(),
                expected: "gateway",
            });
        }
        self.add_node(gateway_type, gateway_id, gateway_name)
    }

    fn add_node(
        &mut self,
        node_type: BpmnNodeType,
        node_id: &str,
        node_name: &str,
    ) -> Result<(), ModelError> {
        if self.id_to_node.contains_key(node_id) || self.id_to_flow.contains_key(node_id) {
            return Err(ModelError::DuplicateId(node_id.to_string()));
        }
        self.id_to_node.insert(node_id.to_string(), self.nodes.len());
        self.nodes.push(Node {
            id: node_id.to_string(),
            name: node_name.to_string(),
            node_type,
            incoming_flows: BTreeSet::new(),
            outgoing_flows: BTreeSet::new(),
        });
        self.node_inputs.push(TokenMarking::new());
        self.node_outputs.push(TokenMarking::new());
        Ok(())
    }

    /// Add a flow from `source_id` to `target_id`
    ///
    /// Fails if either node is unknown, or if the flow would give a task or event a second
    /// outgoing flow, a start event an incoming flow, or an end event an outgoing flow.
    pub fn add_flow(
        &mut self,
        flow_id: &str,
        flow_name: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), ModelError> {
        if self.id_to_flow.contains_key(flow_id) || self.id_to_node.contains_key(flow_id) {
            return Err(ModelError::DuplicateId(flow_id.to_string()));
        }
        let source = *self
            .id_to_node
            .get(source_id)
            .ok_or_else(|| ModelError::UnknownNode(source_id.to_string()))?;
        let target = *self
            .id_to_node
            .get(target_id)
            .ok_or_else(|| ModelError::UnknownNode(target_id.to_string()))?;
        let invalid = |reason: &str| ModelError::InvalidFlow {
            flow_id: flow_id.to_string(),
            reason: reason.to_string(),
        };
        let source_node = &self.nodes[source];
        if source_node.node_type == BpmnNodeType::EndEvent {
            return Err(invalid("end events cannot have outgoing flows"));
        }
        if (source_node.is_task() || source_node.is_event())
            && !source_node.outgoing_flows.is_empty()
        {
            return Err(invalid("tasks and events can have only one outgoing flow"));
        }
        if self.nodes[target].node_type == BpmnNodeType::StartEvent {
            return Err(invalid("start events cannot have incoming flows"));
        }

        let flow_index = self.flows.len();
        self.id_to_flow.insert(flow_id.to_string(), flow_index);
        self.flows.push(Flow {
            id: flow_id.to_string(),
            name: flow_name.to_string(),
            source: source_id.to_string(),
            target: target_id.to_string(),
        });
        self.nodes[source].outgoing_flows.insert(flow_id.to_string());
        self.nodes[target].incoming_flows.insert(flow_id.to_string());
        self.node_outputs[source].insert(flow_index);
        self.node_inputs[target].insert(flow_index);
        Ok(())
    }

    /// Marking with a token in the outgoing flows of every start event
    pub fn get_initial_marking(&self) -> Marking {
        self.nodes
            .iter()
            .filter(|node| node.node_type == BpmnNodeType::StartEvent)
            .flat_map(|node| node.outgoing_flows.iter().cloned())
            .collect()
    }

    /// Marking with a token in the incoming flows of every end event
    pub fn get_final_marking(&self) -> Marking {
        self.nodes
            .iter()
            .filter(|node| node.node_type == BpmnNodeType::EndEvent)
            .flat_map(|node| node.incoming_flows.iter().cloned())
            .collect()
    }

    /// Simulate the execution of `node_id` in `marking`
    ///
    /// Returns one marking per possible outcome (several for XOR and OR splits),
    /// or no marking at all if the node is not enabled.
    pub fn simulate_execution(
        &self,
        node_id: &str,
        marking: &Marking,
    ) -> Result<Vec<Marking>, ModelError> {
        let node = self.require_step(node_id)?;
        let tokens = self.to_token_marking(marking)?;
        Ok(self
            .fire(node, &tokens)
            .iter()
            .map(|result| self.to_marking(result))
            .collect())
    }

    /// IDs of the nodes enabled in `marking`
    ///
    /// Parallel gateways need a token in every incoming flow, any other node in at least one.
    /// Start and end events are never reported as enabled.
    pub fn get_enabled_nodes(&self, marking: &Marking) -> Result<BTreeSet<String>, ModelError> {
        let tokens = self.to_token_marking(marking)?;
        Ok((0..self.nodes.len())
            .filter(|node| {
                !matches!(
                    self.nodes[*node].node_type,
                    BpmnNodeType::StartEvent | BpmnNodeType::EndEvent
                ) && self.is_enabled(*node, &tokens)
            })
            .map(|node| self.nodes[node].id.clone())
            .collect())
    }

    /// Fire all enabled gateways except XOR and OR splits until none is left
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

    /// Advance `marking` branch by branch until tasks or events are enabled
    ///
    /// Returns pairs of enabled node ID and the (minimally advanced) marking enabling it.
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

    /// Compute the reachability graph of this model
    pub fn get_reachability_graph(
        &self,
        options: &ReachabilityGraphOptions,
    ) -> Result<ReachabilityGraph, ModelError> {
        build_reachability_graph(self, options)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Flows from which a token can reach `flow` without passing through node `join`
    fn upstream_flows(&self, flow: usize, join: usize) -> TokenMarking {
        let mut upstream = TokenMarking::from([flow]);
        let mut pending = vec![flow];
        while let Some(current) = pending.pop() {
            let Some(&source) = self.id_to_node.get(&self.flows[current].source) else {
                continue;
            };
            if source == join {
                continue;
            }
            for input in &self.node_inputs[source] {
                if upstream.insert(*input) {
                    pending.push(*input);
                }
            }
        }
        upstream
    }
}

impl ExecutionSemantics for BpmnModel {
    fn token_count(&self) -> usize {
        self.flows.len()
    }

    fn token_id(&self, token: usize) -> &str {
        &self.flows[token].id
    }

    fn token_index(&self, token_id: &str) -> Option<usize> {
        self.id_to_flow.get(token_id).copied()
    }

    fn step_count(&self) -> usize {
        self.nodes.len()
    }

    fn step_id(&self, step: usize) -> &str {
        &self.nodes[step].id
    }

    fn step_label(&self, step: usize) -> &str {
        &self.nodes[step].name
    }

    fn step_index(&self, step_id: &str) -> Option<usize> {
        self.id_to_node.get(step_id).copied()
    }

    fn step_role(&self, step: usize, options: &ReachabilityGraphOptions) -> StepRole {
        match self.nodes[step].node_type {
            BpmnNodeType::Task => StepRole::Observable,
            BpmnNodeType::IntermediateEvent if options.treat_event_as_task => StepRole::Observable,
            BpmnNodeType::IntermediateEvent => StepRole::Silent,
            BpmnNodeType::StartEvent | BpmnNodeType::EndEvent => StepRole::Inert,
            BpmnNodeType::ExclusiveGateway | BpmnNodeType::InclusiveGateway
                if self.node_outputs[step].len() > 1 =>
            {
                StepRole::DecisionPoint
            }
            BpmnNodeType::ExclusiveGateway
            | BpmnNodeType::InclusiveGateway
            | BpmnNodeType::ParallelGateway => StepRole::Silent,
        }
    }

    fn step_inputs(&self, step: usize) -> &TokenMarking {
        &self.node_inputs[step]
    }

    fn is_enabled(&self, step: usize, marking: &TokenMarking) -> bool {
        let inputs = &self.node_inputs[step];
        match self.nodes[step].node_type {
            BpmnNodeType::ParallelGateway => !inputs.is_empty() && inputs.is_subset(marking),
            _ => !inputs.is_disjoint(marking),
        }
    }

    fn fire(&self, step: usize, marking: &TokenMarking) -> Vec<TokenMarking> {
        if !self.is_enabled(step, marking) {
            return Vec::new();
        }
        let node = &self.nodes[step];
        let inputs = &self.node_inputs[step];
        let outputs = &self.node_outputs[step];
        match node.node_type {
            BpmnNodeType::ParallelGateway => {
                let mut result: TokenMarking = marking.difference(inputs).copied().collect();
                result.extend(outputs);
                vec![result]
            }
            BpmnNodeType::InclusiveGateway => {
                let remaining: TokenMarking = marking.difference(inputs).copied().collect();
                if outputs.is_empty() {
                    return vec![remaining];
                }
                outputs
                    .iter()
                    .copied()
                    .powerset()
                    .filter(|subset| !subset.is_empty())
                    .map(|subset| {
                        let mut result = remaining.clone();
                        result.extend(subset);
                        result
                    })
                    .collect()
            }
            BpmnNodeType::ExclusiveGateway
            | BpmnNodeType::Task
            | BpmnNodeType::StartEvent
            | BpmnNodeType::IntermediateEvent
            | BpmnNodeType::EndEvent => {
                let mut active = inputs.intersection(marking).copied();
                // Enabled, so at least one incoming flow holds a token
                let Some(consumed) = active.next() else {
                    return Vec::new();
                };
                if active.next().is_some() {
                    warn!(
                        node = %node.id,
                        consumed = %self.flows[consumed].id,
                        "More than one incoming flow of a non-parallel node holds a token"
                    );
                }
                let mut remaining = marking.clone();
                remaining.remove(&consumed);
                if node.node_type == BpmnNodeType::ExclusiveGateway && !outputs.is_empty() {
                    outputs
                        .iter()
                        .map(|output| {
                            let mut result = remaining.clone();
                            result.insert(*output);
                            result
                        })
                        .collect()
                } else {
                    remaining.extend(outputs);
                    vec![remaining]
                }
            }
        }
    }

    /// Inclusive gateways wait while a token can still reach one of their empty incoming flows
    fn may_advance(&self, step: usize, marking: &TokenMarking) -> bool {
        if self.nodes[step].node_type != BpmnNodeType::InclusiveGateway {
            return true;
        }
        self.node_inputs[step]
            .difference(marking)
            .all(|empty| self.upstream_flows(*empty, step).is_disjoint(marking))
    }

    fn initial_tokens(&self) -> Result<Option<TokenMarking>, ModelError> {
        let initial: TokenMarking = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.node_type == BpmnNodeType::StartEvent)
            .flat_map(|(index, _)| self.node_outputs[index].iter().copied())
            .collect();
        Ok((!initial.is_empty()).then_some(initial))
    }
}

impl TryFrom<BpmnModelDescription> for BpmnModel {
    type Error = ModelError;

    fn try_from(description: BpmnModelDescription) -> Result<Self, Self::Error> {
        let mut model = BpmnModel::new();
        for node in &description.nodes {
            model.add_node(node.node_type, &node.id, &node.name)?;
        }
        for flow in &description.flows {
            model.add_flow(&flow.id, &flow.name, &flow.source, &flow.target)?;
        }
        Ok(model)
    }
}

impl From<BpmnModel> for BpmnModelDescription {
    fn from(model: BpmnModel) -> Self {
        Self {
            nodes: model.nodes,
            flows: model.flows,
        }
    }
}
