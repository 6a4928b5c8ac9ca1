//! Process models shared by the unit tests

use crate::bpmn::{BpmnModel, BpmnNodeType};
use crate::core::marking::marking_of;
use crate::petri_net::PetriNet;
use BpmnNodeType::*;

fn bpmn_model(nodes: &[(BpmnNodeType, &str, &str)], flows: &[(&str, &str, &str)]) -> BpmnModel {
    let mut model = BpmnModel::new();
    for (node_type, id, name) in nodes {
        match node_type {
            BpmnNodeType::Task => model.add_task(id, name),
            t if t.is_event() => model.add_event(*t, id, name),
            t => model.add_gateway(*t, id, name),
        }
        .unwrap();
    }
    for (id, source, target) in flows {
        model.add_flow(id, "", source, target).unwrap();
    }
    model
}

fn petri_net(
    places: &[&str],
    transitions: &[(&str, &str, bool)],
    arcs: &[(&str, &str)],
    initial: &str,
    last: &str,
) -> PetriNet {
    let mut net = PetriNet::new();
    for place in places {
        net.add_place(Some(*place), &format!("p{place}")).unwrap();
    }
    for (id, name, invisible) in transitions {
        net.add_transition(Some(*id), name, *invisible).unwrap();
    }
    for (source, target) in arcs {
        net.add_edge(source, target).unwrap();
    }
    net.set_initial_marking(marking_of([initial])).unwrap();
    net.add_final_marking(marking_of([last])).unwrap();
    net
}

/// Start, A, AND-split into B and C, AND-join, XOR-split into D and E, XOR-join, F, end
pub fn bpmn_model_with_and_and_xor() -> BpmnModel {
    bpmn_model(
        &[
            (StartEvent, "0", "start"),
            (Task, "2", "A"),
            (ParallelGateway, "4", ""),
            (Task, "7", "B"),
            (Task, "8", "C"),
            (ParallelGateway, "11", ""),
            (ExclusiveGateway, "13", ""),
            (Task, "16", "D"),
            (Task, "17", "E"),
            (ExclusiveGateway, "20", ""),
            (Task, "22", "F"),
            (EndEvent, "24", "end"),
        ],
        &[
            ("1", "0", "2"),
            ("3", "2", "4"),
            ("5", "4", "7"),
            ("6", "4", "8"),
            ("9", "7", "11"),
            ("10", "8", "11"),
            ("12", "11", "13"),
            ("14", "13", "16"),
            ("15", "13", "17"),
            ("18", "16", "20"),
            ("19", "17", "20"),
            ("21", "20", "22"),
            ("23", "22", "24"),
        ],
    )
}

/// Start, A, AND-split into a B-loop and C, AND-join, D, end
pub fn bpmn_model_with_loop_inside_and() -> BpmnModel {
    bpmn_model(
        &[
            (StartEvent, "0", "start"),
            (Task, "2", "A"),
            (ParallelGateway, "4", ""),
            (ExclusiveGateway, "7", ""),
            (Task, "8", "C"),
            (Task, "10", "B"),
            (ExclusiveGateway, "13", ""),
            (ParallelGateway, "16", ""),
            (Task, "18", "D"),
            (EndEvent, "20", "end"),
        ],
        &[
            ("1", "0", "2"),
            ("3", "2", "4"),
            ("5", "4", "7"),
            ("6", "4", "8"),
            ("9", "7", "10"),
            ("11", "10", "13"),
            ("12", "13", "7"),
            ("14", "13", "16"),
            ("15", "8", "16"),
            ("17", "16", "18"),
            ("19", "18", "20"),
        ],
    )
}

/// Start, A, then a loop in which B can be skipped and which can only be left to C, end
pub fn bpmn_model_with_infinite_loop() -> BpmnModel {
    bpmn_model(
        &[
            (StartEvent, "0", "start"),
            (Task, "2", "A"),
            (ExclusiveGateway, "4", ""),
            (ExclusiveGateway, "6", ""),
            (Task, "8", "B"),
            (ExclusiveGateway, "10", ""),
            (ExclusiveGateway, "12", ""),
            (Task, "14", "C"),
            (EndEvent, "16", "end"),
        ],
        &[
            ("1", "0", "2"),
            ("3", "2", "4"),
            ("5", "4", "6"),
            ("7", "6", "8"),
            ("9", "6", "10"),
            ("11", "8", "10"),
            ("13", "10", "12"),
            ("15", "12", "4"),
            ("17", "12", "14"),
            ("18", "14", "16"),
        ],
    )
}

/// Start, A, intermediate event "Timer", B, end
pub fn bpmn_model_with_events() -> BpmnModel {
    bpmn_model(
        &[
            (StartEvent, "0", "start"),
            (Task, "2", "A"),
            (IntermediateEvent, "4", "Timer"),
            (Task, "6", "B"),
            (EndEvent, "8", "end"),
        ],
        &[
            ("1", "0", "2"),
            ("3", "2", "4"),
            ("5", "4", "6"),
            ("7", "6", "8"),
        ],
    )
}

/// Start, A, AND-split into B or a nested choice of C and D, in parallel to E, AND-join, F, end
pub fn bpmn_model_with_and_and_nested_xor() -> BpmnModel {
    bpmn_model(
        &[
            (StartEvent, "0", "start"),
            (Task, "2", "A"),
            (ParallelGateway, "5", ""),
            (ExclusiveGateway, "7", ""),
            (Task, "10", "B"),
            (ExclusiveGateway, "11", ""),
            (Task, "14", "C"),
            (Task, "15", "D"),
            (ExclusiveGateway, "18", ""),
            (Task, "19", "E"),
            (ExclusiveGateway, "22", ""),
            (Task, "23", "F"),
            (ParallelGateway, "25", ""),
            (EndEvent, "26", "end"),
        ],
        &[
            ("1", "0", "2"),
            ("3", "2", "5"),
            ("4", "5", "7"),
            ("6", "5", "19"),
            ("8", "7", "10"),
            ("9", "7", "11"),
            ("12", "11", "14"),
            ("13", "11", "15"),
            ("16", "14", "18"),
            ("17", "15", "18"),
            ("28", "18", "22"),
            ("29", "10", "22"),
            ("21", "22", "25"),
            ("20", "19", "25"),
            ("27", "25", "23"),
            ("24", "23", "26"),
        ],
    )
}

/// Start, A, parallel B-loop and C-loop, then parallel choices D/E and F/G, H, end
pub fn bpmn_model_with_two_loops_inside_and_followed_by_xor_within_and() -> BpmnModel {
    bpmn_model(
        &[
            (StartEvent, "0", "start"),
            (Task, "2", "A"),
            (ParallelGateway, "4", ""),
            (ExclusiveGateway, "7", ""),
            (ExclusiveGateway, "8", ""),
            (Task, "11", "B"),
            (Task, "12", "C"),
            (ExclusiveGateway, "15", ""),
            (ExclusiveGateway, "16", ""),
            (ParallelGateway, "21", ""),
            (ParallelGateway, "23", ""),
            (ExclusiveGateway, "26", ""),
            (ExclusiveGateway, "27", ""),
            (Task, "32", "D"),
            (Task, "33", "E"),
            (Task, "34", "F"),
            (Task, "35", "G"),
            (ExclusiveGateway, "38", ""),
            (ExclusiveGateway, "42", ""),
            (ParallelGateway, "44", ""),
            (Task, "47", "H"),
            (EndEvent, "49", "end"),
        ],
        &[
            ("1", "0", "2"),
            ("3", "2", "4"),
            ("5", "4", "7"),
            ("6", "4", "8"),
            ("9", "7", "11"),
            ("10", "8", "12"),
            ("13", "11", "15"),
            ("14", "12", "16"),
            ("17", "15", "7"),
            ("18", "16", "8"),
            ("19", "15", "21"),
            ("20", "16", "21"),
            ("22", "21", "23"),
            ("24", "23", "26"),
            ("25", "23", "27"),
            ("28", "26", "32"),
            ("29", "26", "33"),
            ("30", "27", "34"),
            ("31", "27", "35"),
            ("36", "32", "38"),
            ("37", "33", "38"),
            ("39", "34", "42"),
            ("45", "35", "42"),
            ("40", "38", "44"),
            ("41", "42", "44"),
            ("43", "44", "47"),
            ("48", "47", "49"),
        ],
    )
}

/// Start, AND-split into A with parallel B- and C-loops before E, and a D-loop, AND-join, F, end
pub fn bpmn_model_with_three_loops_inside_and() -> BpmnModel {
    bpmn_model(
        &[
            (StartEvent, "0", "start"),
            (ParallelGateway, "2", ""),
            (Task, "5", "A"),
            (ParallelGateway, "6", ""),
            (ExclusiveGateway, "10", ""),
            (ExclusiveGateway, "11", ""),
            (Task, "15", "B"),
            (Task, "16", "C"),
            (ExclusiveGateway, "21", ""),
            (ExclusiveGateway, "22", ""),
            (ExclusiveGateway, "25", ""),
            (Task, "27", "D"),
            (ParallelGateway, "30", ""),
            (Task, "32", "E"),
            (ExclusiveGateway, "34", ""),
            (ParallelGateway, "35", ""),
            (Task, "37", "F"),
            (EndEvent, "39", "end"),
        ],
        &[
            ("1", "0", "2"),
            ("3", "2", "5"),
            ("4", "2", "25"),
            ("7", "5", "6"),
            ("8", "6", "10"),
            ("9", "6", "11"),
            ("13", "10", "15"),
            ("14", "11", "16"),
            ("17", "15", "21"),
            ("18", "16", "22"),
            ("19", "21", "10"),
            ("20", "22", "11"),
            ("23", "21", "30"),
            ("24", "22", "30"),
            ("26", "25", "27"),
            ("28", "27", "34"),
            ("29", "34", "25"),
            ("12", "34", "35"),
            ("31", "30", "32"),
            ("33", "32", "35"),
            ("36", "35", "37"),
            ("38", "37", "39"),
        ],
    )
}

/// Start, A, then D either directly or after a parallel optional B and C-loop, end
pub fn bpmn_model_with_optional_and_with_skipping_and_loop_branches() -> BpmnModel {
    bpmn_model(
        &[
            (StartEvent, "0", "start"),
            (Task, "2", "A"),
            (ExclusiveGateway, "4", ""),
            (ParallelGateway, "7", ""),
            (ExclusiveGateway, "9", ""),
            (ExclusiveGateway, "10", ""),
            (Task, "11", "C"),
            (ExclusiveGateway, "12", ""),
            (Task, "19", "B"),
            (ParallelGateway, "22", ""),
            (ExclusiveGateway, "23", ""),
            (ExclusiveGateway, "26", ""),
            (Task, "30", "D"),
            (EndEvent, "31", "end"),
        ],
        &[
            ("1", "0", "2"),
            ("3", "2", "4"),
            ("5", "4", "7"),
            ("27", "4", "26"),
            ("6", "7", "9"),
            ("8", "7", "10"),
            ("16", "10", "11"),
            ("18", "11", "12"),
            ("13", "12", "10"),
            ("14", "12", "22"),
            ("15", "9", "19"),
            ("20", "9", "23"),
            ("24", "19", "23"),
            ("21", "23", "22"),
            ("25", "22", "26"),
            ("29", "26", "30"),
            ("28", "30", "31"),
        ],
    )
}

/// Start, A, OR-split into B and C, OR-join, D, end
pub fn bpmn_model_with_inclusive_gateways() -> BpmnModel {
    bpmn_model(
        &[
            (StartEvent, "0", "start"),
            (Task, "2", "A"),
            (InclusiveGateway, "4", ""),
            (Task, "7", "B"),
            (Task, "8", "C"),
            (InclusiveGateway, "11", ""),
            (Task, "13", "D"),
            (EndEvent, "15", "end"),
        ],
        &[
            ("1", "0", "2"),
            ("3", "2", "4"),
            ("5", "4", "7"),
            ("6", "4", "8"),
            ("9", "7", "11"),
            ("10", "8", "11"),
            ("12", "11", "13"),
            ("14", "13", "15"),
        ],
    )
}

/// A splitting into B and C, silent join, choice between D and E, F
pub fn petri_net_with_and_and_xor() -> PetriNet {
    petri_net(
        &["0", "2", "3", "6", "7", "9", "12", "14"],
        &[
            ("1", "A", false),
            ("4", "B", false),
            ("5", "C", false),
            ("10", "D", false),
            ("11", "E", false),
            ("13", "F", false),
            ("8", "silent_8", true),
        ],
        &[
            ("0", "1"),
            ("1", "2"),
            ("1", "3"),
            ("2", "4"),
            ("3", "5"),
            ("4", "6"),
            ("5", "7"),
            ("6", "8"),
            ("7", "8"),
            ("8", "9"),
            ("9", "10"),
            ("9", "11"),
            ("10", "12"),
            ("11", "12"),
            ("12", "13"),
            ("13", "14"),
        ],
        "0",
        "14",
    )
}

/// A, silent split into a B-loop and C, silent join, D
pub fn petri_net_with_loop_inside_and() -> PetriNet {
    petri_net(
        &["0", "2", "4", "5", "8", "9", "12", "14"],
        &[
            ("1", "A", false),
            ("6", "B", false),
            ("7", "C", false),
            ("13", "D", false),
            ("3", "silent_3", true),
            ("10", "silent_10", true),
            ("11", "silent_11", true),
        ],
        &[
            ("0", "1"),
            ("1", "2"),
            ("2", "3"),
            ("3", "4"),
            ("3", "5"),
            ("4", "6"),
            ("5", "7"),
            ("6", "8"),
            ("7", "9"),
            ("8", "10"),
            ("10", "4"),
            ("8", "11"),
            ("9", "11"),
            ("11", "12"),
            ("12", "13"),
            ("13", "14"),
        ],
        "0",
        "14",
    )
}

/// A, then a silent loop with optional B that can only be left to C
pub fn petri_net_with_infinite_loop() -> PetriNet {
    petri_net(
        &["0", "2", "4", "6", "9", "11", "14", "16"],
        &[
            ("1", "A", false),
            ("7", "B", false),
            ("15", "C", false),
            ("3", "silent_3", true),
            ("5", "silent_5", true),
            ("8", "silent_8", true),
            ("10", "silent_10", true),
            ("12", "silent_12", true),
            ("13", "silent_13", true),
        ],
        &[
            ("0", "1"),
            ("1", "2"),
            ("2", "3"),
            ("3", "4"),
            ("4", "5"),
            ("4", "8"),
            ("5", "6"),
            ("6", "7"),
            ("7", "9"),
            ("8", "9"),
            ("9", "10"),
            ("10", "11"),
            ("11", "12"),
            ("11", "13"),
            ("12", "2"),
            ("13", "14"),
            ("14", "15"),
            ("15", "16"),
        ],
        "0",
        "16",
    )
}

/// A, silent split into three branches each choosing between two tasks, silent join, H
pub fn petri_net_with_xor_within_and() -> PetriNet {
    let places = [
        "0", "2", "4", "5", "6", "13", "14", "15", "16", "17", "18", "25", "26", "27", "28",
        "29", "30", "37", "38", "39", "41", "43",
    ];
    let mut transitions = vec![
        ("1", "A", false),
        ("19", "B", false),
        ("20", "C", false),
        ("21", "D", false),
        ("22", "E", false),
        ("23", "F", false),
        ("24", "G", false),
        ("42", "H", false),
    ];
    let silent_ids = [
        "3", "7", "8", "9", "10", "11", "12", "31", "32", "33", "34", "35", "36", "40",
    ];
    transitions.extend(silent_ids.iter().map(|id| (*id, "", true)));
    petri_net(
        &places,
        &transitions,
        &[
            ("0", "1"),
            ("1", "2"),
            ("2", "3"),
            ("3", "4"),
            ("3", "5"),
            ("3", "6"),
            ("4", "7"),
            ("4", "8"),
            ("5", "9"),
            ("5", "10"),
            ("6", "11"),
            ("6", "12"),
            ("7", "13"),
            ("8", "14"),
            ("9", "15"),
            ("10", "16"),
            ("11", "17"),
            ("12", "18"),
            ("13", "19"),
            ("14", "20"),
            ("15", "21"),
            ("16", "22"),
            ("17", "23"),
            ("18", "24"),
            ("19", "25"),
            ("20", "26"),
            ("21", "27"),
            ("22", "28"),
            ("23", "29"),
            ("24", "30"),
            ("25", "31"),
            ("26", "32"),
            ("27", "33"),
            ("28", "34"),
            ("29", "35"),
            ("30", "36"),
            ("31", "37"),
            ("32", "37"),
            ("33", "38"),
            ("34", "38"),
            ("35", "39"),
            ("36", "39"),
            ("37", "40"),
            ("38", "40"),
            ("39", "40"),
            ("40", "41"),
            ("41", "42"),
            ("42", "43"),
        ],
        "0",
        "43",
    )
}

/// A, silent split into B or a nested choice of C and D, in parallel to E, silent join, F
pub fn petri_net_with_and_and_nested_xor() -> PetriNet {
    petri_net(
        &[
            "0", "2", "4", "5", "8", "9", "13", "14", "17", "18", "19", "23", "25", "27", "29",
        ],
        &[
            ("1", "A", false),
            ("10", "B", false),
            ("15", "C", false),
            ("16", "D", false),
            ("24", "E", false),
            ("28", "F", false),
            ("3", "silent_3", true),
            ("6", "silent_6", true),
            ("7", "silent_7", true),
            ("11", "silent_11", true),
            ("12", "silent_12", true),
            ("20", "silent_20", true),
            ("21", "silent_21", true),
            ("22", "silent_22", true),
            ("26", "silent_26", true),
        ],
        &[
            ("0", "1"),
            ("1", "2"),
            ("2", "3"),
            ("3", "4"),
            ("3", "5"),
            ("4", "6"),
            ("4", "7"),
            ("6", "8"),
            ("7", "9"),
            ("8", "10"),
            ("9", "11"),
            ("9", "12"),
            ("11", "13"),
            ("12", "14"),
            ("13", "15"),
            ("14", "16"),
            ("10", "17"),
            ("15", "18"),
            ("16", "19"),
            ("17", "20"),
            ("18", "21"),
            ("19", "22"),
            ("20", "23"),
            ("21", "23"),
            ("22", "23"),
            ("5", "24"),
            ("24", "25"),
            ("23", "26"),
            ("25", "26"),
            ("26", "27"),
            ("27", "28"),
            ("28", "29"),
        ],
        "0",
        "29",
    )
}

/// A, parallel B-loop and C-loop, then parallel choices D/E and F/G, H
pub fn petri_net_with_two_loops_inside_and_followed_by_xor_within_and() -> PetriNet {
    petri_net(
        &[
            "0", "2", "4", "5", "8", "9", "13", "15", "16", "21", "22", "23", "24", "29", "30",
            "31", "32", "37", "38", "40", "42",
        ],
        &[
            ("1", "A", false),
            ("6", "B", false),
            ("7", "C", false),
            ("25", "D", false),
            ("26", "E", false),
            ("27", "F", false),
            ("28", "G", false),
            ("41", "H", false),
            ("3", "silent_3", true),
            ("10", "silent_10", true),
            ("11", "silent_11", true),
            ("12", "silent_12", true),
            ("14", "silent_14", true),
            ("17", "silent_17", true),
            ("18", "silent_18", true),
            ("19", "silent_19", true),
            ("20", "silent_20", true),
            ("33", "silent_33", true),
            ("34", "silent_34", true),
            ("35", "silent_35", true),
            ("36", "silent_36", true),
            ("39", "silent_39", true),
        ],
        &[
            ("0", "1"),
            ("1", "2"),
            ("2", "3"),
            ("3", "4"),
            ("3", "5"),
            ("4", "6"),
            ("5", "7"),
            ("6", "8"),
            ("7", "9"),
            ("8", "10"),
            ("8", "12"),
            ("9", "11"),
            ("9", "12"),
            ("10", "4"),
            ("11", "5"),
            ("12", "13"),
            ("13", "14"),
            ("14", "15"),
            ("14", "16"),
            ("15", "17"),
            ("15", "18"),
            ("16", "19"),
            ("16", "20"),
            ("17", "21"),
            ("18", "22"),
            ("19", "23"),
            ("20", "24"),
            ("21", "25"),
            ("22", "26"),
            ("23", "27"),
            ("24", "28"),
            ("25", "29"),
            ("26", "30"),
            ("27", "31"),
            ("28", "32"),
            ("29", "33"),
            ("30", "34"),
            ("31", "35"),
            ("32", "36"),
            ("33", "37"),
            ("34", "37"),
            ("35", "38"),
            ("36", "38"),
            ("37", "39"),
            ("38", "39"),
            ("39", "40"),
            ("40", "41"),
            ("41", "42"),
        ],
        "0",
        "42",
    )
}

/// Silent split into A with parallel B- and C-loops before E, and a D-loop, silent join, F
pub fn petri_net_with_three_loops_inside_and() -> PetriNet {
    petri_net(
        &["0", "2", "4", "6", "7", "10", "11", "15", "17", "18", "20", "23", "25"],
        &[
            ("3", "A", false),
            ("8", "B", false),
            ("9", "C", false),
            ("19", "D", false),
            ("16", "E", false),
            ("24", "F", false),
            ("1", "silent_1", true),
            ("5", "silent_5", true),
            ("12", "silent_12", true),
            ("13", "silent_13", true),
            ("14", "silent_14", true),
            ("21", "silent_21", true),
            ("22", "silent_22", true),
        ],
        &[
            ("0", "1"),
            ("1", "2"),
            ("1", "18"),
            ("2", "3"),
            ("3", "4"),
            ("4", "5"),
            ("5", "6"),
            ("5", "7"),
            ("6", "8"),
            ("7", "9"),
            ("8", "10"),
            ("9", "11"),
            ("10", "12"),
            ("10", "14"),
            ("11", "13"),
            ("11", "14"),
            ("12", "6"),
            ("13", "7"),
            ("14", "15"),
            ("15", "16"),
            ("16", "17"),
            ("17", "22"),
            ("18", "19"),
            ("19", "20"),
            ("20", "21"),
            ("20", "22"),
            ("21", "18"),
            ("22", "23"),
            ("23", "24"),
            ("24", "25"),
        ],
        "0",
        "25",
    )
}

/// A, then either D directly or a silent split into an optional B and a C-loop joined before D
pub fn petri_net_with_optional_and_with_skipping_and_loop_branches() -> PetriNet {
    petri_net(
        &["0", "2", "4", "5", "8", "9", "12", "16", "18"],
        &[
            ("1", "A", false),
            ("10", "B", false),
            ("7", "C", false),
            ("17", "D", false),
            ("3", "silent_3", true),
            ("6", "silent_6", true),
            ("11", "silent_11", true),
            ("13", "silent_13", true),
            ("14", "silent_14", true),
            ("15", "silent_15", true),
        ],
        &[
            ("0", "1"),
            ("1", "2"),
            ("2", "3"),
            ("2", "15"),
            ("3", "4"),
            ("3", "5"),
            ("4", "6"),
            ("4", "11"),
            ("5", "7"),
            ("6", "8"),
            ("7", "9"),
            ("8", "10"),
            ("9", "13"),
            ("9", "14"),
            ("10", "12"),
            ("11", "12"),
            ("12", "14"),
            ("13", "5"),
            ("14", "16"),
            ("15", "16"),
            ("16", "17"),
            ("17", "18"),
        ],
        "0",
        "18",
    )
}
