use process_state::core::marking::marking_of;
use process_state::{
    BpmnModel, Exportable, Importable, Marking, NGramIndex, PetriNet, ReachabilityGraph,
    ReachabilityGraphOptions, TRACE_START,
};
use serde_json::json;

/// Start, AND split into A and B, AND join, C, end
fn parallel_bpmn_json() -> serde_json::Value {
    let node = |id: &str, name: &str, node_type: &str| {
        json!({ "id": id, "name": name, "node_type": node_type })
    };
    let flow = |id: &str, source: &str, target: &str| {
        json!({ "id": id, "name": "", "source": source, "target": target })
    };
    json!({
        "nodes": [
            node("s", "start", "StartEvent"),
            node("split", "", "ParallelGateway"),
            node("a", "A", "Task"),
            node("b", "B", "Task"),
            node("join", "", "ParallelGateway"),
            node("c", "C", "Task"),
            node("e", "end", "EndEvent"),
        ],
        "flows": [
            flow("f1", "s", "split"),
            flow("fA", "split", "a"),
            flow("fB", "split", "b"),
            flow("fA2", "a", "join"),
            flow("fB2", "b", "join"),
            flow("fJ", "join", "c"),
            flow("fC", "c", "e"),
        ]
    })
}

fn m(tokens: &[&str]) -> Marking {
    marking_of(tokens.iter().copied())
}

#[test]
fn parallel_split_from_json_model() {
    let bytes = serde_json::to_vec(&parallel_bpmn_json()).unwrap();
    let model = BpmnModel::import_from_bytes(&bytes, "json").unwrap();
    assert_eq!(
        model.advance_marking_until_decision_point(&m(&["f1"])).unwrap(),
        m(&["fA", "fB"])
    );

    let graph = model
        .get_reachability_graph(&ReachabilityGraphOptions::default())
        .unwrap();
    assert_eq!(graph.markings.len(), 5);
    assert_eq!(graph.initial_marking(), Some(&m(&["fA", "fB"])));

    let split_state = graph.initial_marking_id.unwrap();
    let mut split_labels: Vec<&str> = graph.outgoing_edges[&split_state]
        .iter()
        .map(|edge| graph.edge_to_activity[edge].as_str())
        .collect();
    split_labels.sort();
    assert_eq!(split_labels, vec!["A", "B"]);

    // Both interleavings meet in the single state enabling C
    assert_eq!(graph.activity_to_edges["C"].len(), 1);
    let enabling_c = graph.get_marking_id(&m(&["fJ"])).unwrap();
    for order in [["A", "B"], ["B", "A"]] {
        let markings = graph.get_markings_from_activity_sequence(&order).unwrap();
        assert_eq!(markings[1], &m(&["fJ"]));
    }
    assert_eq!(graph.incoming_edges[&enabling_c].len(), 2);

    let index = NGramIndex::new(&graph, 1).build();
    assert_eq!(index.get_marking_state(&[TRACE_START]), vec![&m(&["fA", "fB"])]);
    assert!(index.get_marking_state(&["A"]).contains(&&m(&["fA2", "fB"])));
    assert!(index.get_marking_state(&["B"]).contains(&&m(&["fA", "fB2"])));
    assert_eq!(index.get_marking_state(&["C"]), vec![&m(&["fC"])]);

    let index = NGramIndex::new(&graph, 2).build();
    assert_eq!(index.get_best_marking_state_for(&["A"]), Some(&m(&["fA2", "fB"])));
    assert_eq!(index.get_best_marking_state_for(&["B"]), Some(&m(&["fA", "fB2"])));
    assert_eq!(index.get_best_marking_state_for(&["A", "B"]), Some(&m(&["fJ"])));
    assert_eq!(index.get_best_marking_state_for(&["B", "A"]), Some(&m(&["fJ"])));
    assert_eq!(
        index.get_best_marking_state_for(&["A", "B", "C"]),
        Some(&m(&["fC"]))
    );
}

#[test]
fn petri_net_pipeline_through_files() {
    let description = json!({
        "places": [
            { "id": "p1", "name": "" },
            { "id": "p2", "name": "" },
            { "id": "p3", "name": "" },
            { "id": "p4", "name": "" },
        ],
        "transitions": [
            { "id": "t1", "name": "Register", "invisible": false },
            { "id": "t2", "name": "Approve", "invisible": false },
            { "id": "t3", "name": "Reject", "invisible": false },
            { "id": "t4", "name": "Archive", "invisible": false },
        ],
        "arcs": [
            ["p1", "t1"], ["t1", "p2"],
            ["p2", "t2"], ["p2", "t3"],
            ["t2", "p3"], ["t3", "p3"],
            ["p3", "t4"], ["t4", "p4"],
        ],
        "initial_marking": ["p1"],
        "final_markings": [["p4"]],
    });
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("approval.json");
    std::fs::write(&model_path, serde_json::to_vec_pretty(&description).unwrap()).unwrap();

    let net = PetriNet::import_from_path(&model_path).unwrap();
    let graph = net
        .get_reachability_graph(&ReachabilityGraphOptions::default())
        .unwrap();
    assert_eq!(graph.markings.len(), 4);
    assert_eq!(graph.edges.len(), 4);
    assert!(net.is_final_marking(&m(&["p4"])));

    let graph_path = dir.path().join("approval.tgf");
    let index_path = dir.path().join("approval.ngram.json");
    graph.export_to_path(&graph_path).unwrap();
    NGramIndex::new(&graph, 2)
        .build()
        .export_to_path(&index_path)
        .unwrap();

    let graph = ReachabilityGraph::import_from_path(&graph_path).unwrap();
    let index = NGramIndex::import_from_path(&index_path).unwrap();
    assert!(index.is_consistent_with(&graph));

    let histories: Vec<Vec<String>> = [
        vec!["Register"],
        vec!["Register", "Reject"],
        vec!["Register", "Approve", "Archive"],
        vec!["Unknown"],
    ]
    .into_iter()
    .map(|history| history.into_iter().map(String::from).collect())
    .collect();
    assert_eq!(
        index.get_best_marking_states_for_all(&histories),
        vec![
            Some(&m(&["p2"])),
            Some(&m(&["p3"])),
            Some(&m(&["p4"])),
            None
        ]
    );
}

#[test]
fn invalid_models_are_rejected_on_import() {
    let mut description = parallel_bpmn_json();
    description["flows"][6]["source"] = json!("e");
    let bytes = serde_json::to_vec(&description).unwrap();
    assert!(BpmnModel::import_from_bytes(&bytes, "json").is_err());

    let net = json!({
        "places": [{ "id": "p1", "name": "" }, { "id": "p2", "name": "" }],
        "transitions": [],
        "arcs": [["p1", "p2"]],
        "initial_marking": ["p1"],
    });
    let bytes = serde_json::to_vec(&net).unwrap();
    assert!(PetriNet::import_from_bytes(&bytes, "json").is_err());
}
