use std::io::Write;

use crate::core::marking::format_marking;

use super::io::GraphIOError;
use super::reachability_graph_struct::ReachabilityGraph;

/// Separator line between the marking and edge sections of the TGF text
pub const TGF_SEPARATOR: &str = "#";

///
/// Export a [`ReachabilityGraph`] in Trivial Graph Format
///
/// One line `<id> {'token', ...}` per marking (initial marking first), a `#` line, then one
/// line `<source id> <target id> <activity>` per edge, ordered by edge ID.
///
pub fn export_reachability_graph_to_tgf<W: Write>(
    graph: &ReachabilityGraph,
    mut writer: W,
) -> Result<(), GraphIOError> {
    check_exportable(graph)?;

    let initial = graph
        .initial_marking_id
        .and_then(|id| graph.markings.get_key_value(&id));
    let others = graph
        .markings
        .iter()
        .filter(|(id, _)| Some(**id) != graph.initial_marking_id);
    for (id, marking) in initial.into_iter().chain(others) {
        writeln!(writer, "{id} {}", format_marking(marking))?;
    }
    writeln!(writer, "{TGF_SEPARATOR}")?;
    for (edge, (source, target)) in &graph.edges {
        writeln!(writer, "{source} {target} {}", graph.edge_to_activity[edge])?;
    }
    writer.flush()?;
    Ok(())
}

/// Export a [`ReachabilityGraph`] to a TGF [`String`]
pub fn export_reachability_graph_to_tgf_string(
    graph: &ReachabilityGraph,
) -> Result<String, GraphIOError> {
    let mut bytes = Vec::new();
    export_reachability_graph_to_tgf(graph, &mut bytes)?;
    String::from_utf8(bytes).map_err(|e| GraphIOError::UnsupportedToken(e.to_string()))
}

fn check_exportable(graph: &ReachabilityGraph) -> Result<(), GraphIOError> {
    let bad_token = graph
        .markings
        .values()
        .flatten()
        .find(|token| token.is_empty() || token.contains(['\'', ',', '\n', '\r']));
    if let Some(token) = bad_token {
        return Err(GraphIOError::UnsupportedToken(token.clone()));
    }
    let bad_label = graph
        .edge_to_activity
        .values()
        .find(|label| label.is_empty() || label.contains(['\n', '\r']));
    if let Some(label) = bad_label {
        return Err(GraphIOError::UnsupportedToken(label.clone()));
    }
    Ok(())
}
