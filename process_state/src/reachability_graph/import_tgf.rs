use std::io::BufRead;

use crate::core::Marking;

use super::export_tgf::TGF_SEPARATOR;
use super::io::GraphIOError;
use super::reachability_graph_struct::{MarkingId, ReachabilityGraph};

///
/// Import a [`ReachabilityGraph`] from Trivial Graph Format text
///
/// The first marking line declares the initial marking. Marking IDs are kept as written;
/// edge IDs follow the order of the edge lines.
///
pub fn import_tgf_reader<R: BufRead>(reader: R) -> Result<ReachabilityGraph, GraphIOError> {
    let mut graph = ReachabilityGraph::new();
    let mut in_edges = false;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if line.trim() == TGF_SEPARATOR {
            in_edges = true;
            continue;
        }
        if in_edges {
            let (source, target, activity) = parse_edge_line(line)
                .ok_or_else(|| malformed(line_number, line))?;
            for marking_id in [source, target] {
                if !graph.markings.contains_key(&marking_id) {
                    return Err(GraphIOError::UnknownMarkingId {
                        marking_id,
                        line: line_number,
                    });
                }
            }
            graph.add_edge_between(activity, source, target);
        } else {
            let (marking_id, marking) =
                parse_marking_line(line).ok_or_else(|| malformed(line_number, line))?;
            if graph.markings.contains_key(&marking_id) || graph.marking_to_id.contains_key(&marking) {
                return Err(malformed(line_number, line));
            }
            if graph.markings.is_empty() {
                graph.initial_marking_id = Some(marking_id);
            }
            graph.insert_marking(marking_id, marking);
        }
    }
    Ok(graph)
}

/// Import a [`ReachabilityGraph`] from a TGF string
pub fn import_tgf_str(tgf: &str) -> Result<ReachabilityGraph, GraphIOError> {
    import_tgf_reader(tgf.as_bytes())
}

fn malformed(line: usize, content: &str) -> GraphIOError {
    GraphIOError::MalformedLine {
        line,
        content: content.to_string(),
    }
}

fn parse_marking_line(line: &str) -> Option<(MarkingId, Marking)> {
    let (id, body) = line.trim().split_once(' ')?;
    let body = body.trim().strip_prefix('{')?.strip_suffix('}')?.trim();
    if body.is_empty() {
        return Some((id.parse().ok()?, Marking::new()));
    }
    let marking = body
        .split(',')
        .map(|token| {
            token
                .trim()
                .strip_prefix('\'')
                .and_then(|t| t.strip_suffix('\''))
                .map(str::to_string)
        })
        .collect::<Option<Marking>>()?;
    Some((id.parse().ok()?, marking))
}

fn parse_edge_line(line: &str) -> Option<(MarkingId, MarkingId, &str)> {
    let mut parts = line.splitn(3, ' ');
    let source = parts.next()?.parse().ok()?;
    let target = parts.next()?.parse().ok()?;
    let activity = parts.next().filter(|activity| !activity.is_empty())?;
    Some((source, target, activity))
}
