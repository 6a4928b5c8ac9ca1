use std::collections::BTreeSet;

/// Marking of a process model: the set of flow (BPMN) or place (Petri net) IDs holding a token
///
/// Markings are plain values. The ordered set doubles as the canonical key wherever
/// markings are deduplicated or stored in maps.
pub type Marking = BTreeSet<String>;

/// Marking over the dense token indices assigned by a model at construction time
pub type TokenMarking = BTreeSet<usize>;

/// Format a [`Marking`] as `{'a', 'b'}` (tokens in canonical order)
pub fn format_marking(marking: &Marking) -> String {
    let tokens: Vec<String> = marking.iter().map(|token| format!("'{token}'")).collect();
    format!("{{{}}}", tokens.join(", "))
}

/// Build a [`Marking`] from anything yielding string-like token IDs
pub fn marking_of<I, S>(tokens: I) -> Marking
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tokens.into_iter().map(Into::into).collect()
}
