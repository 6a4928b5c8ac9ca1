use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
///
///
/// Options for building a reachability graph
///
pub struct ReachabilityGraphOptions {
    /// Memoize the silent-step exploration of markings during the build
    ///
    /// Cached and uncached builds produce identical graphs; disabling the cache is only useful to compare runtimes.
    pub cached_search: bool,
    /// Treat intermediate events of BPMN models as observable activities
    ///
    /// If false, intermediate events are fired silently like gateways and never label a graph edge.
    /// Has no effect on Petri nets.
    pub treat_event_as_task: bool,
}

impl Default for ReachabilityGraphOptions {
    fn default() -> Self {
        Self {
            cached_search: true,
            treat_event_as_task: true,
        }
    }
}

impl ReachabilityGraphOptions {
    /// Options with the marking cache disabled
    pub fn uncached() -> Self {
        Self {
            cached_search: false,
            ..Default::default()
        }
    }
}
