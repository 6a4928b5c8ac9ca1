//! IO implementations for [`NGramIndex`]

use std::io::{Read, Write};

use thiserror::Error;

use crate::core::io::{normalize_format, Exportable, Importable};

use super::n_gram_index_struct::NGramIndex;

/// Error type for [`NGramIndex`] IO operations
#[derive(Debug, Error)]
pub enum NGramIndexIOError {
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (De-)Serialization Error
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unsupported Format
    #[error("Unsupported Format: {0}")]
    UnsupportedFormat(String),
}

impl Importable for NGramIndex {
    type Error = NGramIndexIOError;

    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error> {
        match normalize_format(format).as_str() {
            "json" => Ok(serde_json::from_reader(std::io::BufReader::new(reader))?),
            _ => Err(NGramIndexIOError::UnsupportedFormat(format.to_string())),
        }
    }
}

impl Exportable for NGramIndex {
    type Error = NGramIndexIOError;

    fn export_to_writer<W: Write>(&self, mut writer: W, format: &str) -> Result<(), Self::Error> {
        match normalize_format(format).as_str() {
            "json" => {
                serde_json::to_writer(&mut writer, self)?;
                writer.flush()?;
                Ok(())
            }
            _ => Err(NGramIndexIOError::UnsupportedFormat(format.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reachability_graph::ReachabilityGraph;
    use crate::utils::test_fixtures::{bpmn_model_with_loop_inside_and, petri_net_with_and_and_xor};
    use crate::{ReachabilityGraphOptions, TRACE_START};

    #[test]
    fn index_file_round_trip() {
        let graph = bpmn_model_with_loop_inside_and()
            .get_reachability_graph(&ReachabilityGraphOptions::default())
            .unwrap();
        let index = NGramIndex::new(&graph, 3).build();

        let dir = tempfile::tempdir().unwrap();
        let graph_path = dir.path().join("loop.tgf");
        let index_path = dir.path().join("loop.ngram.json");
        graph.export_to_path(&graph_path).unwrap();
        index.export_to_path(&index_path).unwrap();

        let read_index = NGramIndex::import_from_path(&index_path).unwrap();
        let read_graph = ReachabilityGraph::import_from_path(&graph_path).unwrap();
        assert_eq!(read_index, index);
        assert!(read_index.is_consistent_with(&read_graph));
        assert_eq!(
            read_index.get_best_marking_state_for(&["A", "B", "B"]),
            index.get_best_marking_state_for(&["A", "B", "B"])
        );
    }

    #[test]
    fn index_json_layout() {
        let graph = petri_net_with_and_and_xor()
            .get_reachability_graph(&ReachabilityGraphOptions::default())
            .unwrap();
        let index = NGramIndex::new(&graph, 1).build();
        let bytes = index.export_to_bytes("json").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["n_gram_size_limit"], 1);
        let associations = value["associations"].as_array().unwrap();
        assert_eq!(associations.len(), index.associations.len());
        assert!(associations
            .iter()
            .any(|pair| pair[0] == serde_json::json!([TRACE_START])));
    }

    #[test]
    fn invalid_index_files() {
        assert!(matches!(
            NGramIndex::import_from_bytes(b"{\"n_gram_size_limit\": 2}", "json"),
            Err(NGramIndexIOError::Json(_))
        ));
        assert!(matches!(
            NGramIndex::import_from_bytes(b"", "tgf"),
            Err(NGramIndexIOError::UnsupportedFormat(_))
        ));
    }
}
