//! IO implementations for [`ReachabilityGraph`]

use std::io::{Read, Write};

use thiserror::Error;

use crate::core::io::{normalize_format, Exportable, Importable};

use super::export_tgf::export_reachability_graph_to_tgf;
use super::import_tgf::import_tgf_reader;
use super::reachability_graph_struct::{MarkingId, ReachabilityGraph};

/// Error type for [`ReachabilityGraph`] IO operations
#[derive(Debug, Error)]
pub enum GraphIOError {
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// A line of the TGF text could not be parsed
    #[error("Malformed line {line}: {content:?}")]
    MalformedLine {
        /// Line number (starting at 1)
        line: usize,
        /// Line content
        content: String,
    },
    /// An edge references a marking ID not declared before the `#` separator
    #[error("Unknown marking ID {marking_id} in line {line}")]
    UnknownMarkingId {
        /// Referenced marking ID
        marking_id: MarkingId,
        /// Line number (starting at 1)
        line: usize,
    },
    /// A token or activity label cannot be written to the TGF text
    #[error("Unsupported token or label {0:?}")]
    UnsupportedToken(String),
    /// Unsupported Format
    #[error("Unsupported Format: {0}")]
    UnsupportedFormat(String),
}

impl Importable for ReachabilityGraph {
    type Error = GraphIOError;

    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error> {
        match normalize_format(format).as_str() {
            "tgf" => import_tgf_reader(std::io::BufReader::new(reader)),
            _ => Err(GraphIOError::UnsupportedFormat(format.to_string())),
        }
    }
}

impl Exportable for ReachabilityGraph {
    type Error = GraphIOError;

    fn export_to_writer<W: Write>(&self, writer: W, format: &str) -> Result<(), Self::Error> {
        match normalize_format(format).as_str() {
            "tgf" => export_reachability_graph_to_tgf(self, writer),
            _ => Err(GraphIOError::UnsupportedFormat(format.to_string())),
        }
    }
}
