//! IO implementations for [`PetriNet`]

use std::io::{Read, Write};

use thiserror::Error;

use crate::core::io::{normalize_format, Exportable, Importable};

use super::petri_net_struct::PetriNet;

/// Error type for [`PetriNet`] IO operations
#[derive(Debug, Error)]
pub enum PetriNetIOError {
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON Error, including nets with invalid arcs
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unsupported Format
    #[error("Unsupported Format: {0}")]
    UnsupportedFormat(String),
}

impl Importable for PetriNet {
    type Error = PetriNetIOError;

    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error> {
        match normalize_format(format).as_str() {
            "json" => Ok(serde_json::from_reader(std::io::BufReader::new(reader))?),
            _ => Err(PetriNetIOError::UnsupportedFormat(format.to_string())),
        }
    }
}

impl Exportable for PetriNet {
    type Error = PetriNetIOError;

    fn export_to_writer<W: Write>(&self, mut writer: W, format: &str) -> Result<(), Self::Error> {
        match normalize_format(format).as_str() {
            "json" => {
                serde_json::to_writer_pretty(&mut writer, self)?;
                writer.flush()?;
                Ok(())
            }
            _ => Err(PetriNetIOError::UnsupportedFormat(format.to_string())),
        }
    }
}
