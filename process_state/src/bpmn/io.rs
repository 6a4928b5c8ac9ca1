//! IO implementations for [`BpmnModel`]

use std::io::{Read, Write};

use thiserror::Error;

use crate::core::io::{normalize_format, Exportable, Importable};

use super::bpmn_model_struct::BpmnModel;

/// Error type for [`BpmnModel`] IO operations
#[derive(Debug, Error)]
pub enum BpmnModelIOError {
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON Error, including models violating construction constraints
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unsupported Format
    #[error("Unsupported Format: {0}")]
    UnsupportedFormat(String),
}

impl Importable for BpmnModel {
    type Error = BpmnModelIOError;

    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error> {
        match normalize_format(format).as_str() {
            "json" => Ok(serde_json::from_reader(std::io::BufReader::new(reader))?),
            _ => Err(BpmnModelIOError::UnsupportedFormat(format.to_string())),
        }
    }
}

impl Exportable for BpmnModel {
    type Error = BpmnModelIOError;

    fn export_to_writer<W: Write>(&self, mut writer: W, format: &str) -> Result<(), Self::Error> {
        match normalize_format(format).as_str() {
            "json" => {
                serde_json::to_writer_pretty(&mut writer, self)?;
                writer.flush()?;
                Ok(())
            }
            _ => Err(BpmnModelIOError::UnsupportedFormat(format.to_string())),
        }
    }
}
