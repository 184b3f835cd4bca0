//! Converts Google protobuf schemas into Composer CTO models.

pub mod batch;
pub mod buffer;
pub mod schema;
pub mod sink;
pub mod translate;
pub mod types;

use std::path::{Path, PathBuf};

use parser::{ProtoModel, parse_proto_file};
use thiserror::Error;

pub use batch::{convert_dir, convert_proto_file};
pub use buffer::LineBuffer;
pub use schema::{SchemaField, SchemaNode, SchemaValue};
pub use sink::{FileSink, OutputSink};
pub use translate::{convert, translate};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("parse error: {0}")]
    Parse(#[from] parser::ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("no output unit is open")]
    NoOpenUnit,
    #[error("not a proto file name: {}", .0.display())]
    InvalidFileName(PathBuf),
}

/// Generate CTO source lines from a .proto file path.
pub fn generate_cto_from_proto<P: AsRef<Path>>(
    proto_path: P,
) -> Result<Vec<String>, GenerateError> {
    let model = parse_proto_file(proto_path)?;
    Ok(generate_cto_from_model(&model))
}

/// Generate CTO source lines from a parsed ProtoModel.
pub fn generate_cto_from_model(model: &ProtoModel) -> Vec<String> {
    translate(&SchemaNode::from_model(model))
}
