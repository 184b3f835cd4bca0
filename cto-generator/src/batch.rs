//! Converts whole directories of .proto files, one .cto file per input.

use std::path::{Path, PathBuf};

use parser::parse_proto_file;
use tracing::info;
use walkdir::WalkDir;

use crate::GenerateError;
use crate::schema::SchemaNode;
use crate::sink::FileSink;
use crate::translate::convert;

pub const PROTO_EXTENSION: &str = "proto";
pub const CTO_EXTENSION: &str = "cto";

/// `orders.proto` -> `orders.cto`
pub fn output_unit_name(proto: &Path) -> Result<String, GenerateError> {
    let stem = proto
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GenerateError::InvalidFileName(proto.to_path_buf()))?;
    Ok(format!("{stem}.{CTO_EXTENSION}"))
}

/// Converts one .proto file into `<output_dir>/<stem>.cto` and returns that path.
pub fn convert_proto_file(proto: &Path, output_dir: &Path) -> Result<PathBuf, GenerateError> {
    info!(file = %proto.display(), "parsing");
    let model = parse_proto_file(proto)?;
    let unit = output_unit_name(proto)?;

    let mut sink = FileSink::new(output_dir);
    convert(&SchemaNode::from_model(&model), &mut sink, &unit)?;

    let generated = output_dir.join(&unit);
    info!(file = %generated.display(), "generated");
    Ok(generated)
}

/// All .proto files below `input_dir`, sorted by path.
pub fn find_proto_files(input_dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry?;
        let is_proto = entry.path().extension().and_then(|e| e.to_str()) == Some(PROTO_EXTENSION);
        if entry.file_type().is_file() && is_proto {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Converts every .proto file below `input_dir` into `output_dir`. Stops at the first failure.
pub fn convert_dir(input_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let files = find_proto_files(input_dir)?;
    info!(count = files.len(), dir = %input_dir.display(), "found proto files");

    files
        .iter()
        .map(|proto| convert_proto_file(proto, output_dir))
        .collect()
}
