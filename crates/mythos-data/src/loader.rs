//! Format detection, file discovery, and document parsing.
//!
//! Content and config files may be RON, TOML, or JSON. A content file may
//! hold several documents: JSON files are a stream of concatenated values,
//! RON and TOML files separate documents with a line containing only `---`.
//! Documents are merged top-level, later documents winning.

use mythos_core::value::{DataMap, Value, overlay, type_name};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while reading content or config files.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// Two content files in one folder share a stem, e.g. `mobs.json` and
    /// `mobs.ron`.
    #[error("extension '{extension}' has two files for '{stem}': {a} and {b}")]
    DuplicateStem {
        extension: String,
        stem: String,
        a: PathBuf,
        b: PathBuf,
    },

    /// A file could not be parsed, or parsed into the wrong shape.
    #[error("parse error in extension '{extension}', file {file}: {detail}")]
    Parse {
        extension: String,
        file: PathBuf,
        detail: String,
    },

    /// A file could not be read from its content source.
    #[error("failed to read {file} in extension '{extension}': {source}")]
    Read {
        extension: String,
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const EXTENSIONS: [&'static str; 3] = ["ron", "toml", "json"];
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in &Format::EXTENSIONS {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a single-document file from disk and deserialize it according to
/// its format. Used for configuration, not content.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let parse_err = |detail: String| DataLoadError::Parse {
        extension: String::new(),
        file: path.to_path_buf(),
        detail,
    };

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Split RON/TOML text on `---` separator lines. Blank chunks are dropped.
fn split_documents(content: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current = String::new();
    for line in content.lines() {
        if line.trim_end() == "---" {
            documents.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    documents.push(current);
    documents.retain(|doc| !doc.trim().is_empty());
    documents
}

/// Parse every document in `content`. Errors carry only the detail; callers
/// attach file context.
pub fn parse_documents(format: Format, content: &str) -> Result<Vec<Value>, String> {
    match format {
        Format::Json => serde_json::Deserializer::from_str(content)
            .into_iter::<Value>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string()),
        Format::Ron => split_documents(content)
            .iter()
            .map(|doc| ron::from_str::<Value>(doc).map_err(|e| e.to_string()))
            .collect(),
        Format::Toml => split_documents(content)
            .iter()
            .map(|doc| toml::from_str::<Value>(doc).map_err(|e| e.to_string()))
            .collect(),
    }
}

/// Parse `content` and merge its documents into one mapping. An empty file
/// yields an empty mapping.
pub fn parse_merged(format: Format, content: &str) -> Result<DataMap, String> {
    let mut merged = DataMap::new();
    for (index, document) in parse_documents(format, content)?.into_iter().enumerate() {
        match document {
            Value::Object(map) => overlay(&mut merged, &map),
            Value::Null => {}
            other => {
                return Err(format!(
                    "document {} is {}, expected a mapping",
                    index + 1,
                    type_name(&other)
                ));
            }
        }
    }
    Ok(merged)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mythos_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_known_extensions() {
        assert_eq!(detect_format(Path::new("mobs.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("mobs.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("mobs.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["mobs.yaml", "mobs"] {
            assert!(matches!(
                detect_format(Path::new(name)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // find_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found() {
        let dir = make_test_dir("find_found");
        fs::write(dir.join("world.toml"), "").unwrap();

        let result = find_data_file(&dir, "world").unwrap();
        assert_eq!(result, Some(dir.join("world.toml")));

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_missing() {
        let dir = make_test_dir("find_missing");
        assert_eq!(find_data_file(&dir, "world").unwrap(), None);
        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("world.ron"), "()").unwrap();
        fs::write(dir.join("world.json"), "{}").unwrap();

        let result = find_data_file(&dir, "world");
        assert!(matches!(
            result,
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    #[test]
    fn json_stream_documents_merge_later_wins() {
        let merged = parse_merged(Format::Json, r#"{"a": 1, "b": 1} {"b": 2}"#).unwrap();
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn toml_documents_split_on_separator() {
        let text = "[guard]\nhp = 10\n---\n[guard]\nhp = 12\n[archer]\nhp = 8\n";
        let docs = parse_documents(Format::Toml, text).unwrap();
        assert_eq!(docs.len(), 2);
        let merged = parse_merged(Format::Toml, text).unwrap();
        assert_eq!(
            Value::Object(merged),
            json!({"guard": {"hp": 12}, "archer": {"hp": 8}})
        );
    }

    #[test]
    fn ron_map_documents() {
        let text = "{\"guard\": {\"hp\": 10}}\n---\n{\"archer\": {\"hp\": 8}}\n";
        let merged = parse_merged(Format::Ron, text).unwrap();
        assert_eq!(
            Value::Object(merged),
            json!({"guard": {"hp": 10}, "archer": {"hp": 8}})
        );
    }

    #[test]
    fn empty_content_is_empty_mapping() {
        for format in [Format::Ron, Format::Toml, Format::Json] {
            assert!(parse_merged(format, "").unwrap().is_empty());
        }
        for format in [Format::Ron, Format::Toml] {
            assert!(parse_merged(format, "\n---\n\n").unwrap().is_empty());
        }
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let err = parse_merged(Format::Json, "[1, 2]").unwrap_err();
        assert!(err.contains("a list"));
    }

    #[test]
    fn invalid_document_is_rejected() {
        assert!(parse_merged(Format::Ron, "this is not valid RON {{{").is_err());
        assert!(parse_merged(Format::Toml, "= broken").is_err());
        assert!(parse_merged(Format::Json, "{\"a\": }").is_err());
    }

    // -----------------------------------------------------------------------
    // deserialize_file
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_file_parse_error_names_file() {
        let dir = make_test_dir("deser_parse_err");
        let path = dir.join("bad.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<DataMap, _> = deserialize_file(&path);
        match result {
            Err(e @ DataLoadError::Parse { .. }) => assert!(format!("{e}").contains("bad.ron")),
            other => panic!("expected parse error, got {other:?}"),
        }

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Error display messages
    // -----------------------------------------------------------------------

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::ConflictingFormats {
            a: PathBuf::from("mobs.ron"),
            b: PathBuf::from("mobs.json"),
        };
        let msg = format!("{e}");
        assert!(msg.contains("mobs.ron"));
        assert!(msg.contains("mobs.json"));

        let e = DataLoadError::DuplicateStem {
            extension: "forest".to_string(),
            stem: "mobs".to_string(),
            a: PathBuf::from("abstracts/mobs.json"),
            b: PathBuf::from("abstracts/mobs.ron"),
        };
        let msg = format!("{e}");
        assert!(msg.contains("extension 'forest'"));
        assert!(msg.contains("abstracts/mobs.ron"));

        let e = DataLoadError::Parse {
            extension: "core".to_string(),
            file: PathBuf::from("abstracts/mobs.ron"),
            detail: "syntax error".to_string(),
        };
        let msg = format!("{e}");
        assert!(msg.contains("core"));
        assert!(msg.contains("abstracts/mobs.ron"));
        assert!(msg.contains("syntax error"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
        assert!(format!("{data_err}").contains("file not found"));
    }
}
