//! Content scanning: turning a content tree into raw maps.
//!
//! Scanning is pure I/O and parsing. No merging beyond multi-document files
//! happens here.
//!
//! Extension layout:
//!
//! ```text
//! <root>/<kind>.<ext>                          base: key -> fields
//! <root>/abstracts/<kind>.<ext>                key -> fields
//! <root>/templates/<kind>.<ext>                key -> fields
//! <root>/instances/<name>/instance.<ext>       the instance's own fields
//! <root>/instances/<name>/areas/<kind>.<ext>   key -> fields
//! <root>/instances/<name>/rooms/<kind>.<ext>   key -> fields
//! <root>/instances/<name>/gateways/<kind>.<ext>
//! <root>/instances/<name>/exits/<room-kind>.<ext>   room -> destination -> fields
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mythos_core::extension::{Extension, RawInstance};
use mythos_core::value::{DataMap, KindMap, Value, type_name};

use crate::loader::{DataLoadError, detect_format, parse_merged};
use crate::source::ContentSource;

pub const ABSTRACTS_DIR: &str = "abstracts";
pub const TEMPLATES_DIR: &str = "templates";
pub const INSTANCES_DIR: &str = "instances";

const INSTANCE_FILE: &str = "instance";
const AREAS_DIR: &str = "areas";
const ROOMS_DIR: &str = "rooms";
const GATEWAYS_DIR: &str = "gateways";
const EXITS_DIR: &str = "exits";

/// Scan a single directory: lower-cased file stem -> merged mapping.
///
/// Files in unsupported formats are skipped. Two supported files sharing a
/// stem are a [`DataLoadError::DuplicateStem`] error.
pub fn scan(
    source: &dyn ContentSource,
    extension: &str,
    dir: &Path,
) -> Result<BTreeMap<String, DataMap>, DataLoadError> {
    let files = source.list_files(dir).map_err(|e| read_error(extension, dir, e))?;

    let mut by_stem: BTreeMap<String, PathBuf> = BTreeMap::new();
    for file in files {
        let format_ok = detect_format(&file).is_ok();
        let stem = file.file_stem().map(|s| s.to_string_lossy().to_lowercase());
        let Some(stem) = stem.filter(|_| format_ok) else {
            log::warn!(
                "skipping non-data file {} in extension '{extension}'",
                file.display()
            );
            continue;
        };
        if let Some(existing) = by_stem.get(&stem) {
            return Err(DataLoadError::DuplicateStem {
                extension: extension.to_string(),
                stem,
                a: existing.clone(),
                b: file,
            });
        }
        by_stem.insert(stem, file);
    }

    let mut out = BTreeMap::new();
    for (stem, file) in by_stem {
        let format = detect_format(&file)?;
        let content = source
            .read(&file)
            .map_err(|e| read_error(extension, &file, e))?;
        let data = parse_merged(format, &content).map_err(|detail| DataLoadError::Parse {
            extension: extension.to_string(),
            file: file.clone(),
            detail,
        })?;
        log::debug!(
            "scanned {} ({} entries) in extension '{extension}'",
            file.display(),
            data.len()
        );
        out.insert(stem, data);
    }
    Ok(out)
}

/// Apply [`scan`] to every immediate subdirectory of `dir`.
pub fn scan_folders(
    source: &dyn ContentSource,
    extension: &str,
    dir: &Path,
) -> Result<BTreeMap<String, BTreeMap<String, DataMap>>, DataLoadError> {
    let folders = source
        .list_folders(dir)
        .map_err(|e| read_error(extension, dir, e))?;
    let mut out = BTreeMap::new();
    for folder in folders {
        let scanned = scan(source, extension, &dir.join(&folder))?;
        out.insert(folder, scanned);
    }
    Ok(out)
}

/// Scan a directory whose files are kinds and whose top-level entries are
/// keyed definitions: kind -> key -> fields.
pub fn scan_kinds(
    source: &dyn ContentSource,
    extension: &str,
    dir: &Path,
) -> Result<KindMap<DataMap>, DataLoadError> {
    let mut out = KindMap::new();
    for (kind, data) in scan(source, extension, dir)? {
        let file = dir.join(&kind);
        out.insert(kind, entries_of(extension, &file, data)?);
    }
    Ok(out)
}

/// Scan one instance folder.
pub fn scan_instance(
    source: &dyn ContentSource,
    extension: &str,
    dir: &Path,
) -> Result<RawInstance, DataLoadError> {
    let mut top = scan(source, extension, dir)?;
    let fields = top.remove(INSTANCE_FILE).unwrap_or_default();
    for stray in top.keys() {
        log::warn!(
            "ignoring file '{stray}' in instance folder {} of extension '{extension}'",
            dir.display()
        );
    }

    let mut exits = KindMap::new();
    for (room_kind, data) in scan(source, extension, &dir.join(EXITS_DIR))? {
        let file = dir.join(EXITS_DIR).join(&room_kind);
        let mut by_room = BTreeMap::new();
        for (room, destinations) in data {
            let destinations = as_map(extension, &file, &room, destinations)?;
            by_room.insert(room, entries_of(extension, &file, destinations)?);
        }
        exits.insert(room_kind, by_room);
    }

    Ok(RawInstance {
        fields,
        areas: scan_kinds(source, extension, &dir.join(AREAS_DIR))?,
        rooms: scan_kinds(source, extension, &dir.join(ROOMS_DIR))?,
        gateways: scan_kinds(source, extension, &dir.join(GATEWAYS_DIR))?,
        exits,
    })
}

// ===========================================================================
// Extension stages
// ===========================================================================

/// Fill `extension.raw.abstracts` from `abstracts/`.
pub fn scan_abstracts(
    extension: &mut Extension,
    source: &dyn ContentSource,
) -> Result<(), DataLoadError> {
    let abstracts = scan_kinds(source, extension.name(), Path::new(ABSTRACTS_DIR))?;
    extension.raw_mut().abstracts = abstracts;
    Ok(())
}

/// Fill `extension.raw.base` from the files at the extension root.
pub fn scan_base(
    extension: &mut Extension,
    source: &dyn ContentSource,
) -> Result<(), DataLoadError> {
    let base = scan_kinds(source, extension.name(), Path::new(""))?;
    extension.raw_mut().base = base;
    Ok(())
}

/// Fill `extension.raw.templates` from `templates/`.
pub fn scan_templates(
    extension: &mut Extension,
    source: &dyn ContentSource,
) -> Result<(), DataLoadError> {
    let templates = scan_kinds(source, extension.name(), Path::new(TEMPLATES_DIR))?;
    extension.raw_mut().templates = templates;
    Ok(())
}

/// Fill `extension.raw.instances` from `instances/<name>/`.
pub fn scan_instances(
    extension: &mut Extension,
    source: &dyn ContentSource,
) -> Result<(), DataLoadError> {
    let root = Path::new(INSTANCES_DIR);
    let names = source
        .list_folders(root)
        .map_err(|e| read_error(extension.name(), root, e))?;
    let mut instances = BTreeMap::new();
    for name in names {
        let raw = scan_instance(source, extension.name(), &root.join(&name))?;
        instances.insert(name, raw);
    }
    extension.raw_mut().instances = instances;
    Ok(())
}

/// Scan an entire extension in one go.
pub fn scan_extension(name: &str, source: &dyn ContentSource) -> Result<Extension, DataLoadError> {
    let mut extension = Extension::new(name, source.describe());
    scan_abstracts(&mut extension, source)?;
    scan_base(&mut extension, source)?;
    scan_instances(&mut extension, source)?;
    scan_templates(&mut extension, source)?;
    log::debug!("{}", extension.summary());
    Ok(extension)
}

// ===========================================================================
// Helpers
// ===========================================================================

fn read_error(extension: &str, path: &Path, source: std::io::Error) -> DataLoadError {
    DataLoadError::Read {
        extension: extension.to_string(),
        file: path.to_path_buf(),
        source,
    }
}

fn as_map(extension: &str, file: &Path, key: &str, value: Value) -> Result<DataMap, DataLoadError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(DataMap::new()),
        other => Err(DataLoadError::Parse {
            extension: extension.to_string(),
            file: file.to_path_buf(),
            detail: format!("entry '{key}' is {}, expected a mapping", type_name(&other)),
        }),
    }
}

/// Interpret every top-level value of `data` as a definition mapping.
fn entries_of(
    extension: &str,
    file: &Path,
    data: DataMap,
) -> Result<BTreeMap<String, DataMap>, DataLoadError> {
    data.into_iter()
        .map(|(key, value)| {
            let fields = as_map(extension, file, &key, value)?;
            Ok((key, fields))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use mythos_core::test_utils::fields;
    use serde_json::json;

    fn source() -> MemorySource {
        MemorySource::new("core")
            .with_file("Items.toml", "[sword]\ndamage = 4\n")
            .with_file("README.md", "# not data")
            .with_file("abstracts/mobs.json", r#"{"guard": {"hp": 10}} {"archer": {"hp": 8}}"#)
            .with_file("templates/items.ron", r#"{"stick": {"damage": 1}}"#)
            .with_file("instances/keep/instance.json", r#"{"title": "The Keep"}"#)
            .with_file(
                "instances/keep/rooms/rooms.toml",
                "[gate]\nname = \"Gate\"\n[yard]\nname = \"Yard\"\n",
            )
            .with_file("instances/keep/areas/areas.toml", "[bailey]\n")
            .with_file(
                "instances/keep/exits/rooms.json",
                r#"{"gate": {"yard": {"noun": "archway"}}}"#,
            )
            .with_file("instances/keep/gateways/gateways.json", r#"{"road": null}"#)
    }

    #[test]
    fn scan_lowercases_stems_and_skips_non_data() {
        let scanned = scan(&source(), "core", Path::new("")).unwrap();
        assert_eq!(scanned.keys().collect::<Vec<_>>(), vec!["items"]);
    }

    #[test]
    fn scan_missing_dir_is_empty() {
        let scanned = scan(&source(), "core", Path::new("nowhere")).unwrap();
        assert!(scanned.is_empty());
    }

    #[test]
    fn scan_duplicate_stem_names_extension() {
        let src = source().with_file("items.json", "{}");
        let err = scan(&src, "core", Path::new("")).unwrap_err();
        match &err {
            DataLoadError::DuplicateStem { extension, stem, .. } => {
                assert_eq!(extension, "core");
                assert_eq!(stem, "items");
            }
            other => panic!("expected duplicate stem, got {other:?}"),
        }
        assert!(err.to_string().contains("extension 'core'"));
    }

    #[test]
    fn scan_parse_error_names_extension_and_file() {
        let src = source().with_file("abstracts/broken.ron", "{{{");
        let result = scan(&src, "core", Path::new(ABSTRACTS_DIR));
        match result {
            Err(DataLoadError::Parse { extension, file, .. }) => {
                assert_eq!(extension, "core");
                assert_eq!(file, PathBuf::from("abstracts/broken.ron"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn scan_folders_keys_by_folder() {
        let scanned = scan_folders(&source(), "core", Path::new(INSTANCES_DIR)).unwrap();
        assert_eq!(scanned.len(), 1);
        assert_eq!(
            scanned["keep"]["instance"],
            fields(json!({"title": "The Keep"}))
        );
    }

    #[test]
    fn scan_kinds_rejects_non_mapping_entries() {
        let src = source().with_file("abstracts/bad.json", r#"{"guard": 3}"#);
        let result = scan_kinds(&src, "core", Path::new(ABSTRACTS_DIR));
        assert!(matches!(
            result,
            Err(DataLoadError::Parse { ref detail, .. }) if detail.contains("guard")
        ));
    }

    #[test]
    fn scan_instance_reads_all_categories() {
        let raw = scan_instance(&source(), "core", Path::new("instances/keep")).unwrap();
        assert_eq!(raw.fields, fields(json!({"title": "The Keep"})));
        assert_eq!(raw.rooms["rooms"].len(), 2);
        assert_eq!(raw.areas["areas"]["bailey"], DataMap::new());
        assert_eq!(raw.gateways["gateways"]["road"], DataMap::new());
        assert_eq!(
            raw.exits["rooms"]["gate"]["yard"],
            fields(json!({"noun": "archway"}))
        );
    }

    #[test]
    fn scan_extension_fills_every_namespace() {
        let ext = scan_extension("core", &source()).unwrap();
        let raw = ext.raw();
        assert_eq!(raw.base["items"]["sword"], fields(json!({"damage": 4})));
        assert_eq!(raw.abstracts["mobs"].len(), 2);
        assert_eq!(raw.templates["items"]["stick"], fields(json!({"damage": 1})));
        assert!(raw.instances.contains_key("keep"));
        assert_eq!(ext.location(), "memory:core");
    }

    #[test]
    fn minimal_extension_scans_empty() {
        let src = MemorySource::new("tiny").with_file("items.ron", "{}");
        let ext = scan_extension("tiny", &src).unwrap();
        assert!(ext.raw().abstracts.is_empty());
        assert!(ext.raw().templates.is_empty());
        assert!(ext.raw().instances.is_empty());
    }
}
