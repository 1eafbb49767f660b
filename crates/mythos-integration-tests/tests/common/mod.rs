//! Shared fixtures: content trees written into temp directories.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use mythos_core::test_utils::*;
use mythos_world::{ExtensionEntry, GameDataManager, WorldConfig};

/// Create an empty, unique temp directory for one test.
pub fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "mythos_integration_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

/// Write `content` to `dir/rel`, creating parent directories.
pub fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A config loading every folder under `dir/extensions`, with the standard
/// default classes.
pub fn config(dir: &Path) -> WorldConfig {
    let defaults = default_classes();
    WorldConfig {
        extensions_dir: Some("extensions".into()),
        default_classes: defaults.by_kind,
        fallback_class: defaults.fallback,
        base_dir: dir.to_path_buf(),
        ..Default::default()
    }
}

pub fn manager(dir: &Path) -> GameDataManager {
    GameDataManager::new(config(dir), RecordingResolver::accepting_all())
}

pub fn manager_rejecting(dir: &Path, needle: &str) -> GameDataManager {
    GameDataManager::new(config(dir), RecordingResolver::rejecting(needle))
}

pub fn entry(name: &str, path: &str) -> ExtensionEntry {
    ExtensionEntry {
        name: name.into(),
        path: path.into(),
    }
}

/// A two-extension world: `core` with a small keep, `addon` inheriting
/// from `core`.
pub fn write_keep_world(dir: &Path) {
    write(
        dir,
        "extensions/core/abstracts/rooms.ron",
        r#"{
            "room": {"lit": false, "size": 1},
            "hall": {"parents": ["room"], "size": 4},
            "bright": {"lit": true},
            "great_hall": {"parents": ["hall", "bright"], "name": "Great Hall"},
        }"#,
    );
    write(
        dir,
        "extensions/core/abstracts/mobs.toml",
        "[mob]\nhp = 5\nhostile = false\n---\n[rat]\nparents = \"mob\"\nhostile = true\n",
    );
    write(
        dir,
        "extensions/core/items.json",
        r#"{"torch": {"light": 3}} {"rope": {"length": 10}}"#,
    );
    write(
        dir,
        "extensions/core/instances/keep/instance.toml",
        "title = \"The Keep\"\n",
    );
    write(
        dir,
        "extensions/core/instances/keep/rooms/rooms.json",
        r#"{
            "gate": {"abstract": "room"},
            "throne": {"abstract": "great_hall", "size": 9},
            "cellar": {"abstract": "room"}
        }"#,
    );
    write(
        dir,
        "extensions/core/instances/keep/exits/rooms.json",
        r#"{"gate": {"throne": {"noun": "doors"}}, "throne": {"gate": {}}}"#,
    );
    write(
        dir,
        "extensions/core/instances/keep/areas/areas.toml",
        "[bailey]\nname = \"Bailey\"\n",
    );
    write(
        dir,
        "extensions/core/templates/mobs.json",
        r#"{"sewer_rat": {"abstract": "rat", "hp": 3}}"#,
    );

    write(
        dir,
        "extensions/addon/abstracts/mobs.json",
        r#"{"giant_rat": {"parents": ["core/mobs/rat"], "hp": 50}}"#,
    );
    write(
        dir,
        "extensions/addon/templates/mobs.json",
        r#"{"king_rat": {"abstract": "giant_rat", "class": "addon.mobs.KingRat"}}"#,
    );
    write(dir, "extensions/addon/README.md", "not content");
}
