//! Golden-file JSON snapshots.
//!
//! Values are stored as pretty JSON with object keys sorted, so snapshots
//! only change when the observed state does. Set `PANE3D_UPDATE_SNAPSHOTS=1`
//! to write the current values instead of comparing.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that switches snapshots to write mode.
pub const UPDATE_SNAPSHOTS_ENV: &str = "PANE3D_UPDATE_SNAPSHOTS";

/// Path of snapshot `name` under `<manifest_dir>/tests/snapshots`.
pub fn snapshot_path(manifest_dir: impl AsRef<Path>, name: &str) -> PathBuf {
    manifest_dir
        .as_ref()
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.json"))
}

/// Compare `value` against the snapshot at `path`.
pub fn assert_json_snapshot<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = to_canonical_json(value)?;

    if update_requested() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        return fs::write(path, &actual)
            .with_context(|| format!("Failed to write snapshot {}", path.display()));
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {UPDATE_SNAPSHOTS_ENV}=1 to create it)",
            path.display()
        )
    })?;

    match first_difference(&expected, &actual) {
        None => Ok(()),
        Some((line, want, got)) => anyhow::bail!(
            "Snapshot {} differs at line {line}:\n  expected: {want}\n  actual:   {got}\n(run with {UPDATE_SNAPSHOTS_ENV}=1 to update)",
            path.display()
        ),
    }
}

fn update_requested() -> bool {
    std::env::var(UPDATE_SNAPSHOTS_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Pretty JSON with sorted keys and a trailing newline.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let mut out = serde_json::to_string_pretty(&sort_keys(value))
        .context("Failed to format snapshot JSON")?;
    out.push('\n');
    Ok(out)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// 1-based line number and contents of the first differing line.
fn first_difference(expected: &str, actual: &str) -> Option<(usize, String, String)> {
    if expected == actual {
        return None;
    }
    let mut want = expected.lines();
    let mut got = actual.lines();
    let mut line = 1;
    loop {
        match (want.next(), got.next()) {
            (Some(a), Some(b)) if a == b => line += 1,
            (a, b) => {
                return Some((
                    line,
                    a.unwrap_or("<end of file>").to_string(),
                    b.unwrap_or("<end of file>").to_string(),
                ))
            }
        }
    }
}
