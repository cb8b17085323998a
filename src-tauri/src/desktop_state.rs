use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};

pub(crate) const LOCALE_FIELD: &str = "locale";
pub(crate) const HOTKEY_FIELD: &str = "hotkey";

fn empty_state_object() -> Value {
    Value::Object(Map::new())
}

pub(crate) fn desktop_state_path(root_dir: &Path) -> PathBuf {
    root_dir.join("data").join("desktop_state.json")
}

pub(crate) fn read_state_field(state_path: &Path, field: &str) -> Option<String> {
    let raw = fs::read_to_string(state_path).ok()?;
    let parsed: Value = serde_json::from_str(&raw).ok()?;
    let value = parsed.get(field)?.as_str()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = empty_state_object();
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just normalized into a JSON object"),
    }
}

/// Sets or clears one string field, keeping every other field of the file.
/// An unreadable or non-object file is reset rather than failing the write.
pub(crate) fn write_state_field<L>(
    state_path: &Path,
    field: &str,
    value: Option<&str>,
    log: L,
) -> Result<(), String>
where
    L: Fn(&str),
{
    if let Some(parent_dir) = state_path.parent() {
        fs::create_dir_all(parent_dir).map_err(|error| {
            format!(
                "Failed to create desktop state directory {}: {}",
                parent_dir.display(),
                error
            )
        })?;
    }

    let mut parsed = match fs::read_to_string(state_path) {
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(error) => {
                log(&format!(
                    "failed to parse desktop state {}: {}. resetting state file",
                    state_path.display(),
                    error
                ));
                empty_state_object()
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => empty_state_object(),
        Err(error) => {
            return Err(format!(
                "Failed to read desktop state {}: {}",
                state_path.display(),
                error
            ));
        }
    };
    if !parsed.is_object() {
        log(&format!(
            "desktop state {} has non-object root; resetting state file",
            state_path.display()
        ));
    }
    let object = ensure_object(&mut parsed);

    match value {
        Some(value) => {
            object.insert(field.to_string(), Value::String(value.to_string()));
        }
        None => {
            object.remove(field);
        }
    }

    let serialized = serde_json::to_string_pretty(&parsed)
        .map_err(|error| format!("Failed to serialize desktop state: {error}"))?;
    fs::write(state_path, serialized).map_err(|error| {
        format!(
            "Failed to write desktop state {}: {}",
            state_path.display(),
            error
        )
    })
}
