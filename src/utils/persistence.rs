use std::{fs, path::Path};

use onboard_domain::FormValues;

use crate::{errors::OnboardError, forms::WizardSnapshot};

/// Writes the form values to disk atomically by staging to a temporary file.
pub fn save_values(values: &FormValues, path: &Path) -> Result<(), OnboardError> {
    write_json(&serde_json::to_string_pretty(values)?, path)
}

/// Loads a form value snapshot written by [`save_values`].
pub fn load_values(path: &Path) -> Result<FormValues, OnboardError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Persists a full wizard snapshot (phase, values, errors, touched).
pub fn save_snapshot(snapshot: &WizardSnapshot, path: &Path) -> Result<(), OnboardError> {
    write_json(&serde_json::to_string_pretty(snapshot)?, path)
}

pub fn load_snapshot(path: &Path) -> Result<WizardSnapshot, OnboardError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn write_json(json: &str, path: &Path) -> Result<(), OnboardError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    Ok(())
}
