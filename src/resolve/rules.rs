//! Static fallback rules for individual build systems

use crate::detection::signals::{MAKEFILE, PACKAGE_MANIFEST};
use crate::detection::DetectionWarning;
use crate::fs::FileSystem;
use regex::Regex;
use std::path::Path;
use tracing::warn;

/// package.json scripts tried in order
pub const SCRIPT_PREFERENCE: &[&str] = &["start", "dev", "serve"];

/// Makefile targets tried in order
pub const MAKE_TARGETS: &[&str] = &["run", "start", "serve"];

const NPM_DEFAULT_START: &str = "npm start";
const MAKE_DEFAULT: &str = "make";

/// Python entry points tried in order, before falling back to any script
const PYTHON_ENTRY_POINTS: &[(&str, &str)] = &[
    ("app.py", "python app.py"),
    ("main.py", "python main.py"),
    ("manage.py", "python manage.py runserver 0.0.0.0:5000"),
];

const PYTHON_SCRIPT_EXTENSION: &str = ".py";

/// Picks the npm invocation from package.json text
///
/// ```
/// use clonerun::resolve::package_script_command;
///
/// let manifest = r#"{"scripts": {"serve": "vite preview", "dev": "vite"}}"#;
/// assert_eq!(package_script_command(manifest).unwrap(), "npm run dev");
/// assert_eq!(package_script_command("{}").unwrap(), "npm start");
/// ```
pub fn package_script_command(manifest: &str) -> Result<String, serde_json::Error> {
    let package: serde_json::Value = serde_json::from_str(manifest)?;

    let chosen = package
        .get("scripts")
        .and_then(|scripts| scripts.as_object())
        .and_then(|scripts| {
            SCRIPT_PREFERENCE
                .iter()
                .find(|name| scripts.contains_key(**name))
        });

    Ok(match chosen {
        Some(name) => format!("npm run {}", name),
        None => NPM_DEFAULT_START.to_string(),
    })
}

pub(super) fn package_json_command(
    fs: &dyn FileSystem,
    repo_path: &Path,
    warnings: &mut Vec<DetectionWarning>,
) -> String {
    let path = repo_path.join(PACKAGE_MANIFEST);
    let parsed = fs
        .read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| package_script_command(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(command) => command,
        Err(reason) => {
            warn!(file = PACKAGE_MANIFEST, error = %reason, "Failed to read package scripts, using default start");
            warnings.push(DetectionWarning::ManifestParse {
                file: PACKAGE_MANIFEST.to_string(),
                reason,
            });
            NPM_DEFAULT_START.to_string()
        }
    }
}

/// Python launch command for a top-level listing, if it has any script
pub fn python_entry_command(files: &[String]) -> Option<String> {
    let has = |name: &str| files.iter().any(|f| f == name);

    if let Some((_, command)) = PYTHON_ENTRY_POINTS.iter().find(|(file, _)| has(file)) {
        return Some(command.to_string());
    }

    files
        .iter()
        .find(|f| f.ends_with(PYTHON_SCRIPT_EXTENSION) && f.len() > PYTHON_SCRIPT_EXTENSION.len())
        .map(|script| format!("python {}", script))
}

/// Explicit target names declared at the start of a line
///
/// Variable assignments (`CC := gcc`) and recipe lines are ignored.
pub fn makefile_targets(text: &str) -> Vec<String> {
    let target_re = Regex::new(r"(?m)^([A-Za-z0-9_.\-][A-Za-z0-9_.\- \t]*?)[ \t]*::?(?:[^=]|$)")
        .expect("valid regex");

    target_re
        .captures_iter(text)
        .flat_map(|caps| {
            caps[1]
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

pub(super) fn makefile_command(
    fs: &dyn FileSystem,
    repo_path: &Path,
    warnings: &mut Vec<DetectionWarning>,
) -> String {
    let text = match fs.read_to_string(&repo_path.join(MAKEFILE)) {
        Ok(text) => text,
        Err(e) => {
            warn!(file = MAKEFILE, error = %e, "Failed to read Makefile, using bare make");
            warnings.push(DetectionWarning::ManifestParse {
                file: MAKEFILE.to_string(),
                reason: e.to_string(),
            });
            return MAKE_DEFAULT.to_string();
        }
    };

    let targets = makefile_targets(&text);
    MAKE_TARGETS
        .iter()
        .find(|target| targets.iter().any(|t| t == *target))
        .map(|target| format!("make {}", target))
        .unwrap_or_else(|| MAKE_DEFAULT.to_string())
}
