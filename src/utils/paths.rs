use std::borrow::Cow;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

// URL-safe, unpadded on output, padding tolerated on input
const ID_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes an absolute path (or any string) into an opaque, URL-safe identifier
///
/// # Examples
///
/// ```
/// use agent_history_search::encode_id;
///
/// assert_eq!(encode_id("/Users/foo/bar"), "L1VzZXJzL2Zvby9iYXI");
/// ```
pub fn encode_id(raw: &str) -> String {
    ID_ENGINE.encode(raw.as_bytes())
}

/// Decodes an identifier produced by [`encode_id`]
///
/// # Errors
///
/// Returns an error if the identifier is not base64url or does not decode to UTF-8.
pub fn decode_id(id: &str) -> Result<String> {
    let bytes = ID_ENGINE.decode(id).with_context(|| format!("Invalid identifier: {}", id))?;
    String::from_utf8(bytes).with_context(|| format!("Identifier is not valid UTF-8: {}", id))
}

/// Decodes an identifier into a filesystem path and validates it
///
/// # Errors
///
/// Returns an error if decoding fails, the path contains traversal sequences, or is not absolute.
pub fn decode_path_id(id: &str) -> Result<PathBuf> {
    let path = PathBuf::from(decode_id(id)?);
    validate_decoded_path(&path)?;
    Ok(path)
}

/// Converts a Claude Code project directory name back to a path
///
/// Lossy: hyphens that were part of the original path also become slashes.
///
/// # Examples
///
/// ```
/// use agent_history_search::dir_name_to_project_path;
///
/// assert_eq!(dir_name_to_project_path("-Users-foo-bar"), "/Users/foo/bar");
/// ```
pub fn dir_name_to_project_path(dir_name: &str) -> String {
    dir_name.replace('-', "/")
}

/// Converts a project path into the directory name Claude Code stores it under
pub fn project_path_to_dir_name(project_path: &str) -> String {
    trim_trailing_slash(project_path).replace('/', "-")
}

/// Strips a single trailing `/`
pub fn trim_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Last path component of a workspace path
pub fn workspace_name(workspace_path: &str) -> String {
    Path::new(trim_trailing_slash(workspace_path))
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| workspace_path.to_string())
}

/// Validates that a decoded path is safe and doesn't contain path traversal sequences
///
/// # Errors
///
/// Returns an error if:
/// - The path contains '..' components (path traversal)
/// - The path is not absolute
pub fn validate_decoded_path(path: &Path) -> Result<()> {
    for component in path.components() {
        if component == std::path::Component::ParentDir {
            bail!("Path contains '..' component: {}", path.display());
        }
    }

    if !path.is_absolute() {
        bail!("Path must be absolute: {}", path.display());
    }

    Ok(())
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use agent_history_search::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/Documents");
/// // Returns "~/Documents" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
