//! Configuration utility functions.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/notes/wiki-pages/physics/  ← cwd
/// /home/user/notes/wiki.toml            ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    // First check if config_name is an absolute path or exists in cwd
    if config_name.is_absolute() && config_name.exists() {
        return Some(config_name.to_path_buf());
    }

    // Walk up from cwd looking for config file
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Resolve a configured path against the config directory.
///
/// `~` is expanded first; absolute results are kept as-is.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded: Cow<'_, str> = shellexpand::tilde(&raw);
    let expanded = Path::new(expanded.as_ref());
    if expanded.is_absolute() {
        expanded.to_path_buf()
    } else {
        base.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_path(Path::new("pages"), Path::new("/srv/wiki")),
            PathBuf::from("/srv/wiki/pages")
        );
    }

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(
            resolve_path(Path::new("/var/pages"), Path::new("/srv/wiki")),
            PathBuf::from("/var/pages")
        );
    }

    #[test]
    fn test_resolve_tilde() {
        let resolved = resolve_path(Path::new("~/pages"), Path::new("/srv/wiki"));
        assert!(!resolved.to_string_lossy().contains('~') || std::env::var("HOME").is_err());
    }
}
