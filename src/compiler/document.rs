//! Which files are worth compiling on their own.

use std::path::Path;

use crate::config::CompilerConfig;
use crate::errors::{Result, SasswatchError};

/// `.scss` or `.sass`, case-insensitive.
pub fn is_sass(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("scss") || ext.eq_ignore_ascii_case("sass"))
        .unwrap_or(false)
}

/// Partials start with `_`. A path without a file name counts as one.
pub fn starts_with_underscore(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if !name.is_empty() => name.starts_with('_'),
        _ => true,
    }
}

/// Reject files that should not be compiled standalone.
pub fn validate_document(path: &Path, config: &CompilerConfig) -> Result<()> {
    if path.file_name().is_none() {
        return Err(SasswatchError::InvalidDocument(format!(
            "{} has no file name",
            path.display()
        )));
    }
    if !is_sass(path) {
        return Err(SasswatchError::InvalidDocument(format!(
            "{} is not a .scss or .sass file",
            path.display()
        )));
    }
    if !config.output.enable_start_with_underscores && starts_with_underscore(path) {
        return Err(SasswatchError::InvalidDocument(format!(
            "{} is a partial; set [output].enable_start_with_underscores to compile it",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sass_extensions() {
        assert!(is_sass(Path::new("a/main.scss")));
        assert!(is_sass(Path::new("a/main.SASS")));
        assert!(!is_sass(Path::new("a/main.css")));
        assert!(!is_sass(Path::new("a/scss")));
    }

    #[test]
    fn partials_are_skipped_unless_enabled() {
        let mut cfg = CompilerConfig::default();
        let partial = Path::new("src/_vars.scss");
        assert!(validate_document(partial, &cfg).is_err());

        cfg.output.enable_start_with_underscores = true;
        assert!(validate_document(partial, &cfg).is_ok());
    }

    #[test]
    fn plain_stylesheet_is_valid() {
        let cfg = CompilerConfig::default();
        assert!(validate_document(Path::new("src/main.scss"), &cfg).is_ok());
        assert!(validate_document(Path::new("src/main.css"), &cfg).is_err());
    }
}
