//! Parsing configuration fragments from TOML.

use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::debug;

use crate::discover::{ConfigSource, collect_files};
use crate::error::ConfigError;

/// One parsed configuration fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// File name or inline label, used in error messages.
    pub label: String,
    /// The parsed top-level table.
    pub tree: Map<String, Value>,
}

/// Parse a single TOML document.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] with the parser's message if `text` is
/// not valid TOML.
pub fn parse_fragment(label: &str, text: &str) -> Result<Fragment, ConfigError> {
    let tree: Map<String, Value> = toml::from_str(text).map_err(|e| {
        ConfigError::Parse {
            label: label.to_owned(),
            message: e.message().trim_end().to_owned(),
        }
        .logged()
    })?;
    debug!(label, keys = tree.len(), "Parsed configuration fragment");
    Ok(Fragment {
        label: label.to_owned(),
        tree,
    })
}

/// Read and parse each file in `files`, in order.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] for the first
/// file that cannot be loaded.
pub fn load_in_config_files(files: &[PathBuf]) -> Result<Vec<Fragment>, ConfigError> {
    files
        .iter()
        .map(|file| {
            let text =
                std::fs::read_to_string(file).map_err(|e| ConfigError::read(file, e).logged())?;
            parse_fragment(&file.display().to_string(), &text)
        })
        .collect()
}

/// Resolve every source into parsed fragments.
///
/// Path sources are expanded and validated together first, then inline
/// sources follow in the order given.
///
/// # Errors
///
/// Propagates discovery, read, and parse failures.
pub fn load_sources(sources: &[ConfigSource]) -> Result<Vec<Fragment>, ConfigError> {
    let paths: Vec<PathBuf> = sources
        .iter()
        .filter_map(|s| match s {
            ConfigSource::Path(p) => Some(p.clone()),
            ConfigSource::Inline { .. } => None,
        })
        .collect();

    let mut fragments = if paths.is_empty() {
        Vec::new()
    } else {
        load_in_config_files(&collect_files(&paths)?)?
    };
    for source in sources {
        if let ConfigSource::Inline { label, text } = source {
            fragments.push(parse_fragment(label, text)?);
        }
    }
    Ok(fragments)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tables_become_nested_objects() {
        let fragment = parse_fragment("inline", "[core.grid]\ncell_nx = 4\n");
        let tree = Value::Object(fragment.unwrap().tree);
        assert_eq!(tree.pointer("/core/grid/cell_nx"), Some(&Value::from(4)));
    }

    #[test]
    fn malformed_toml_names_the_fragment() {
        let message = parse_fragment("fake_file1.toml", "[core\nnx = 1")
            .unwrap_err()
            .to_string();
        assert!(message.starts_with(
            "Configuration file fake_file1.toml is incorrectly formatted. \
             Failed with the following message:\n"
        ));
    }

    #[test]
    fn inline_sources_follow_files() {
        let sources = [
            ConfigSource::inline("first", "a = 1"),
            ConfigSource::inline("second", "b = 2"),
        ];
        let labels: Vec<String> = load_sources(&sources)
            .unwrap()
            .into_iter()
            .map(|f| f.label)
            .collect();
        assert_eq!(labels, vec!["first".to_owned(), "second".to_owned()]);
    }
}
