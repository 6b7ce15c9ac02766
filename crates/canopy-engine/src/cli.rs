//! Command line arguments.

use std::path::PathBuf;

use canopy_config::ConfigSource;
use clap::Parser;

use crate::error::EngineError;

/// Validate a Canopy configuration, build its grid, and load its data.
#[derive(Debug, Parser)]
#[command(name = "canopy-engine", version)]
pub struct Args {
    /// Configuration files or folders of `.toml` files
    pub paths: Vec<PathBuf>,

    /// Inline TOML fragment, merged after the files (repeatable)
    #[arg(long = "cfg-string", value_name = "TOML")]
    pub cfg_strings: Vec<String>,

    /// Module schema as `module=path/to/schema.json` (repeatable)
    #[arg(long = "schema", value_name = "MODULE=PATH")]
    pub schemas: Vec<String>,

    /// Write the validated configuration to this TOML file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Export the grid as GeoJSON to this file
    #[arg(long)]
    pub grid_out: Option<PathBuf>,

    /// Decimal places kept in GeoJSON coordinates
    #[arg(long, default_value = "2")]
    pub grid_dp: u8,

    /// Precompute neighbours within this distance of each cell centroid
    #[arg(long)]
    pub neighbour_distance: Option<f64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Args {
    /// Configuration sources in merge order: paths, then inline fragments.
    pub fn sources(&self) -> Result<Vec<ConfigSource>, EngineError> {
        if self.paths.is_empty() && self.cfg_strings.is_empty() {
            return Err(EngineError::NoConfig);
        }
        let files = self.paths.iter().cloned().map(ConfigSource::Path);
        let inline = self
            .cfg_strings
            .iter()
            .enumerate()
            .map(|(i, text)| {
                ConfigSource::inline(format!("--cfg-string #{}", i + 1), text.clone())
            });
        Ok(files.chain(inline).collect())
    }

    /// Parsed `--schema` arguments as `(module, path)` pairs.
    pub fn schema_files(&self) -> Result<Vec<(String, PathBuf)>, EngineError> {
        self.schemas
            .iter()
            .map(|arg| match arg.split_once('=') {
                Some((module, path)) if !module.is_empty() && !path.is_empty() => {
                    Ok((module.to_owned(), PathBuf::from(path)))
                }
                _ => Err(EngineError::SchemaArg(arg.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn paths_then_inline_fragments() {
        let args = parse(&["canopy-engine", "a.toml", "cfg/", "--cfg-string", "x = 1"]);
        assert_eq!(
            args.sources().unwrap(),
            vec![
                ConfigSource::path("a.toml"),
                ConfigSource::path("cfg/"),
                ConfigSource::inline("--cfg-string #1", "x = 1"),
            ]
        );
    }

    #[test]
    fn nothing_to_read_is_an_error() {
        let args = parse(&["canopy-engine"]);
        assert!(matches!(args.sources(), Err(EngineError::NoConfig)));
    }

    #[test]
    fn schema_arguments_split_on_equals() {
        let args = parse(&[
            "canopy-engine",
            "--schema",
            "soil=schemas/soil.json",
            "--schema",
            "plants",
        ]);
        assert!(matches!(args.schema_files(), Err(EngineError::SchemaArg(ref a)) if a == "plants"));

        let args = parse(&["canopy-engine", "--schema", "soil=schemas/soil.json"]);
        assert_eq!(
            args.schema_files().unwrap(),
            vec![("soil".to_owned(), PathBuf::from("schemas/soil.json"))]
        );
    }

    #[test]
    fn defaults() {
        let args = parse(&["canopy-engine", "a.toml"]);
        assert_eq!(args.grid_dp, 2);
        assert!(args.neighbour_distance.is_none());
        assert!(!args.json_logs);
    }
}
