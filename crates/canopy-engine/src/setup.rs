//! The setup sequence.
//!
//! 1. Register module schemas given on the command line
//! 2. Merge and validate the configuration (optionally saving it)
//! 3. Build the grid from `core.grid`
//! 4. Precompute neighbours and export GeoJSON if asked
//! 5. Load every `core.data` variable into the data store

use canopy_config::{SchemaRegistry, validate_config};
use canopy_data::{AxisRegistry, DataStore, LoaderRegistry};
use canopy_grid::Grid;
use tracing::info;

use crate::cli::Args;
use crate::error::EngineError;

/// What a successful setup produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupSummary {
    /// Display form of the grid.
    pub grid: String,
    /// Number of grid cells.
    pub n_cells: usize,
    /// Configured modules besides `core`.
    pub modules: Vec<String>,
    /// Variables held by the data store, sorted.
    pub variables: Vec<String>,
}

/// Build a schema registry holding `core` and every `--schema` module.
pub fn schema_registry(args: &Args) -> Result<SchemaRegistry, EngineError> {
    let mut registry = SchemaRegistry::with_core();
    for (module, path) in args.schema_files()? {
        let text = std::fs::read_to_string(&path)
            .map_err(|source| EngineError::SchemaFile { path, source })?;
        registry.register_str(&module, &text)?;
    }
    Ok(registry)
}

/// Run the full setup sequence for `args`.
pub fn run(args: &Args) -> Result<SetupSummary, EngineError> {
    let registry = schema_registry(args)?;
    let sources = args.sources()?;

    let config = validate_config(&sources, &registry, args.out.as_deref())?;
    let core = config.core()?;
    info!(
        modules = ?config.modules(),
        variables = core.data.variable.len(),
        "Configuration loaded"
    );

    let mut grid = Grid::from_config(&core.grid)?;
    if let Some(distance) = args.neighbour_distance {
        grid.set_neighbours(distance)?;
        info!(distance, "Neighbours computed");
    }
    if let Some(path) = &args.grid_out {
        grid.dump(path, args.grid_dp)?;
        info!(path = %path.display(), "Grid exported");
    }

    let axes = AxisRegistry::with_spatial();
    let loaders = LoaderRegistry::with_defaults();
    let mut store = DataStore::new(&grid, &axes);
    store.load_data_config(&core.data, &loaders)?;

    Ok(SetupSummary {
        grid: grid.to_string(),
        n_cells: grid.n_cells(),
        modules: config.modules().to_vec(),
        variables: store.names().map(str::to_owned).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn inline_configuration_runs_end_to_end() {
        let args = parse(&[
            "canopy-engine",
            "--cfg-string",
            "[core]\nmodules = []\n[core.grid]\ncell_nx = 3\ncell_ny = 2\n",
            "--neighbour-distance",
            "10",
        ]);
        let summary = run(&args).unwrap();
        assert_eq!(summary.n_cells, 6);
        assert!(summary.modules.is_empty());
        assert!(summary.variables.is_empty());
        assert!(summary.grid.starts_with("Grid(square"));
    }

    #[test]
    fn outputs_are_written() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("merged.toml");
        let grid_out = dir.path().join("grid.geojson");
        let args = parse(&[
            "canopy-engine",
            "--cfg-string",
            "[core]\nmodules = []\n[core.grid]\ngrid_type = \"hexagon\"\ncell_nx = 2\ncell_ny = 2\n",
            "--out",
            out.to_str().unwrap(),
            "--grid-out",
            grid_out.to_str().unwrap(),
        ]);
        let summary = run(&args).unwrap();
        assert!(summary.grid.starts_with("Grid(hexagon"));
        assert!(std::fs::read_to_string(&out).unwrap().contains("grid_type = \"hexagon\""));
        assert!(std::fs::read_to_string(&grid_out).unwrap().contains("FeatureCollection"));
    }

    #[test]
    fn excessive_grid_precision_fails_at_export() {
        let dir = TempDir::new().unwrap();
        let grid_out = dir.path().join("grid.geojson");
        let args = parse(&[
            "canopy-engine",
            "--cfg-string",
            "[core]\nmodules = []\n",
            "--grid-out",
            grid_out.to_str().unwrap(),
            "--grid-dp",
            "200",
        ]);
        assert!(matches!(run(&args), Err(EngineError::Grid { .. })));
        assert!(!grid_out.exists());
    }

    #[test]
    fn unimplemented_tiling_fails_at_grid_construction() {
        let args = parse(&[
            "canopy-engine",
            "--cfg-string",
            "[core]\nmodules = []\n[core.grid]\ngrid_type = \"triangle\"\n",
        ]);
        assert!(matches!(run(&args), Err(EngineError::Grid { .. })));
    }

    #[test]
    fn unreadable_schema_file() {
        let args = parse(&[
            "canopy-engine",
            "--schema",
            "soil=/nonexistent/canopy/soil.json",
            "a.toml",
        ]);
        assert!(matches!(
            schema_registry(&args),
            Err(EngineError::SchemaFile { .. })
        ));
    }
}
