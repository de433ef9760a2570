//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ConnectionArgs, EndpointArgs};
use crate::controllers::make_adapter;
use crate::endpoints::list_builtin_info;
use crate::error::Result;
use crate::loader::{apply_overrides, load_overrides, resolve_endpoints, EndpointDefinition};
use crate::types::Solution;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Collect {
                connection,
                endpoints,
                output,
            } => self.collect(connection, endpoints, output.as_deref()).await,
            Commands::Endpoints {
                solution,
                endpoints,
            } => self.endpoints(*solution, endpoints),
            Commands::Solutions => self.solutions(),
        }
    }

    /// Authenticate, traverse and write the result document
    async fn collect(
        &self,
        connection: &ConnectionArgs,
        endpoints: &EndpointArgs,
        output: Option<&Path>,
    ) -> Result<()> {
        let start = Instant::now();
        let config = connection.to_config()?;
        let defs = load_definitions(config.solution, endpoints)?;

        let adapter = make_adapter(&config)?;
        adapter.authenticate().await?;
        info!(solution = %config.solution, "Authentication successful");

        let (tree, stats) = adapter.collect_with_stats(&defs).await;

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output(config.solution));
        fs::write(&path, tree.to_json_pretty()?)?;

        info!(
            path = %path.display(),
            endpoints = tree.len(),
            fetches = stats.fetches,
            failures = stats.failures,
            requests = adapter.client().request_count(),
            "Wrote collection output"
        );
        info!(elapsed = ?start.elapsed(), "Total execution time");
        Ok(())
    }

    /// Print the resolved definitions as YAML
    fn endpoints(&self, solution: Solution, endpoints: &EndpointArgs) -> Result<()> {
        let defs = load_definitions(solution, endpoints)?;
        print!("{}", serde_yaml::to_string(&defs)?);
        Ok(())
    }

    /// Print the supported solutions
    fn solutions(&self) -> Result<()> {
        println!("{:<16} {:<40} AUTH", "SOLUTION", "CONTROLLER");
        for info in list_builtin_info() {
            println!(
                "{:<16} {:<40} {}",
                info.solution.as_str(),
                info.description,
                info.auth
            );
        }
        Ok(())
    }
}

/// Endpoint definitions for a run: the file or packaged set, then overrides
pub fn load_definitions(
    solution: Solution,
    endpoints: &EndpointArgs,
) -> Result<Vec<EndpointDefinition>> {
    let defs = resolve_endpoints(solution, endpoints.endpoints_file.as_deref())?;

    match &endpoints.overrides_file {
        Some(path) => {
            let overrides = load_overrides(path)?;
            info!(
                moves = overrides.moves.len(),
                additions = overrides.additions.len(),
                "Applying endpoint overrides"
            );
            apply_overrides(defs, &overrides)
        }
        None => Ok(defs),
    }
}

/// `<solution>.json` in the working directory
pub fn default_output(solution: Solution) -> PathBuf {
    PathBuf::from(format!("{}.json", solution.file_stem()))
}
