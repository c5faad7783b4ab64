//! Command line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::models::ProjectId;
use crate::transport::DEFAULT_BASE_URL;

#[derive(Debug, Parser)]
#[command(
    name = "opac-tui",
    about = "Kanban and timeline client for the OPAC task tracker",
    version
)]
pub struct Cli {
    /// Base URL of the REST API
    #[arg(long, env = "OPAC_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Open the kanban board scoped to this project
    #[arg(long, value_name = "ID")]
    pub project: Option<ProjectId>,

    /// Run against an in-memory backend filled with sample data
    #[arg(long)]
    pub demo: bool,

    /// Write logs to this file (filter with OPAC_LOG, default "info")
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Resolved client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub project: Option<ProjectId>,
    pub demo: bool,
    pub log_file: Option<PathBuf>,
}

impl From<Cli> for ClientConfig {
    fn from(cli: Cli) -> Self {
        Self {
            api_url: cli.api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(cli.timeout_secs.max(1)),
            project: cli.project,
            demo: cli.demo,
            log_file: cli.log_file,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            project: None,
            demo: false,
            log_file: None,
        }
    }
}
