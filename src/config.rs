use crate::models::{Category, TaskPriority, TaskStatus};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{env, path::PathBuf, str::FromStr, time::Duration};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub preview_host: String,
    pub preview_port: u16,
    pub download_dir: PathBuf,
    pub timeout_secs: u64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Fabrication job tracker client")]
pub struct Args {
    /// Backend API base URL (overrides FABTRACK_API_BASE)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Host the preview server binds to (overrides FABTRACK_PREVIEW_HOST)
    #[arg(long, global = true)]
    pub preview_host: Option<String>,

    /// Port the preview server binds to, 0 for any (overrides FABTRACK_PREVIEW_PORT)
    #[arg(long, global = true)]
    pub preview_port: Option<u16>,

    /// Directory downloads are saved to (overrides FABTRACK_DOWNLOAD_DIR)
    #[arg(long, global = true)]
    pub download_dir: Option<PathBuf>,

    /// Request timeout in seconds (overrides FABTRACK_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive file view for one job
    Browse { project_no: String },

    /// List all jobs
    Projects,

    /// Delete a job
    DeleteProject {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// List the files of a job in one category
    Files {
        project_no: String,
        #[arg(long, short)]
        category: Category,
    },

    /// Upload files into a job's category
    Upload {
        project_no: String,
        #[arg(long, short)]
        category: Category,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Save a file's content into the download directory
    Download {
        file_id: String,
        /// Name to save under
        #[arg(long)]
        name: Option<String>,
        /// Job the file belongs to; its stored name is used when `--name`
        /// is absent. Without either the file is saved as `file-<id>`.
        #[arg(long)]
        project: Option<String>,
    },

    /// Delete a file
    DeleteFile {
        file_id: String,
        #[arg(long)]
        yes: bool,
    },

    /// Show a stage's task board
    Tasks {
        category: Category,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        project: Option<String>,
    },
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the command to run.
    pub fn from_env_and_args() -> Result<(Self, Command)> {
        // Parse CLI once
        let args = Args::parse();
        let cfg = Self::merge(&args, |key| env::var(key))?;
        Ok((cfg, args.command))
    }

    /// CLI values win; otherwise the variable from `lookup`; otherwise the default.
    pub fn merge<F>(args: &Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let api_base = match &args.api_base {
            Some(value) => value.clone(),
            None => lookup("FABTRACK_API_BASE").unwrap_or_else(|_| "http://localhost:5000/api".into()),
        };
        let preview_host = match &args.preview_host {
            Some(value) => value.clone(),
            None => lookup("FABTRACK_PREVIEW_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
        };
        let preview_port = match args.preview_port {
            Some(value) => value,
            None => parse_env(&lookup, "FABTRACK_PREVIEW_PORT", 0)?,
        };
        let download_dir = match &args.download_dir {
            Some(value) => value.clone(),
            None => lookup("FABTRACK_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./downloads")),
        };
        let timeout_secs = match args.timeout_secs {
            Some(value) => value,
            None => parse_env(&lookup, "FABTRACK_TIMEOUT_SECS", 30)?,
        };

        Ok(Self {
            api_base,
            preview_host,
            preview_port,
            download_dir,
            timeout_secs,
        })
    }

    pub fn preview_addr(&self) -> String {
        format!("{}:{}", self.preview_host, self.preview_port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}
