use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lakerelay", about = "Route agent action invocations to Athena SQL queries")]
pub struct Cli {
    /// Path to config file
    #[arg(short = 'c', long, global = true, env = "LAKERELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit diagnostics to stderr
    #[arg(short = 'v', long, global = true, env = "LAKERELAY_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Handle an action-invocation envelope and print the response envelope
    Handle(HandleArgs),

    /// Run a SQL query directly and print the shaped result rows
    Query(QueryArgs),
}

#[derive(Parser, Debug)]
pub struct HandleArgs {
    /// Invocation envelope JSON
    pub invocation: Option<String>,

    /// Read the invocation envelope from file
    #[arg(short = 'f', long = "file", conflicts_with = "invocation")]
    pub invocation_file: Option<PathBuf>,

    /// Recognized api paths (repeatable; default: /athenaQuery)
    #[arg(long = "path")]
    pub recognized_paths: Vec<String>,

    /// AWS region
    #[arg(long, env = "LAKERELAY_REGION")]
    pub region: Option<String>,

    /// S3 location for query results (e.g. s3://bucket/prefix/)
    #[arg(long, env = "LAKERELAY_OUTPUT_LOCATION")]
    pub output_location: Option<String>,

    /// Athena workgroup
    #[arg(long, env = "LAKERELAY_WORKGROUP")]
    pub workgroup: Option<String>,

    /// Athena data catalog
    #[arg(long, env = "LAKERELAY_CATALOG")]
    pub catalog: Option<String>,

    /// Athena database
    #[arg(long, env = "LAKERELAY_DATABASE")]
    pub database: Option<String>,

    /// Interval between status checks in milliseconds (default: 1000)
    #[arg(long, env = "LAKERELAY_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Query deadline in seconds (default: 60)
    #[arg(short = 't', long, env = "LAKERELAY_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Write the response envelope to file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Config file profile name
    #[arg(short = 'P', long, env = "LAKERELAY_PROFILE")]
    pub profile: Option<String>,
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// SQL query text
    pub sql: Option<String>,

    /// Read SQL from file
    #[arg(short = 'f', long = "file", conflicts_with = "sql")]
    pub sql_file: Option<PathBuf>,

    /// AWS region
    #[arg(long, env = "LAKERELAY_REGION")]
    pub region: Option<String>,

    /// S3 location for query results (e.g. s3://bucket/prefix/)
    #[arg(long, env = "LAKERELAY_OUTPUT_LOCATION")]
    pub output_location: Option<String>,

    /// Athena workgroup
    #[arg(long, env = "LAKERELAY_WORKGROUP")]
    pub workgroup: Option<String>,

    /// Athena data catalog
    #[arg(long, env = "LAKERELAY_CATALOG")]
    pub catalog: Option<String>,

    /// Athena database
    #[arg(long, env = "LAKERELAY_DATABASE")]
    pub database: Option<String>,

    /// Interval between status checks in milliseconds (default: 1000)
    #[arg(long, env = "LAKERELAY_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Query deadline in seconds (default: 60)
    #[arg(short = 't', long, env = "LAKERELAY_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Write the result rows to file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Config file profile name
    #[arg(short = 'P', long, env = "LAKERELAY_PROFILE")]
    pub profile: Option<String>,
}
