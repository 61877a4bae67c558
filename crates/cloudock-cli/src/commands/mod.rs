//! CLI command definitions and dispatch.

pub mod build;
pub mod plan;
pub mod validate;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use cloudock_common::config::ProjectPaths;
use cloudock_common::types::ServiceName;
use cloudock_compose::request::{CompileRequest, ServiceRequest};
use cloudock_config::project::{Overrides, ProjectConfig};

/// Local container topologies for cloud application projects.
#[derive(Parser, Debug)]
#[command(name = "cloudock", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Project root containing the application and services configs.
    #[arg(long, global = true, default_value = ".", env = "CLOUDOCK_PROJECT_DIR")]
    pub project_dir: PathBuf,

    /// Log at debug level regardless of `RUST_LOG`.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile the topology and write the compose file.
    Build(build::BuildArgs),
    /// Check service versions against the application version.
    Validate(validate::ValidateArgs),
    /// Show the startup order and images without writing anything.
    Plan(plan::PlanArgs),
}

/// Service version overrides shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// PHP version.
    #[arg(long)]
    pub php: Option<String>,
    /// Database (MariaDB) version.
    #[arg(long)]
    pub db: Option<String>,
    /// Nginx version.
    #[arg(long)]
    pub nginx: Option<String>,
    /// Redis version.
    #[arg(long)]
    pub redis: Option<String>,
    /// Elasticsearch version.
    #[arg(long)]
    pub es: Option<String>,
    /// RabbitMQ version.
    #[arg(long)]
    pub rabbitmq: Option<String>,
    /// Node.js version.
    #[arg(long)]
    pub node: Option<String>,
    /// Application version, instead of the one in `composer.lock`.
    #[arg(long)]
    pub app_version: Option<String>,
}

impl ServiceArgs {
    /// Converts the flags into configuration overrides.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        let mut services = ServiceRequest::new();
        let flags = [
            (ServiceName::Php, &self.php),
            (ServiceName::Mysql, &self.db),
            (ServiceName::Nginx, &self.nginx),
            (ServiceName::Redis, &self.redis),
            (ServiceName::Elasticsearch, &self.es),
            (ServiceName::Rabbitmq, &self.rabbitmq),
            (ServiceName::Node, &self.node),
        ];
        for (name, value) in flags {
            if let Some(version) = value {
                services.set(name, version.as_str());
            }
        }
        Overrides {
            services,
            application: self.app_version.clone(),
        }
    }
}

/// Loads the project at `project_dir` and builds the compiler input.
///
/// # Errors
///
/// Returns an error if the project files cannot be read or parsed.
pub fn load_request(
    project_dir: &Path,
    services: &ServiceArgs,
) -> anyhow::Result<CompileRequest> {
    let paths = ProjectPaths::new(project_dir);
    let config = ProjectConfig::load(&paths, &services.overrides())?;
    Ok(config.to_compile_request())
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Build(args) => build::execute(&args, &cli.project_dir),
        Command::Validate(args) => validate::execute(&args, &cli.project_dir),
        Command::Plan(args) => plan::execute(&args, &cli.project_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let args = ServiceArgs {
            php: Some("7.3".into()),
            db: Some("10.2".into()),
            es: Some(String::new()),
            app_version: Some("2.3.4".into()),
            ..ServiceArgs::default()
        };
        let overrides = args.overrides();
        assert_eq!(overrides.services.get(ServiceName::Php), Some("7.3"));
        assert_eq!(overrides.services.get(ServiceName::Mysql), Some("10.2"));
        assert_eq!(overrides.services.get(ServiceName::Elasticsearch), None);
        assert_eq!(overrides.application.as_deref(), Some("2.3.4"));
    }

    #[test]
    fn parses_global_flags_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "cloudock",
            "plan",
            "--php",
            "7.2",
            "--project-dir",
            "/srv/shop",
            "--log-format",
            "json",
        ])
        .expect("parse");
        assert_eq!(cli.project_dir, PathBuf::from("/srv/shop"));
        assert_eq!(cli.log_format, LogFormat::Json);
        let Command::Plan(args) = cli.command else {
            unreachable!("plan subcommand");
        };
        assert_eq!(args.services.php.as_deref(), Some("7.2"));
    }
}
