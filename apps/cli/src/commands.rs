//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use mcpdoc_core::{DocsService, ServiceConfig};
use mcpdoc_fetcher::AllowList;
use mcpdoc_shared::{AppConfig, FetchConfig, init_config, load_config, timeout_from_secs};
use tracing::info;

const EPILOG: &str = "\
Examples:
  # Directly specifying documentation files with optional names
  mcpdoc list --urls LangGraph:https://esakrissa.github.io/mcpdoc/docs/langgraph.txt

  # Using a local file (absolute or relative path)
  mcpdoc fetch MCP --urls MCP:/path/to/mcp.txt

  # Using YAML and JSON config files together
  mcpdoc list --yaml sample_config.yaml --json sample_config.json

  # Fetch with redirects followed and a 15 second timeout
  mcpdoc fetch LangGraph --yaml sample_config.yaml --follow-redirects --timeout 15

  # Allow fetching from additional domains. Doc source domains are always allowed.
  mcpdoc fetch https://example.com/llms.txt --yaml sample_config.yaml --allowed-domains https://example.com/

  # Allow fetching from any domain
  mcpdoc fetch https://example.com/llms.txt --yaml sample_config.yaml --allowed-domains '*'
";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mcpdoc: serve documentation sources to AI agents behind a domain allow-list.
#[derive(Parser)]
#[command(
    name = "mcpdoc",
    version,
    about = "Serve documentation sources to AI agents behind a domain allow-list.",
    long_about = None,
    after_help = EPILOG,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Doc source and fetch policy flags shared by every subcommand.
#[derive(clap::Args)]
pub(crate) struct SourceArgs {
    /// Path to YAML config file with doc sources.
    #[arg(short, long, global = true)]
    pub yaml: Option<PathBuf>,

    /// Path to JSON config file with doc sources.
    #[arg(short, long, global = true)]
    pub json: Option<PathBuf>,

    /// Doc file URLs or paths with optional names ('url_or_path' or 'name:url_or_path').
    #[arg(short, long, num_args = 1.., global = true)]
    pub urls: Vec<String>,

    /// Additional allowed domains. Use '*' to allow all domains.
    #[arg(long, num_args = 0.., global = true)]
    pub allowed_domains: Vec<String>,

    /// Follow HTTP redirects.
    #[arg(long, global = true)]
    pub follow_redirects: bool,

    /// Check every redirect hop against the allowed domains.
    #[arg(long, global = true)]
    pub strict_redirects: bool,

    /// HTTP request timeout in seconds [default: 10, or the config file value].
    #[arg(long, global = true)]
    pub timeout: Option<f64>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the configured documentation sources.
    List,

    /// Fetch one resource and print it as Markdown.
    Fetch {
        /// Source name, overview alias, URL, or local path.
        resource: String,
    },

    /// Print the effective allowed domains.
    Domains,

    /// Print the tool definitions exposed to agents, as JSON.
    Tools,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout is
/// reserved for command output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mcpdoc=warn",
        1 => "mcpdoc=info",
        2 => "mcpdoc=debug",
        _ => "mcpdoc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::List => cmd_list(&cli.sources),
        Command::Fetch { ref resource } => cmd_fetch(&cli.sources, resource).await,
        Command::Domains => cmd_domains(&cli.sources),
        Command::Tools => cmd_tools(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Load the settings file and merge CLI flags over it.
fn service_config(args: &SourceArgs) -> Result<ServiceConfig> {
    merge_settings(load_config()?, args)
}

/// Merge CLI flags over `settings` into a service config.
fn merge_settings(settings: AppConfig, args: &SourceArgs) -> Result<ServiceConfig> {
    let mut fetch = FetchConfig::try_from(&settings)?;

    if let Some(secs) = args.timeout {
        fetch.timeout = timeout_from_secs(secs)?;
    }
    fetch.follow_redirects |= args.follow_redirects;
    fetch.strict_redirects |= args.strict_redirects;

    let mut allowed_domains = settings.fetch.allowed_domains;
    allowed_domains.extend(args.allowed_domains.iter().cloned());

    Ok(ServiceConfig {
        yaml: args.yaml.clone(),
        json: args.json.clone(),
        urls: args.urls.clone(),
        allowed_domains,
        fetch,
    })
}

fn build_service(args: &SourceArgs) -> Result<DocsService> {
    let config = service_config(args)?;
    let service =
        DocsService::from_config(&config).wrap_err("failed to load documentation sources")?;

    info!(
        sources = service.catalog().len(),
        timeout_secs = config.fetch.timeout.as_secs_f64(),
        follow_redirects = config.fetch.follow_redirects,
        "loaded doc sources"
    );
    Ok(service)
}

fn cmd_list(args: &SourceArgs) -> Result<()> {
    let service = build_service(args)?;
    print!("{}", service.list_doc_sources());
    Ok(())
}

async fn cmd_fetch(args: &SourceArgs, resource: &str) -> Result<()> {
    let service = build_service(args)?;

    tokio::select! {
        response = service.fetch_docs(resource) => {
            println!("{}", response.text.trim_end());
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nShutting down gracefully... Goodbye!");
        }
    }

    Ok(())
}

fn cmd_domains(args: &SourceArgs) -> Result<()> {
    let service = build_service(args)?;
    match service.allow_list() {
        AllowList::Any => println!("* (all domains allowed)"),
        AllowList::Origins(origins) => {
            for origin in origins {
                println!("{origin}");
            }
        }
    }
    Ok(())
}

fn cmd_tools() -> Result<()> {
    let defs = mcpdoc_core::definitions();
    println!("{}", serde_json::to_string_pretty(&defs)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sources_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mcpdoc",
            "fetch",
            "LangGraph",
            "--yaml",
            "sources.yaml",
            "--allowed-domains",
            "https://example.com/",
            "*",
            "--urls",
            "LangGraph:https://example.com/llms.txt",
            "docs/local.txt",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Fetch { ref resource } if resource == "LangGraph"));
        assert_eq!(cli.sources.yaml, Some(PathBuf::from("sources.yaml")));
        assert_eq!(cli.sources.allowed_domains, ["https://example.com/", "*"]);
        assert_eq!(cli.sources.urls.len(), 2);
        assert!(!cli.sources.follow_redirects);
    }

    #[test]
    fn timeout_flag_overrides_default() {
        let cli = Cli::try_parse_from([
            "mcpdoc",
            "list",
            "--urls",
            "docs/a.txt",
            "--timeout",
            "2.5",
            "--follow-redirects",
        ])
        .unwrap();

        let config = merge_settings(AppConfig::default(), &cli.sources).unwrap();
        assert_eq!(config.fetch.timeout, std::time::Duration::from_millis(2500));
        assert!(config.fetch.follow_redirects);
        assert_eq!(config.urls, ["docs/a.txt"]);
    }

    #[test]
    fn flags_merge_over_settings_file() {
        let settings: AppConfig = toml::from_str(
            r#"
            [fetch]
            timeout_secs = 30.0
            strict_redirects = true
            allowed_domains = ["https://docs.example.com"]
            "#,
        )
        .unwrap();
        let cli = Cli::try_parse_from([
            "mcpdoc",
            "domains",
            "--urls",
            "docs/a.txt",
            "--allowed-domains",
            "other.example.com",
        ])
        .unwrap();

        let config = merge_settings(settings, &cli.sources).unwrap();
        assert_eq!(config.fetch.timeout, std::time::Duration::from_secs(30));
        assert!(config.fetch.strict_redirects);
        assert!(!config.fetch.follow_redirects);
        assert_eq!(
            config.allowed_domains,
            ["https://docs.example.com", "other.example.com"]
        );
    }

    #[test]
    fn invalid_timeout_flag_is_rejected() {
        let cli = Cli::try_parse_from(["mcpdoc", "list", "--timeout", "0"]).unwrap();
        assert!(merge_settings(AppConfig::default(), &cli.sources).is_err());
    }
}
