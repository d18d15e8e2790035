use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use spofcheck::config::Config;
use spofcheck::error::SpofError;
use spofcheck::net::HttpFetcher;
use spofcheck::run::{self, RunOptions};
use spofcheck::{FormatterRegistry, RuleRegistry};

#[derive(Parser)]
#[command(
    name = "spofcheck",
    about = "Frontend single point of failure (SPOF) detection",
    version,
    author
)]
struct Cli {
    /// Enable debug-level logging to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

const CHECK_EXAMPLE: &str = "Example:
  spofcheck check -f junit-xml -o /tests www.ebay.com www.amazon.com";

#[derive(Subcommand)]
enum Commands {
    /// Check one or more pages for SPOF risks
    #[command(after_help = CHECK_EXAMPLE)]
    Check {
        /// Page URLs; `http://` is assumed when no scheme is given
        urls: Vec<String>,

        /// Config file path
        #[arg(long, short = 'c', default_value = ".spofcheck.toml")]
        config: PathBuf,

        /// Output format (junit-xml, spof-xml, text)
        #[arg(long, short = 'f')]
        format: Option<String>,

        /// Directory to write the report file to
        #[arg(long = "outputdir", short = 'o')]
        output_dir: Option<PathBuf>,

        /// Comma-separated rule ids to include
        #[arg(long, short = 'r')]
        rules: Option<String>,

        /// Print the report to stdout instead of writing a file
        #[arg(long, short = 'p')]
        print: bool,

        /// Keep the console clear from logging
        #[arg(long, short = 'q')]
        quiet: bool,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List all available rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .spofcheck.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => Err(SpofError::Usage(run::USAGE.to_string())),
        Some(Commands::Check {
            urls,
            config,
            format,
            output_dir,
            rules,
            print,
            quiet,
            timeout,
        }) => {
            let args = CheckArgs {
                config,
                format,
                output_dir,
                rules,
                print,
                quiet,
                timeout,
            };
            cmd_check(urls, args, cli.debug).await
        }
        Some(Commands::ListRules { format }) => cmd_list_rules(format),
        Some(Commands::Init { force }) => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(SpofError::Usage(usage)) => {
            println!("{usage}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("spof: {}", e);
            process::exit(e.exit_code());
        }
    }
}

struct CheckArgs {
    config: PathBuf,
    format: Option<String>,
    output_dir: Option<PathBuf>,
    rules: Option<String>,
    print: bool,
    quiet: bool,
    timeout: Option<u64>,
}

async fn cmd_check(urls: Vec<String>, args: CheckArgs, debug: bool) -> Result<i32, SpofError> {
    let config = Config::load(&args.config)?;
    init_logging(args.quiet || config.quiet, debug);

    let mut options = RunOptions::from(&config);
    if let Some(format) = args.format {
        options.format = format;
    }
    if let Some(dir) = args.output_dir {
        options.output_dir = Some(dir);
    }
    if let Some(rules) = args.rules {
        options.rules = Some(vec![rules]);
    }
    if let Some(secs) = args.timeout {
        options.timeout = Duration::from_secs(secs);
    }
    options.print |= args.print;

    let fetcher = Arc::new(HttpFetcher::new(options.timeout, &options.user_agent));
    let report = run::run(&urls, &options, fetcher).await?;

    if options.print {
        println!("{}", report.rendered);
    } else {
        let dir = options
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        run::write_report(&report, &dir)?;
    }
    info!("SPOF check DONE!");

    Ok(0)
}

fn cmd_list_rules(format_str: String) -> Result<i32, SpofError> {
    let rules = RuleRegistry::builtin().list_rules();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!("{:<36} NAME", "ID");
            println!("{}", "-".repeat(80));
            for rule in &rules {
                println!("{:<36} {}", rule.id, rule.name);
            }
            println!();
            println!(
                "Formats: {}",
                FormatterRegistry::builtin().ids().join(", ")
            );
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, SpofError> {
    let path = PathBuf::from(".spofcheck.toml");

    if path.exists() && !force {
        eprintln!(".spofcheck.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .spofcheck.toml");

    Ok(0)
}

/// Progress goes to stderr; `RUST_LOG` overrides the level.
fn init_logging(quiet: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
