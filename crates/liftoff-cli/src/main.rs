mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "liftoff",
    version,
    propagate_version = true,
    about = "Provision domain workspaces from setup specs"
)]
struct Cli {
    /// Workspace root (defaults to the nearest directory with .liftoff or .git)
    #[arg(long, global = true, env = "LIFTOFF_ROOT", value_name = "DIR")]
    root: Option<PathBuf>,

    /// Emit machine-readable JSON instead of human output
    #[arg(long, short = 'j', global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a liftoff workspace
    Init {
        /// Project name stored in the config (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Manage setup specs
    Spec {
        #[command(subcommand)]
        command: SpecCommands,
    },
    /// Inspect provisioned domains
    Domain {
        #[command(subcommand)]
        command: DomainCommands,
    },
    /// Run every step of a spec
    Run {
        /// Spec slug (defaults to run.default_spec from the config)
        slug: Option<String>,
        /// Run input as KEY=VALUE (values parse as JSON, else strings)
        #[arg(long = "input", value_name = "KEY=VALUE")]
        input: Vec<String>,
        /// Evaluate readiness checks after the run
        #[arg(long)]
        check: bool,
    },
    /// Run the analyze phase and capture a preview
    Preview {
        slug: String,
        #[arg(long = "input", value_name = "KEY=VALUE")]
        input: Vec<String>,
        /// Write the preview to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Apply a preview: run the commit phase with overrides
    Commit {
        slug: String,
        /// Preview file produced by `liftoff preview`
        #[arg(long, value_name = "FILE")]
        preview: PathBuf,
        /// Override a preview result as KEY=VALUE
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        #[arg(long = "input", value_name = "KEY=VALUE")]
        input: Vec<String>,
    },
    /// Evaluate a spec's readiness checks
    Check {
        slug: String,
        /// Domain to evaluate against
        #[arg(long)]
        domain: Option<String>,
        #[arg(long = "input", value_name = "KEY=VALUE")]
        input: Vec<String>,
        /// Exit with status 2 when the spec is not ready
        #[arg(long)]
        strict: bool,
    },
    /// Browse recorded runs
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
}

#[derive(Subcommand)]
enum SpecCommands {
    /// Import or update a spec from a YAML file
    Import { file: PathBuf },
    /// List stored specs
    List,
    /// Show one spec in full
    Show { slug: String },
}

#[derive(Subcommand)]
enum DomainCommands {
    /// List provisioned domains
    List,
    /// Show one domain manifest
    Show { slug: String },
}

#[derive(Subcommand)]
enum RunsCommands {
    /// List recorded runs, newest first
    List,
    /// Show one run record
    Show { id: String },
}

fn main() {
    let cli = Cli::parse();

    let level = match &cli.command {
        Commands::Run { .. } | Commands::Preview { .. } | Commands::Commit { .. } => Level::INFO,
        _ => Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let root = root::resolve_root(cli.root)?;
    match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name, cli.json),
        Commands::Spec { command } => match command {
            SpecCommands::Import { file } => cmd::spec::import(&root, &file, cli.json),
            SpecCommands::List => cmd::spec::list(&root, cli.json),
            SpecCommands::Show { slug } => cmd::spec::show(&root, &slug, cli.json),
        },
        Commands::Domain { command } => match command {
            DomainCommands::List => cmd::domain::list(&root, cli.json),
            DomainCommands::Show { slug } => cmd::domain::show(&root, &slug, cli.json),
        },
        Commands::Run { slug, input, check } => {
            cmd::run::run(&root, slug, &input, check, cli.json)
        }
        Commands::Preview { slug, input, out } => {
            cmd::preview::run(&root, &slug, &input, out.as_deref(), cli.json)
        }
        Commands::Commit { slug, preview, set, input } => {
            cmd::commit::run(&root, &slug, &preview, &set, &input, cli.json)
        }
        Commands::Check { slug, domain, input, strict } => {
            cmd::check::run(&root, &slug, domain.as_deref(), &input, strict, cli.json)
        }
        Commands::Runs { command } => match command {
            RunsCommands::List => cmd::runs::list(&root, cli.json),
            RunsCommands::Show { id } => cmd::runs::show(&root, &id, cli.json),
        },
    }
}
