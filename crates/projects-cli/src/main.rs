//! gh-projects CLI - Manage repository project boards from the command line.

mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use projects_client::StateFilter;
use projects_core::parse_number;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gh-projects")]
#[command(author, version, about = "Manage repository projects")]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    format: output::OutputFormat,

    /// Select another repository using the [HOST/]OWNER/REPO format
    #[arg(long, short = 'R', global = true)]
    repo: Option<String>,

    /// Show verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects
    #[command(alias = "ls")]
    List {
        /// Search projects
        #[arg(long, short = 'S')]
        search: Option<String>,

        /// Filter by state
        #[arg(long, short = 's', value_enum, default_value = "open")]
        state: State,
    },

    /// View a project and its first page of items
    View {
        /// Project number, optionally starting with "#"
        #[arg(value_parser = parse_project_number)]
        number: u32,
    },

    /// Copy a project to your account
    Clone {
        /// Project number, optionally starting with "#"
        #[arg(value_parser = parse_project_number)]
        number: u32,

        /// Title of the new project
        #[arg(long, short = 't')]
        title: String,

        /// Include draft issues
        #[arg(long)]
        include_drafts: bool,

        #[command(flatten)]
        properties: PropertyArgs,
    },

    /// Edit a project and add or remove issues and pull requests
    Edit {
        /// Project number, optionally starting with "#"
        #[arg(value_parser = parse_project_number)]
        number: u32,

        /// Set the new title
        #[arg(long, short = 't')]
        title: Option<String>,

        #[command(flatten)]
        properties: PropertyArgs,

        /// Issues or pull requests to add
        #[arg(long = "add-issue", value_delimiter = ',', value_parser = parse_issue_number)]
        add_issue: Vec<u64>,

        /// Issues or pull requests to remove
        #[arg(long = "remove-issue", value_delimiter = ',', value_parser = parse_issue_number)]
        remove_issue: Vec<u64>,

        /// Set field values on added issues (name=value)
        #[arg(long, short = 'f', value_delimiter = ',')]
        field: Vec<String>,

        /// Concurrent workers used to add issues
        #[arg(long)]
        workers: Option<usize>,
    },
}

#[derive(Args)]
struct PropertyArgs {
    /// Set the new short description
    #[arg(long, short = 'd')]
    description: Option<String>,

    /// Set the new body; "-" reads it from standard input
    #[arg(long, short = 'b')]
    body: Option<String>,

    /// Set the visibility; --public=false makes the project private
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    public: Option<bool>,
}

impl PropertyArgs {
    fn with_title(self, title: Option<String>) -> commands::Properties {
        commands::Properties {
            title,
            description: self.description,
            body: self.body,
            public: self.public,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum State {
    Open,
    Closed,
    All,
}

impl From<State> for StateFilter {
    fn from(state: State) -> Self {
        match state {
            State::Open => Self::Open,
            State::Closed => Self::Closed,
            State::All => Self::All,
        }
    }
}

fn parse_project_number(value: &str) -> Result<u32, String> {
    parse_number(value, "project")
        .map_err(|e| e.to_string())
        .and_then(|n| u32::try_from(n).map_err(|_| format!("invalid project number: {value}")))
}

fn parse_issue_number(value: &str) -> Result<u64, String> {
    parse_number(value, "issue").map_err(|e| e.to_string())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,gh_projects=debug,projects_client=debug,projects_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let globals = session::Globals {
        repo: cli.repo,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::List { search, state } => {
            commands::list(&globals, search.as_deref(), state.into(), cli.format)
        }
        Commands::View { number } => commands::view(&globals, number, cli.format),
        Commands::Clone {
            number,
            title,
            include_drafts,
            properties,
        } => commands::clone(
            &globals,
            number,
            title,
            include_drafts,
            properties.with_title(None),
            cli.format,
        ),
        Commands::Edit {
            number,
            title,
            properties,
            add_issue,
            remove_issue,
            field,
            workers,
        } => commands::edit(
            &globals,
            number,
            properties.with_title(title),
            commands::ItemChanges {
                add: add_issue,
                remove: remove_issue,
                fields: field,
                workers,
            },
            cli.format,
        ),
    };

    result.map_err(session::friendly_error)
}
