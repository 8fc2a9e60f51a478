//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kinfolk - record family relationships and let the rest follow.
#[derive(Debug, Parser)]
#[command(name = "kinfolk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "KINFOLK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file (overrides the config file)
    #[arg(long, global = true, env = "KINFOLK_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a default config file and create the database
    Init(InitArgs),

    /// Manage people
    Person(PersonArgs),

    /// Confirm a relationship and infer the ones it implies
    Relate(RelateArgs),

    /// Propose a relationship for the other person to accept
    Request(RelateArgs),

    /// Accept a pending relationship request
    Accept(EdgeArgs),

    /// Reject a pending relationship request
    Reject(EdgeArgs),

    /// List the relationships of a person
    Edges(EdgesArgs),

    /// Suggest relationships a person has not recorded yet
    Suggest(SuggestArgs),

    /// Remove the relationship between two people, both directions
    Unrelate(UnrelateArgs),

    /// List the relation codes in the catalog
    Codes,
}

/// Arguments for the init command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for person management.
#[derive(Debug, Parser)]
pub struct PersonArgs {
    #[command(subcommand)]
    pub action: PersonAction,
}

/// Person management actions.
#[derive(Debug, Subcommand)]
pub enum PersonAction {
    /// Add a person
    Add {
        /// Display name
        name: String,
        /// Recorded gender
        #[arg(short, long, value_enum, default_value = "unknown")]
        gender: GenderArg,
    },

    /// Show one person and their relationships
    Show {
        /// Person id or display name
        person: String,
    },

    /// List everyone
    List,
}

/// Arguments for relate and request.
///
/// Reads as "OTHER is SUBJECT's CODE": `kinfolk relate ana mother rosa`.
#[derive(Debug, Parser)]
pub struct RelateArgs {
    /// Person the relationship is described from (id or name)
    pub subject: String,

    /// Relation code, e.g. `mother` or `uncle_paternal`
    pub code: String,

    /// Person being described (id or name)
    pub other: String,
}

/// Arguments naming a single edge.
#[derive(Debug, Parser)]
pub struct EdgeArgs {
    /// Edge id
    pub edge: String,
}

/// Arguments for the edges command.
#[derive(Debug, Parser)]
pub struct EdgesArgs {
    /// Person id or display name
    pub person: String,

    /// Include pending and rejected edges
    #[arg(short, long)]
    pub all: bool,
}

/// Arguments for the suggest command.
#[derive(Debug, Parser)]
pub struct SuggestArgs {
    /// Person id or display name
    pub person: String,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the unrelate command.
#[derive(Debug, Parser)]
pub struct UnrelateArgs {
    /// One person (id or name)
    pub first: String,

    /// The other person (id or name)
    pub second: String,
}

/// Gender argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum GenderArg {
    /// Male
    Male,
    /// Female
    Female,
    /// Not recorded
    Unknown,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<GenderArg> for kinfolk_domain::Gender {
    fn from(gender: GenderArg) -> Self {
        match gender {
            GenderArg::Male => kinfolk_domain::Gender::Male,
            GenderArg::Female => kinfolk_domain::Gender::Female,
            GenderArg::Unknown => kinfolk_domain::Gender::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_relate_command() {
        let cli = Cli::parse_from(["kinfolk", "relate", "ana", "mother", "rosa"]);
        match cli.command {
            Command::Relate(args) => {
                assert_eq!(args.subject, "ana");
                assert_eq!(args.code, "mother");
                assert_eq!(args.other, "rosa");
            }
            _ => panic!("Expected Relate command"),
        }
    }

    #[test]
    fn test_person_add_gender() {
        let cli = Cli::parse_from(["kinfolk", "person", "add", "Ana Lopez", "--gender", "female"]);
        match cli.command {
            Command::Person(PersonArgs {
                action: PersonAction::Add { name, gender },
            }) => {
                assert_eq!(name, "Ana Lopez");
                assert_eq!(kinfolk_domain::Gender::from(gender), kinfolk_domain::Gender::Female);
            }
            _ => panic!("Expected person add"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kinfolk", "codes", "--format", "json", "--no-color"]);
        assert!(matches!(cli.command, Command::Codes));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.no_color);
    }
}
