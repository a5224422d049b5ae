use clap::{Parser, Subcommand, ValueEnum};
use sailhouse_schema::SubscriptionType;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "sailhouse")]
#[command(about = "Manage Sailhouse teams, apps, topics and subscriptions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides config)
    #[arg(long, global = true, env = "SAILHOUSE_API_URL")]
    pub api_url: Option<String>,

    /// API token (overrides stored credentials)
    #[arg(long, global = true, env = "SAILHOUSE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Team to use
    #[arg(long, global = true, env = "SAILHOUSE_TEAM")]
    pub team: Option<String>,

    /// App to use
    #[arg(long, global = true, env = "SAILHOUSE_APP")]
    pub app: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "SAILHOUSE_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store an API token for this profile
    Login(LoginArgs),
    /// Logout (remove stored credentials)
    Logout,
    /// Show the active profile, team, app and token
    Status,
    /// Manage CLI configuration
    Config(ConfigArgs),
    /// Manage teams
    #[command(subcommand)]
    Teams(TeamsCommands),
    /// Manage apps
    #[command(subcommand)]
    Apps(AppsCommands),
    /// Manage topics
    #[command(subcommand)]
    Topics(TopicsCommands),
    /// Manage subscriptions
    #[command(subcommand)]
    Subs(SubsCommands),
    /// Manage tokens
    #[command(subcommand)]
    Tokens(TokensCommands),
    /// Manage schemas
    #[command(subcommand)]
    Schema(SchemaCommands),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// API token issued by Sailhouse
    pub token: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (api_url, team, app, format)
    pub key: String,
    /// Value
    pub value: String,
}

#[derive(Subcommand)]
pub enum TeamsCommands {
    /// List teams
    List,
    /// Set the current team
    Set {
        /// Team slug
        slug: String,
    },
}

#[derive(Subcommand)]
pub enum AppsCommands {
    /// List apps
    List,
    /// Create an app
    Create {
        /// App slug (lowercase letters, numbers and dashes)
        slug: String,
    },
    /// Get app usage
    Usage {
        /// App slug (defaults to the current app)
        slug: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TopicsCommands {
    /// List topics
    List,
    /// Create a topic
    Create {
        /// Topic slug (lowercase letters, numbers and dashes)
        slug: String,
    },
}

#[derive(Subcommand)]
pub enum SubsCommands {
    /// List subscriptions of a topic
    List {
        topic: String,
    },
    /// Create a subscription
    Create(SubCreateArgs),
    /// View a subscription
    View {
        topic: String,
        slug: String,
    },
}

#[derive(clap::Args)]
pub struct SubCreateArgs {
    /// Topic slug
    pub topic: String,
    /// Subscription slug
    pub slug: String,
    /// Subscription type
    #[arg(short = 't', long = "type", default_value = "pull")]
    pub kind: SubscriptionKindArg,
    /// Endpoint for push subscriptions (HTTPS only)
    #[arg(short, long)]
    pub endpoint: Option<String>,
    /// Filter path
    #[arg(long)]
    pub filter_path: Option<String>,
    /// Filter value
    #[arg(long)]
    pub filter_value: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SubscriptionKindArg {
    Pull,
    Push,
}

impl From<SubscriptionKindArg> for SubscriptionType {
    fn from(arg: SubscriptionKindArg) -> Self {
        match arg {
            SubscriptionKindArg::Pull => Self::Pull,
            SubscriptionKindArg::Push => Self::Push,
        }
    }
}

#[derive(Subcommand)]
pub enum TokensCommands {
    /// Create a token
    Create {
        /// Label for the token
        label: String,
    },
    /// List tokens
    List,
}

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Create a starter schema file
    Create(SchemaCreateArgs),
    /// Apply a schema file to the current app
    Apply(SchemaApplyArgs),
}

#[derive(clap::Args)]
pub struct SchemaCreateArgs {
    /// Schema name (written to <name>.yaml)
    pub name: Option<String>,
    /// Key for the schema
    #[arg(short, long)]
    pub key: Option<String>,
    /// Create an empty schema
    #[arg(short, long)]
    pub empty: bool,
}

#[derive(clap::Args)]
pub struct SchemaApplyArgs {
    /// Schema name (read from <name>.yaml)
    pub name: Option<String>,
    /// Show the changes without applying them
    #[arg(short, long)]
    pub dry_run: bool,
    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
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
    fn test_parse_schema_apply() {
        let cli = Cli::try_parse_from([
            "sailhouse", "--app", "shop", "schema", "apply", "prod", "--dry-run", "-y",
        ])
        .unwrap();
        assert_eq!(cli.app.as_deref(), Some("shop"));
        match cli.command {
            Commands::Schema(SchemaCommands::Apply(args)) => {
                assert_eq!(args.name.as_deref(), Some("prod"));
                assert!(args.dry_run);
                assert!(args.yes);
            }
            _ => panic!("expected schema apply"),
        }
    }

    #[test]
    fn test_parse_subs_create() {
        let cli = Cli::try_parse_from([
            "sailhouse",
            "subs",
            "create",
            "orders",
            "webhook",
            "--type",
            "push",
            "--endpoint",
            "https://example.com/hook",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Subs(SubsCommands::Create(args)) => {
                assert_eq!(SubscriptionType::from(args.kind), SubscriptionType::Push);
                assert_eq!(args.endpoint.as_deref(), Some("https://example.com/hook"));
            }
            _ => panic!("expected subs create"),
        }
    }
}
