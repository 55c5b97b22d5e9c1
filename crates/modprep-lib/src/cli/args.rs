use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use tracing::Level;

/// Which part of the provisioning pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Setup,
    Install,
    Mods,
    Options,
}

/// Command-line values layered on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<String>,
    pub game_dir: Option<String>,
    pub manifest_url: Option<String>,
    pub no_progress: bool,
}

#[derive(Debug, Clone)]
pub struct Command {
    pub step: Step,
    pub overrides: Overrides,
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "modprep",
    version,
    author = "InsomniaWins",
    about = "Install the Forge runtime, the modpack's mods and its options files into a Minecraft directory"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, ClapArgs)]
struct OverrideArgs {
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Sets a custom config file (YAML, TOML or JSON)"
    )]
    config: Option<String>,

    #[arg(
        short = 'g',
        long = "game-dir",
        value_name = "DIR",
        help = "Overrides the Minecraft directory mods and options are installed into"
    )]
    game_dir: Option<String>,

    #[arg(
        short = 'm',
        long = "manifest-url",
        value_name = "URL",
        help = "Overrides the URL of the mod list"
    )]
    manifest_url: Option<String>,

    #[arg(long = "no-progress", help = "Disables the per-file progress bar")]
    no_progress: bool,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Install the runtime patch, download mods and options files
    Setup {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Only make sure the runtime patch is installed
    Install {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Only download the mods listed in the manifest
    Mods {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Only download the options files
    Options {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            config_path: args.config,
            game_dir: args.game_dir,
            manifest_url: args.manifest_url,
            no_progress: args.no_progress,
        }
    }
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("hyper_util=warn".parse().expect("valid directive")),
        )
        .init();

    let (step, overrides) = match cli.command {
        CliCommand::Setup { overrides } => (Step::Setup, overrides),
        CliCommand::Install { overrides } => (Step::Install, overrides),
        CliCommand::Mods { overrides } => (Step::Mods, overrides),
        CliCommand::Options { overrides } => (Step::Options, overrides),
    };

    Args {
        command: Command {
            step,
            overrides: overrides.into(),
        },
        log_level,
    }
}
