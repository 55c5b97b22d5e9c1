use crate::cli::args::{Command, Overrides};
use crate::cli::params::SetupParams;
use crate::config::load_config;
use crate::error::ModPrepError;
use reqwest::Url;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Setup(SetupParams),
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, ModPrepError> {
    let Command { step, overrides } = command;
    let Overrides {
        config_path,
        game_dir,
        manifest_url,
        no_progress,
    } = overrides;

    let mut app_config = load_config(config_path.as_deref())?;

    if let Some(game_dir) = game_dir {
        if game_dir.trim().is_empty() {
            return Err(ModPrepError::CliArgumentValidation {
                details: "--game-dir must not be empty.".to_string(),
            });
        }
        app_config.target_base_dir = PathBuf::from(game_dir);
    }

    if let Some(manifest_url) = manifest_url {
        if let Err(e) = Url::parse(&manifest_url) {
            return Err(ModPrepError::CliArgumentValidation {
                details: format!("--manifest-url {manifest_url} is not a valid URL: {e}"),
            });
        }
        app_config.manifest_url = manifest_url;
    }

    if no_progress {
        app_config.show_progress = false;
    }

    if app_config.installer_max_attempts == Some(0) {
        return Err(ModPrepError::CliArgumentValidation {
            details: "installer_max_attempts must be greater than 0 when set.".to_string(),
        });
    }

    Ok(ResolvedCommand::Setup(SetupParams { step, app_config }))
}
