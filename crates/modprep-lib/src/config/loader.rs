use super::Config;
use crate::error::ModPrepError;
use config::{Config as ConfigBuilder, Environment, Map};

pub const ENV_PREFIX: &str = "MODPREP";

/// Layers the built-in defaults, an optional config file and `MODPREP_*`
/// environment variables, in that order of precedence.
pub fn load_config(config_path: Option<&str>) -> Result<Config, ModPrepError> {
    load_config_with_env(config_path, None)
}

/// Like [`load_config`], reading variables from `env` instead of the process
/// environment when given.
pub(crate) fn load_config_with_env(
    config_path: Option<&str>,
    env: Option<Map<String, String>>,
) -> Result<Config, ModPrepError> {
    let mut builder =
        ConfigBuilder::builder().add_source(ConfigBuilder::try_from(&Config::default())?);

    if let Some(config_path) = config_path {
        builder = builder.add_source(config::File::with_name(config_path).required(true));
    }

    let config_builder = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}
