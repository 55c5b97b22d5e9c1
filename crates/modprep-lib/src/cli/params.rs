use super::args::Step;
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct SetupParams {
    pub step: Step,
    pub app_config: Config,
}
