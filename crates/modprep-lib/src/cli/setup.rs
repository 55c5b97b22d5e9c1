use crate::cli::args::Step;
use crate::cli::params::SetupParams;
use crate::error::ModPrepError;
use crate::pipeline::SetupPipeline;
use tokio_util::sync::CancellationToken;

pub async fn run_setup(params: SetupParams, cancel: CancellationToken) -> Result<(), ModPrepError> {
    let SetupParams { step, app_config } = params;

    tracing::info!(
        game_dir = %app_config.target_base_dir.display(),
        "Setting up modpack"
    );
    let pipeline = SetupPipeline::from_config(app_config)?.with_cancellation(cancel);

    match step {
        Step::Setup => {
            pipeline.run().await?;
        }
        Step::Install => pipeline.ensure_runtime_installed().await?,
        Step::Mods => {
            pipeline.sync_mods().await?;
        }
        Step::Options => pipeline.download_extra_files().await?,
    }

    Ok(())
}
