use modprep_lib::cli::{ResolvedCommand, parse_args, resolve_command, run_setup};
use modprep_lib::error::ModPrepError;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), ModPrepError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping");
            on_interrupt.cancel();
        }
    });

    match command {
        ResolvedCommand::Setup(params) => run_setup(params, cancel).await?,
    }

    Ok(())
}
