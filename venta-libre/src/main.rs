use clap::Parser;
use venta_libre::app::Root;
use venta_libre::cli::Cli;
use venta_libre::config::{Config, VERSION};
use venta_libre::logging;
use venta_nexus::Application;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.handle_command()? {
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref(), &cli.overrides())?;
    let _log_guard = logging::init(&config)?;
    tracing::info!(
        version = VERSION,
        api_url = %config.api_url,
        source = ?config.source,
        policy = %config.reload_policy,
        start = %config.start_path,
        "starting"
    );

    Application::new()
        .toast_duration(config.toast_duration)
        .run(move |cx| {
            cx.set_root(Root::from_config(&config))?;
            Ok(())
        })
}
