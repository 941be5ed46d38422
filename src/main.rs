use clap::Parser as _;
use signup::{
    cli::{Cli, Command},
    config, Config, Signup,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::ConfigTemplate) => config::print_config_template(),
        Some(Command::ConfigInit { config_path }) => config::init_config(config_path)?,
        None => {
            let config = Config::load(cli.args.config_path)?;
            Signup::boot(config)?.serve().await?;
        }
    }

    Ok(())
}
