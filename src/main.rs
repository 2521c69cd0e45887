use transfer_fares::config::Settings;
use transfer_fares::engine::Engine;
use transfer_fares::error::Error;
use transfer_fares::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env()?;
    let engine = Engine::new(settings.tariff()?)?;

    serve(engine, settings.addr).await
}
