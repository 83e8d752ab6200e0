use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};

use kieru::{
    config::{Config, IdFormat},
    handlers,
    id::{IdGenerator, NanoIdGenerator, UuidGenerator},
    render::Pages,
    service::NoteService,
    store::{memory::MemoryStore, postgres::PgStore, NoteStore},
    sweeper::Sweeper,
    AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;

    let store: Arc<dyn NoteStore> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url, config.store_timeout).map_err(startup_error)?),
        None => {
            log::warn!("DATABASE_URL is not set, notes are kept in memory and lost on restart");
            Arc::new(MemoryStore::new(config.store_timeout))
        }
    };
    let ids: Arc<dyn IdGenerator> = match config.id_format {
        IdFormat::Uuid => Arc::new(UuidGenerator),
        IdFormat::NanoId => Arc::new(NanoIdGenerator),
    };

    let sweeper = Sweeper::spawn(store.clone(), config.cleanup_interval)?;

    let state = web::Data::new(AppState {
        notes: NoteService::new(store, ids, config.note_lifetime),
        pages: Pages::new().map_err(startup_error)?,
        base_url: config.base_url.clone(),
    });

    let governor = GovernorConfigBuilder::default()
        .per_second(1)
        .burst_size(config.rate_limit_burst)
        .finish()
        .ok_or_else(|| startup_error("invalid rate limit configuration"))?;

    log::info!(
        "starting web server, listening on {}:{}",
        config.host,
        config.port
    );
    let result = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Governor::new(&governor))
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(config.bind_addr())?
    .run()
    .await;

    sweeper.shutdown();
    result
}

fn startup_error<E: std::fmt::Display>(err: E) -> std::io::Error {
    log::error!("{err}");
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}
