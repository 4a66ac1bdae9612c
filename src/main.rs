use std::{process, sync::Arc};

use listino::{
    application::{
        auth::ApiKeyGuard,
        cache::ResponseCache,
        catalog::CatalogService,
        error::AppError,
        repos::ItemsRepo,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let api_state = build_api_state(repositories.clone(), &settings);

    if settings.auth.uses_dev_key() {
        warn!(
            target = "listino::bootstrap",
            "auth.api_key is the development default; override it for any real deployment"
        );
    }

    serve_http(&settings, api_state, repositories).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_api_state(repositories: Arc<PostgresRepositories>, settings: &config::Settings) -> ApiState {
    let items_repo: Arc<dyn ItemsRepo> = repositories;

    let cache = settings
        .cache
        .enabled
        .then(|| Arc::new(ResponseCache::new()));

    let catalog = Arc::new(
        CatalogService::new(items_repo).with_response_cache_opt(cache),
    );
    let auth = Arc::new(ApiKeyGuard::new(settings.auth.api_key.clone()));

    ApiState { catalog, auth }
}

async fn serve_http(
    settings: &config::Settings,
    api_state: ApiState,
    repositories: Arc<PostgresRepositories>,
) -> Result<(), AppError> {
    let router = http::build_router(api_state, repositories);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "listino::bootstrap",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
