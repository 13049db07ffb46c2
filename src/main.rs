use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use keydash::{
    application::{error::AppError, key_settings::KeySettingsService, repos::KeysRepo},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, DashboardState, TenantResolver},
        telemetry,
    },
};
use tokio::{net::TcpListener, sync::oneshot};
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
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_dashboard_state(repositories, &settings)?;
    serve_http(&settings, state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    init_repositories(&settings).await?;
    info!(target = "keydash::migrate", "Migrations applied");
    Ok(())
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

fn build_dashboard_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<DashboardState, AppError> {
    let keys_repo: Arc<dyn KeysRepo> = repositories.clone();
    let tenant_resolver = TenantResolver::from_header_name(&settings.auth.tenant_header)
        .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?;

    Ok(DashboardState {
        db: repositories,
        key_settings: Arc::new(KeySettingsService::new(keys_repo)),
        tenant_resolver,
    })
}

async fn serve_http(settings: &config::Settings, state: DashboardState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "keydash::serve",
        addr = %settings.server.addr,
        "Dashboard listening"
    );

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    let result = tokio::select! {
        result = &mut server => result,
        Ok(()) = signalled_rx => {
            drain(&mut server, settings.server.graceful_shutdown).await
        }
    };

    result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

/// Waits for in-flight requests, giving up once `grace` has elapsed.
async fn drain<F>(server: &mut std::pin::Pin<&mut F>, grace: Duration) -> std::io::Result<()>
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    info!(
        target = "keydash::serve",
        grace_secs = grace.as_secs(),
        "Shutdown requested, draining connections"
    );
    match tokio::time::timeout(grace, server.as_mut()).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                target = "keydash::serve",
                "Graceful shutdown timed out, dropping remaining connections"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "keydash::serve", error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(target = "keydash::serve", error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
