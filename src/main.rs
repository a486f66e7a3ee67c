use std::{process, sync::Arc, time::Duration};

use askama::Template;
use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use vetrina::{
    application::{error::AppError, home::HomePageService},
    config,
    infra::{
        content::StrapiContentSource,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
    presentation::{
        blocks::page_blocks,
        views::{HomeContext, HomeTemplate, LayoutChrome, LayoutContext},
    },
};

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
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Render(args) => run_render(settings, args).await,
    }
}

fn build_home_service(settings: &config::Settings) -> Result<Arc<HomePageService>, AppError> {
    let source = StrapiContentSource::new(&settings.content).map_err(AppError::from)?;
    Ok(Arc::new(HomePageService::new(Arc::new(source))))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = HttpState {
        home: build_home_service(&settings)?,
        chrome: LayoutChrome::from_site(&settings.site),
        images: settings.images.policy.clone(),
        content_base: settings.content.base_url.clone(),
    };

    serve_http(&settings, state).await
}

async fn run_render(
    settings: config::Settings,
    args: config::RenderArgs,
) -> Result<(), AppError> {
    let home = build_home_service(&settings)?;
    let blocks = home.load().await?;

    let content = HomeContext {
        blocks: page_blocks(&blocks, &settings.content.base_url, &settings.images.policy),
    };
    let view = LayoutContext::new(LayoutChrome::from_site(&settings.site), content);
    let html = HomeTemplate { view }
        .render()
        .map_err(|err| AppError::unexpected(format!("failed to render home page: {err}")))?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, &html)
                .await
                .map_err(|err| AppError::from(InfraError::Io(err)))?;
            info!(
                target = "vetrina::render",
                path = %path.display(),
                bytes = html.len(),
                "wrote rendered home page"
            );
        }
        None => println!("{html}"),
    }

    Ok(())
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "vetrina::server",
        addr = %settings.server.public_addr,
        "serving public site"
    );

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
        }
        () = shutdown_deadline(settings.server.graceful_shutdown) => {
            warn!(
                target = "vetrina::server",
                "graceful shutdown deadline exceeded, aborting remaining connections"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "vetrina::server", error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!(target = "vetrina::server", "shutdown signal received, draining connections");
}

async fn shutdown_deadline(grace: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}
