use anyhow::{anyhow, Result};
use axum::{middleware, Router};
use axum_messages::MessagesManagerLayer;
use base64::prelude::*;
use tokio::signal;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{
    cookie::{self, Key},
    Expiry, MemoryStore, SessionManagerLayer,
};
use tracing::{info, warn};

pub mod cli;
pub mod config;
mod context;
pub mod controller;
pub mod error;
pub mod form;
pub mod registrar;
pub mod state;
pub mod view;

pub use {
    config::Config,
    context::{create_context, SignupContext},
    error::SignupError,
};

pub struct Signup {
    config: Config,
    context: SignupContext,
}

impl Signup {
    pub fn boot(config: Config) -> Result<Self> {
        let context = create_context(&config)?;

        Ok(Self { config, context })
    }

    pub async fn serve(self) -> Result<()> {
        let session_key = match self.config.session_key {
            Some(ref session_key) => decode_session_key(session_key)?,
            None => {
                warn!("Could not get SIGNUP_SESSION_KEY from environment. Falling back to generated key. This will invalidate any sessions when the server is stopped.");
                Key::generate()
            }
        };

        let router = app(self.context, session_key)
            .nest_service("/static", ServeDir::new(&self.config.static_dir));

        // Enable livereload for debug builds.
        #[cfg(debug_assertions)]
        let (router, _watcher) = livereload(router, &self.config.static_dir)?;

        let listener = tokio::net::TcpListener::bind(&self.config.bind_address).await?;
        info!("listening on {}", listener.local_addr()?);

        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// The registration routes with sessions, flash messages and layout rendering applied.
pub fn app(context: SignupContext, session_key: Key) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false) // @TODO make configurable once served behind TLS
        .with_expiry(Expiry::OnInactivity(cookie::time::Duration::days(1)))
        .with_signed(session_key);

    controller::routes()
        .layer(middleware::map_response(view::render_view))
        .layer(MessagesManagerLayer)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

pub fn decode_session_key(session_key: &str) -> Result<Key> {
    let session_key = BASE64_STANDARD.decode(session_key)?;

    Key::try_from(session_key.as_slice())
        .map_err(|_| anyhow!("session key must decode to at least 64 bytes"))
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}

#[cfg(debug_assertions)]
fn livereload(
    router: Router,
    static_dir: &std::path::Path,
) -> Result<(Router, notify::RecommendedWatcher)> {
    use notify::Watcher;

    let livereload = tower_livereload::LiveReloadLayer::new();
    let reloader = livereload.reloader();

    let router = router.layer(livereload);

    let mut watcher = notify::recommended_watcher(move |_| reloader.reload())?;
    watcher.watch(static_dir, notify::RecursiveMode::Recursive)?;

    Ok((router, watcher))
}
