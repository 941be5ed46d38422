use std::time::Duration;

use anyhow::{Context as _, Result};
use reqwest::Url;
use tracing::{info, warn};

use crate::{
    config::Config,
    registrar::{MemoryRegistrar, Registrar, RemoteRegistrar},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct SignupContext {
    pub registrar: Box<dyn Registrar>,
    pub login_url: String,
    pub redirect_delay: Duration,
}

impl SignupContext {
    pub fn new(registrar: impl Registrar + 'static) -> Self {
        Self {
            registrar: Box::new(registrar),
            login_url: "/login".to_string(),
            redirect_delay: Duration::from_secs(2),
        }
    }

    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    pub fn with_redirect_delay(mut self, redirect_delay: Duration) -> Self {
        self.redirect_delay = redirect_delay;
        self
    }

    /// Value of the `Refresh` header that sends the browser to the login page.
    pub fn login_refresh(&self) -> String {
        format!("{}; url={}", self.redirect_delay.as_secs(), self.login_url)
    }
}

pub fn create_context(config: &Config) -> Result<SignupContext> {
    let context = match config.registrar.endpoint {
        Some(ref endpoint) => {
            let endpoint = Url::parse(endpoint)
                .with_context(|| format!("invalid registrar endpoint: {endpoint}"))?;
            info!("registrations will be sent to {endpoint}");
            SignupContext::new(RemoteRegistrar::new(endpoint, config.registrar.timeout())?)
        }
        None => {
            warn!("No registrar endpoint configured. Falling back to in-memory registrations. These will be lost when the server is stopped.");
            SignupContext::new(MemoryRegistrar::new())
        }
    };

    Ok(context
        .with_login_url(config.login_url.clone())
        .with_redirect_delay(config.redirect_delay()))
}
