use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client, Url};
use tracing::debug;

use super::{Error, Registrar, Registration, RegistrationResponse, Result};

/// Posts registrations as JSON to an HTTP registration action.
#[derive(Clone, Debug)]
pub struct RemoteRegistrar {
    client: Client,
    endpoint: Url,
}

impl RemoteRegistrar {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Registrar for RemoteRegistrar {
    async fn register(&self, registration: &Registration) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(USER_AGENT, "signup")
            .json(registration)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!("registration endpoint responded with {status} ({} bytes)", body.len());

        RegistrationResponse::from_body(&body).into_result()?;

        if !status.is_success() {
            return Err(Error::UnexpectedStatus(status));
        }

        Ok(())
    }
}
