use async_trait::async_trait;
use derive_masked::DebugMasked;
use derive_more::derive::Display;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};

mod memory;
mod remote;

pub use memory::MemoryRegistrar;
pub use remote::RemoteRegistrar;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The registration action refused the request. The message is shown to the user as-is.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("registration endpoint responded with {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}

/// Payload handed to the registration action.
#[derive(Clone, DebugMasked, Display, Deserialize, Serialize, PartialEq, Eq)]
#[display("Email: {email} Name: {full_name} Role: {role} State: {state} Password: REDACTED")]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    #[masked]
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub aadhar: String,
    pub role: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Body returned by the registration action. Only an object carrying a non-empty `error`
/// string is a rejection; any other body (empty, plain text, `true`, `null`) counts as success.
#[derive(Debug, Default)]
pub struct RegistrationResponse {
    pub error: Option<String>,
}

impl RegistrationResponse {
    pub fn from_body(body: &[u8]) -> Self {
        let error = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| match value.get("error") {
                Some(serde_json::Value::String(error)) if !error.is_empty() => Some(error.clone()),
                _ => None,
            });

        Self { error }
    }

    pub fn into_result(self) -> Result<()> {
        match self.error {
            Some(error) => Err(Error::Rejected(error)),
            None => Ok(()),
        }
    }
}

#[async_trait]
pub trait Registrar: Send + Sync + DynClone {
    async fn register(&self, registration: &Registration) -> Result<()>;
}
dyn_clone::clone_trait_object!(Registrar);
