use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::{Error, Registrar, Registration, Result};

/// Keeps registrations in process memory, keyed by email.
#[derive(Clone, Default)]
pub struct MemoryRegistrar {
    registrations: Arc<RwLock<HashMap<String, Registration>>>,
}

impl MemoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, email: &str) -> Option<Registration> {
        self.registrations.read().await.get(email).cloned()
    }

    pub async fn len(&self) -> usize {
        self.registrations.read().await.len()
    }
}

#[async_trait]
impl Registrar for MemoryRegistrar {
    async fn register(&self, registration: &Registration) -> Result<()> {
        let mut registrations = self.registrations.write().await;

        if registrations.contains_key(&registration.email) {
            return Err(Error::Rejected(
                "A user with the same email already exists".to_string(),
            ));
        }

        info!("registered {registration}");
        registrations.insert(registration.email.clone(), registration.clone());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::tests::registration;

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let registrar = MemoryRegistrar::new();

        registrar.register(&registration()).await.unwrap();
        let err = registrar.register(&registration()).await.unwrap_err();

        assert_eq!(err.to_string(), "A user with the same email already exists");
        assert_eq!(registrar.len().await, 1);
    }

    #[tokio::test]
    async fn keeps_distinct_emails() {
        let registrar = MemoryRegistrar::new();
        let mut other = registration();
        other.email = "ravi@example.com".into();

        registrar.register(&registration()).await.unwrap();
        registrar.register(&other).await.unwrap();

        assert_eq!(registrar.len().await, 2);
        assert_eq!(
            registrar.get("ravi@example.com").await.map(|r| r.full_name),
            Some("Asha Rao".to_string())
        );
    }
}
