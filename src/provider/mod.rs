pub mod lightsail;
pub mod types;

pub use types::{DeleteOutcome, Instance, InstanceSpec, InstanceState, Tag};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{operation} request failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub(crate) fn api(operation: &'static str, err: impl std::fmt::Display) -> Self {
        ProviderError::Api {
            operation,
            message: err.to_string(),
        }
    }
}

/// Cloud provider client consumed by the orchestrator.
///
/// The orchestrator receives an implementation explicitly, so the
/// existence-check / create / poll / delete sequence can be exercised
/// against a substitute in tests.
///
/// Contract: `get_instance` returns `Ok(None)` when the provider reports
/// "not found" (meaning the instance needs creation), and `delete_instance`
/// maps "not found" to `DeleteOutcome::AlreadyAbsent` rather than an error.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Look up an instance by name. `Ok(None)` means it does not exist.
    async fn get_instance(&self, name: &str) -> Result<Option<Instance>, ProviderError>;

    /// Request creation of a new instance. Returns once the request is
    /// accepted; the instance comes up asynchronously.
    async fn create_instance(&self, spec: &InstanceSpec) -> Result<(), ProviderError>;

    /// Open the given inbound TCP ports on the instance firewall.
    async fn open_ports(&self, name: &str, ports: &[u16]) -> Result<(), ProviderError>;

    /// Request deletion of an instance. Absent instances are not an error.
    async fn delete_instance(&self, name: &str) -> Result<DeleteOutcome, ProviderError>;
}
