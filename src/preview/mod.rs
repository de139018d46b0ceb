pub mod bootstrap;
pub mod name;
pub mod types;

pub use types::{PreviewRequest, PreviewSummary};

use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::provider::{CloudProvider, DeleteOutcome, InstanceSpec, InstanceState, ProviderError, Tag};

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("instance {name} did not become ready within {waited_secs}s")]
    ReadyTimeout { name: String, waited_secs: u64 },
}

/// Drives the provisioning workflow for one preview environment:
/// derive name, check existence, create, poll until ready, open ports,
/// verify the deployment responds. The provider client is injected so the
/// whole sequence runs against a substitute in tests.
///
/// One invocation is fully sequential. Running `create` and `delete`
/// concurrently for the same PR is not supported; the calling pipeline is
/// expected to serialize runs per PR.
pub struct Orchestrator<P> {
    provider: P,
    config: Config,
}

impl<P: CloudProvider> Orchestrator<P> {
    pub fn new(provider: P, config: Config) -> Self {
        Orchestrator { provider, config }
    }

    /// Create or update the preview environment for a pull request and
    /// return the resulting URL and instance identifiers.
    #[instrument(skip(self, request), fields(pr = request.pr_number, repo = %request.repo_name))]
    pub async fn create_preview(
        &self,
        request: &PreviewRequest,
    ) -> Result<PreviewSummary, PreviewError> {
        let name = name::instance_name(&request.repo_name, request.pr_number);
        info!(
            instance = %name,
            branch = %request.branch,
            commit = %request.short_sha(),
            "creating preview environment"
        );

        let address = self.ensure_instance(&name, request).await?;
        let url = format!("http://{}/", address);

        self.await_preview(&url).await;

        Ok(PreviewSummary { url, address, name })
    }

    /// Tear down the preview environment for a pull request. Absent
    /// instances count as success, so repeated deletes are safe. Returns
    /// the derived instance name.
    #[instrument(skip(self))]
    pub async fn delete_preview(
        &self,
        pr_number: u64,
        repo_name: &str,
    ) -> Result<String, PreviewError> {
        let name = name::instance_name(repo_name, pr_number);
        info!(instance = %name, "tearing down preview environment");

        match self.provider.delete_instance(&name).await? {
            DeleteOutcome::Deleted => info!(instance = %name, "instance deletion initiated"),
            DeleteOutcome::AlreadyAbsent => {
                info!(instance = %name, "instance not found, already deleted")
            }
        }
        Ok(name)
    }

    /// Return the address of the named instance, creating it first if the
    /// provider does not know it. Creation happens at most once per name:
    /// a second `create` run observes the existing instance and goes
    /// straight to deployment.
    async fn ensure_instance(
        &self,
        name: &str,
        request: &PreviewRequest,
    ) -> Result<String, PreviewError> {
        if let Some(instance) = self.provider.get_instance(name).await? {
            info!(instance = %instance.name, state = %instance.state, "instance already exists, updating deployment");
            return match instance.public_ip {
                Some(ip) => Ok(ip),
                // Exists but still coming up (an earlier run may have been killed
                // mid-provisioning); resume waiting instead of creating.
                None => self.poll_until_ready(name).await,
            };
        }

        let spec = self.instance_spec(name, request);
        info!(
            instance = %name,
            zone = %spec.availability_zone,
            blueprint = %spec.blueprint_id,
            bundle = %spec.bundle_id,
            "requesting instance creation"
        );
        self.provider.create_instance(&spec).await?;

        let address = self.poll_until_ready(name).await?;
        self.open_ports(name).await;
        Ok(address)
    }

    fn instance_spec(&self, name: &str, request: &PreviewRequest) -> InstanceSpec {
        InstanceSpec {
            name: name.to_string(),
            availability_zone: self.config.provider.zone(),
            blueprint_id: self.config.provider.blueprint_id.clone(),
            bundle_id: self.config.provider.bundle_id.clone(),
            user_data: bootstrap::user_data(request, self.config.deploy.flavor),
            tags: provenance_tags(request),
        }
    }

    /// Poll the provider at a fixed interval until the instance reports
    /// running with a public address. Query errors are retried until the
    /// deadline. On timeout the instance is left running for inspection;
    /// no rollback is attempted.
    async fn poll_until_ready(&self, name: &str) -> Result<String, PreviewError> {
        let timeout = Duration::from_secs(self.config.provision.ready_timeout_secs);
        let interval = Duration::from_secs(self.config.provision.poll_interval_secs);
        let deadline = Instant::now() + timeout;

        info!(instance = %name, timeout_secs = timeout.as_secs(), "waiting for instance to be ready");
        loop {
            match self.provider.get_instance(name).await {
                Ok(Some(instance)) => {
                    info!(instance = %name, state = %instance.state, "instance status");
                    if instance.state == InstanceState::Running {
                        if let Some(ip) = instance.public_ip {
                            info!(instance = %name, address = %ip, "instance ready");
                            return Ok(ip);
                        }
                    }
                }
                Ok(None) => debug!(instance = %name, "instance not visible yet"),
                Err(err) => debug!(instance = %name, error = %err, "status query failed, retrying"),
            }

            if Instant::now() >= deadline {
                return Err(PreviewError::ReadyTimeout {
                    name: name.to_string(),
                    waited_secs: timeout.as_secs(),
                });
            }
            sleep(interval).await;
        }
    }

    /// Open the configured inbound ports. Best-effort: the preview may
    /// still be reachable if ports were pre-opened, so a failure here is
    /// logged and the flow continues.
    async fn open_ports(&self, name: &str) {
        let ports = &self.config.provision.open_ports;
        match self.provider.open_ports(name, ports).await {
            Ok(()) => info!(instance = %name, ?ports, "firewall configured"),
            Err(err) => warn!(instance = %name, error = %err, "firewall configuration failed, continuing"),
        }
    }

    /// Probe the preview URL until it answers or the health deadline
    /// passes. Replaces the fixed post-boot sleep: succeeds as soon as the
    /// bootstrap has nginx serving, instead of waiting a blind two minutes.
    /// Best-effort: a timeout is logged, the URL is still reported.
    async fn await_preview(&self, url: &str) {
        let timeout = Duration::from_secs(self.config.deploy.health_timeout_secs);
        let interval = Duration::from_secs(self.config.deploy.health_interval_secs);
        let deadline = Instant::now() + timeout;

        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                warn!(error = %err, "could not build health probe client, skipping deployment check");
                return;
            }
        };

        info!(%url, timeout_secs = timeout.as_secs(), "waiting for preview to respond");
        while Instant::now() < deadline {
            match client.get(url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!(%url, "preview is responding");
                    return;
                }
                Ok(response) => {
                    debug!(%url, status = %response.status(), "preview not ready yet")
                }
                Err(err) => debug!(%url, error = %err, "preview not reachable yet"),
            }
            sleep(interval).await;
        }
        warn!(%url, "preview did not respond before the deadline, bootstrap may still be running");
    }
}

/// Tags recording where the instance came from and what manages it.
fn provenance_tags(request: &PreviewRequest) -> Vec<Tag> {
    vec![
        Tag::new("Type", "PR-Preview"),
        Tag::new("PR", request.pr_number.to_string()),
        Tag::new("Repository", request.repo_name.clone()),
        Tag::new("Branch", request.branch.clone()),
        Tag::new("ManagedBy", "GitHub-Actions"),
    ]
}
