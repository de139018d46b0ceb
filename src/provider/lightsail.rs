use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_lightsail::types::{NetworkProtocol, PortInfo, Tag as LightsailTag};
use aws_sdk_lightsail::Client;
use tracing::debug;

use super::{CloudProvider, DeleteOutcome, Instance, InstanceSpec, InstanceState, ProviderError};

/// AWS Lightsail implementation of [`CloudProvider`].
///
/// Credentials come from the default AWS credential chain (environment,
/// profile, instance role); only the region is taken from CLI/config.
pub struct LightsailProvider {
    client: Client,
}

impl LightsailProvider {
    pub async fn new(region: String) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;
        LightsailProvider {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl CloudProvider for LightsailProvider {
    async fn get_instance(&self, name: &str) -> Result<Option<Instance>, ProviderError> {
        debug!(instance = %name, "GetInstance");
        let output = match self.client.get_instance().instance_name(name).send().await {
            Ok(output) => output,
            Err(err) => {
                let err = err.into_service_error();
                if err.is_not_found_exception() {
                    return Ok(None);
                }
                return Err(ProviderError::api("GetInstance", err));
            }
        };

        let Some(instance) = output.instance else {
            return Ok(None);
        };
        let state = instance
            .state
            .and_then(|state| state.name)
            .map(|raw| InstanceState::parse(&raw))
            .unwrap_or(InstanceState::Other("unknown".to_string()));

        Ok(Some(Instance {
            name: instance.name.unwrap_or_else(|| name.to_string()),
            state,
            public_ip: instance.public_ip_address,
        }))
    }

    async fn create_instance(&self, spec: &InstanceSpec) -> Result<(), ProviderError> {
        debug!(instance = %spec.name, zone = %spec.availability_zone, "CreateInstances");
        let mut request = self
            .client
            .create_instances()
            .instance_names(&spec.name)
            .availability_zone(&spec.availability_zone)
            .blueprint_id(&spec.blueprint_id)
            .bundle_id(&spec.bundle_id)
            .user_data(&spec.user_data);
        for tag in &spec.tags {
            request = request.tags(
                LightsailTag::builder()
                    .key(&tag.key)
                    .value(&tag.value)
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|err| ProviderError::api("CreateInstances", err.into_service_error()))?;
        Ok(())
    }

    async fn open_ports(&self, name: &str, ports: &[u16]) -> Result<(), ProviderError> {
        debug!(instance = %name, ?ports, "PutInstancePublicPorts");
        let mut request = self.client.put_instance_public_ports().instance_name(name);
        for port in ports {
            request = request.port_infos(
                PortInfo::builder()
                    .from_port(i32::from(*port))
                    .to_port(i32::from(*port))
                    .protocol(NetworkProtocol::Tcp)
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|err| ProviderError::api("PutInstancePublicPorts", err.into_service_error()))?;
        Ok(())
    }

    async fn delete_instance(&self, name: &str) -> Result<DeleteOutcome, ProviderError> {
        debug!(instance = %name, "DeleteInstance");
        match self.client.delete_instance().instance_name(name).send().await {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_not_found_exception() {
                    return Ok(DeleteOutcome::AlreadyAbsent);
                }
                Err(ProviderError::api("DeleteInstance", err))
            }
        }
    }
}
