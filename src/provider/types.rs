/// Instance lifecycle state as reported by the cloud provider.
/// Only `pending` and `running` drive decisions; everything else is
/// carried through verbatim for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    Pending,
    Running,
    Other(String),
}

impl InstanceState {
    /// Map the provider's state name onto the states the tool cares about.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => InstanceState::Pending,
            "running" => InstanceState::Running,
            other => InstanceState::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceState::Pending => write!(f, "pending"),
            InstanceState::Running => write!(f, "running"),
            InstanceState::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Provider-owned instance record, reduced to the attributes this tool consumes.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Instance name
    pub name: String,
    /// Current lifecycle state
    pub state: InstanceState,
    /// Public IP address, absent until the instance is running
    pub public_ip: Option<String>,
}

/// Provenance tag attached to a created instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Tag {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Everything the provider needs to create a preview instance.
#[derive(Debug, Clone)]
pub struct InstanceSpec {
    /// Derived instance name
    pub name: String,
    /// Full availability zone (e.g., "us-east-1a")
    pub availability_zone: String,
    /// OS image identifier
    pub blueprint_id: String,
    /// Instance size identifier
    pub bundle_id: String,
    /// Bootstrap script executed by the instance at first boot
    pub user_data: String,
    /// Provenance tags (PR number, repository, branch, managing system)
    pub tags: Vec<Tag>,
}

/// Result of a delete request. "Not found" is a success, not an error,
/// so repeated or out-of-order delete calls are safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_state_parse() {
        assert_eq!(InstanceState::parse("pending"), InstanceState::Pending);
        assert_eq!(InstanceState::parse("running"), InstanceState::Running);
        assert_eq!(
            InstanceState::parse("stopping"),
            InstanceState::Other("stopping".to_string())
        );
    }

    #[test]
    fn test_instance_state_display() {
        assert_eq!(InstanceState::Pending.to_string(), "pending");
        assert_eq!(InstanceState::Running.to_string(), "running");
        assert_eq!(InstanceState::Other("stopped".to_string()).to_string(), "stopped");
    }

    #[test]
    fn test_tag_new() {
        let tag = Tag::new("PR", "42");
        assert_eq!(tag.key, "PR");
        assert_eq!(tag.value, "42");
    }
}
