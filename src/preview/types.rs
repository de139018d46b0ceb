/// A single request to provision a preview environment, built from CLI
/// input and never persisted.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    /// Pull request number
    pub pr_number: u64,
    /// Repository identifier in "owner/name" form
    pub repo_name: String,
    /// Branch under review
    pub branch: String,
    /// Commit to deploy
    pub commit_sha: String,
}

impl PreviewRequest {
    /// Abbreviated commit for logs and the fallback page.
    pub fn short_sha(&self) -> &str {
        self.commit_sha.get(..7).unwrap_or(&self.commit_sha)
    }
}

/// Success output of a `create` run, consumed by the calling pipeline.
#[derive(Debug, Clone)]
pub struct PreviewSummary {
    /// Preview URL, e.g. "http://203.0.113.10/"
    pub url: String,
    /// Public IP address of the instance
    pub address: String,
    /// Derived instance name
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sha_truncates() {
        let request = PreviewRequest {
            pr_number: 7,
            repo_name: "acme/widgets".to_string(),
            branch: "feature-x".to_string(),
            commit_sha: "abcdef1234567890".to_string(),
        };
        assert_eq!(request.short_sha(), "abcdef1");
    }

    #[test]
    fn test_short_sha_keeps_short_input() {
        let request = PreviewRequest {
            pr_number: 7,
            repo_name: "acme/widgets".to_string(),
            branch: "feature-x".to_string(),
            commit_sha: "abc".to_string(),
        };
        assert_eq!(request.short_sha(), "abc");
    }
}
