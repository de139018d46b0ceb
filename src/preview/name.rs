/// Lightsail resource name limit.
const MAX_NAME_LEN: usize = 63;

/// Derive the instance name for a pull request.
///
/// The name must be stable (same inputs, same name) so repeated `create`
/// calls on a PR update the existing instance and `delete` can locate it
/// without a lookup table. Normalization rule: take the segment after the
/// last `/`, map every non-alphanumeric character to `-`, collapse runs of
/// `-`, trim dashes at both ends, keep case as-is, then prefix with
/// `pr-{number}-` and truncate to the provider's 63-character limit.
///
/// `instance_name("my-org/My_Repo.App", 42)` yields `"pr-42-My-Repo-App"`.
///
/// Pure and total: no network access, never fails.
pub fn instance_name(repo_name: &str, pr_number: u64) -> String {
    let repo = repo_name.rsplit('/').next().unwrap_or(repo_name);

    let mut cleaned = String::with_capacity(repo.len());
    for ch in repo.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch);
        } else if !cleaned.is_empty() && !cleaned.ends_with('-') {
            cleaned.push('-');
        }
    }
    let cleaned = cleaned.trim_end_matches('-');

    let mut name = if cleaned.is_empty() {
        format!("pr-{}", pr_number)
    } else {
        format!("pr-{}-{}", pr_number, cleaned)
    };
    name.truncate(MAX_NAME_LEN);
    while name.ends_with('-') {
        name.pop();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_and_case_handling() {
        assert_eq!(instance_name("my-org/My_Repo.App", 42), "pr-42-My-Repo-App");
    }

    #[test]
    fn test_owner_prefix_is_stripped() {
        assert_eq!(instance_name("acme/widgets", 7), "pr-7-widgets");
    }

    #[test]
    fn test_deterministic() {
        let first = instance_name("acme/widgets", 7);
        let second = instance_name("acme/widgets", 7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_separator_runs_collapse() {
        assert_eq!(instance_name("org/a__b..c", 1), "pr-1-a-b-c");
    }

    #[test]
    fn test_length_bounded_to_provider_limit() {
        let long_repo = format!("org/{}", "x".repeat(100));
        let name = instance_name(&long_repo, 123456);
        assert!(name.len() <= 63);
        assert!(name.starts_with("pr-123456-"));
    }

    #[test]
    fn test_allowed_charset() {
        let name = instance_name("org/Weird Name!@#$%", 9);
        assert!(name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-'));
        assert!(!name.ends_with('-'));
    }

    #[test]
    fn test_repo_without_owner() {
        assert_eq!(instance_name("widgets", 3), "pr-3-widgets");
    }

    #[test]
    fn test_repo_with_no_usable_characters() {
        assert_eq!(instance_name("org/___", 5), "pr-5");
    }
}
