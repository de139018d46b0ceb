use colored::Colorize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::preview::PreviewSummary;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write pipeline output file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Environment variable naming the pipeline output file (GitHub Actions
/// convention). When unset, the tool is running outside a pipeline and
/// only the console summary is produced.
pub const CI_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Print the human-readable success banner for a created preview.
pub fn print_summary(summary: &PreviewSummary) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{}", "Preview Environment Ready!".green().bold());
    println!("{}", "=".repeat(60));
    println!("URL: {}", summary.url);
    println!("Instance: {}", summary.name);
    println!();
}

/// Print the confirmation banner for a torn-down preview.
pub fn print_teardown(instance_name: &str) {
    println!();
    println!("{}", "Preview environment removed".green().bold());
    println!("Instance: {}", instance_name);
    println!();
}

/// Append the machine-readable outputs to the pipeline output file if one
/// was provided via GITHUB_OUTPUT. Later workflow steps read these lines.
#[instrument(skip(summary))]
pub fn emit_ci_outputs(summary: &PreviewSummary) -> Result<(), OutputError> {
    match std::env::var(CI_OUTPUT_ENV) {
        Ok(path) => write_ci_outputs(summary, Path::new(&path)),
        Err(_) => {
            debug!("{} not set, skipping pipeline outputs", CI_OUTPUT_ENV);
            Ok(())
        }
    }
}

/// Append `key=value` output lines to the given file. Appending (rather
/// than truncating) matches the pipeline contract: earlier steps may have
/// written their own outputs to the same file.
pub fn write_ci_outputs(summary: &PreviewSummary, path: &Path) -> Result<(), OutputError> {
    debug!(path = %path.display(), "writing pipeline outputs");
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "preview_url={}", summary.url)?;
    writeln!(file, "instance_ip={}", summary.address)?;
    writeln!(file, "instance_name={}", summary.name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> PreviewSummary {
        PreviewSummary {
            url: "http://10.0.0.5/".to_string(),
            address: "10.0.0.5".to_string(),
            name: "pr-7-widgets".to_string(),
        }
    }

    #[test]
    fn test_write_ci_outputs() {
        let path = std::env::temp_dir().join("test_ci_outputs.txt");
        std::fs::remove_file(&path).ok();

        write_ci_outputs(&sample_summary(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "preview_url=http://10.0.0.5/\ninstance_ip=10.0.0.5\ninstance_name=pr-7-widgets\n"
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_ci_outputs_appends() {
        let path = std::env::temp_dir().join("test_ci_outputs_append.txt");
        std::fs::write(&path, "earlier_step=done\n").unwrap();

        write_ci_outputs(&sample_summary(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier_step=done\n"));
        assert!(content.contains("preview_url=http://10.0.0.5/\n"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_print_banners_do_not_panic() {
        print_summary(&sample_summary());
        print_teardown("pr-7-widgets");
    }
}
