//! Health check command - checks a running portal server.

use std::time::Duration;

use crate::cli::HealthArgs;

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = args.url.trim_end_matches('/');
    let url = if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("unhealthy: failed to connect to {url}: {e}");
            std::process::exit(1);
        }
    };

    if !response.status().is_success() {
        eprintln!("unhealthy: server returned HTTP status {}", response.status());
        std::process::exit(1);
    }

    let body: serde_json::Value = response.json().await?;
    match body.get("status").and_then(|s| s.as_str()) {
        Some("healthy") => {
            println!("healthy: {body}");
            Ok(())
        }
        status => {
            eprintln!("unhealthy: server returned status {}", status.unwrap_or("<missing>"));
            std::process::exit(1);
        }
    }
}
