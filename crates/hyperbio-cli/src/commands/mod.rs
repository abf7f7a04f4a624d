//! CLI commands.

pub mod jobs;
pub mod scheduler;
pub mod worker;

use anyhow::Result;

/// Print a response body as pretty JSON, falling back to raw text.
pub(crate) async fn print_json(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body = response.text().await?;
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", body),
    }
    if !status.is_success() {
        anyhow::bail!("request failed with status {}", status);
    }
    Ok(())
}
