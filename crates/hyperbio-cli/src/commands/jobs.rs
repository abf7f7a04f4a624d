//! Job commands.

use anyhow::{Context, Result};

use super::print_json;

pub async fn enqueue(api_url: &str, job_type: &str, payload: &str) -> Result<()> {
    let payload: serde_json::Value =
        serde_json::from_str(payload).context("payload must be valid JSON")?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/jobs", api_url))
        .json(&serde_json::json!({ "job_type": job_type, "payload": payload }))
        .send()
        .await?;
    print_json(response).await
}

pub async fn get(api_url: &str, id: i64) -> Result<()> {
    let response = reqwest::get(format!("{}/api/v1/jobs/{}", api_url, id)).await?;
    print_json(response).await
}

pub async fn list(api_url: &str, status: Option<&str>, limit: i64) -> Result<()> {
    let mut request = reqwest::Client::new()
        .get(format!("{}/api/v1/jobs", api_url))
        .query(&[("limit", limit.to_string())]);
    if let Some(status) = status {
        request = request.query(&[("status", status)]);
    }
    print_json(request.send().await?).await
}
