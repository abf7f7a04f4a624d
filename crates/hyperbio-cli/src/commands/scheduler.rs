//! Scheduler commands.

use anyhow::Result;

use super::print_json;

pub async fn nightly(api_url: &str) -> Result<()> {
    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/scheduler/enqueue-nightly", api_url))
        .send()
        .await?;
    print_json(response).await
}
