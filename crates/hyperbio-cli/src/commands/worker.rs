//! Worker commands.

use anyhow::Result;

use super::print_json;

pub async fn tick(api_url: &str, count: u32) -> Result<()> {
    let client = reqwest::Client::new();
    for _ in 0..count {
        let response = client
            .post(format!("{}/api/v1/worker/tick", api_url))
            .send()
            .await?;
        print_json(response).await?;
    }
    Ok(())
}

pub async fn status(api_url: &str) -> Result<()> {
    let response = reqwest::get(format!("{}/api/v1/worker/status", api_url)).await?;
    print_json(response).await
}
