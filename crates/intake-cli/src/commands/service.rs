use intake_client::{ChatRequest, ServiceClient};
use intake_config::Settings;
use intake_core::Result;
use std::time::Duration;

fn client(settings: &Settings, url: Option<&str>) -> Result<ServiceClient> {
    match url {
        Some(url) => ServiceClient::new(
            url,
            Duration::from_secs(settings.api_request_timeout),
            settings.max_api_retries,
        ),
        None => ServiceClient::from_settings(settings),
    }
}

pub(super) async fn cmd_health(settings: &Settings, url: Option<&str>) -> Result<()> {
    let client = client(settings, url)?;
    println!("Checking health at {}...", client.base_url());
    let health = client.health().await?;
    let icon = if health.is_healthy() { "✅" } else { "❌" };
    println!("{icon} {}", health.status);
    for (name, status) in &health.services {
        println!("   {name}: {status}");
    }
    Ok(())
}

pub(super) async fn cmd_chat(
    settings: &Settings,
    url: Option<&str>,
    message: String,
    session: Option<String>,
) -> Result<()> {
    let client = client(settings, url)?;
    let request = match session {
        Some(id) => ChatRequest::new(message, id),
        None => ChatRequest::new_session(message),
    };
    let reply = client.send_message(&request).await?;

    println!("{}", reply.response);
    println!();
    println!("   session: {}", request.session_id);
    for (field, value) in reply.extracted_fields() {
        println!("   {field}: {value}");
    }
    if let Some(score) = reply.confidence_score {
        println!("   confidence: {score:.2}");
    }
    if let Some(ref summary) = reply.validation_summary {
        println!("   validation errors: {}", summary.total_errors);
    }
    if reply.consultation_created == Some(true) {
        println!("   ✅ consultation created");
    }
    Ok(())
}

pub(super) async fn cmd_consultations(settings: &Settings, url: Option<&str>) -> Result<()> {
    let items = client(settings, url)?.consultations().await?;
    if items.is_empty() {
        println!("No consultations.");
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
