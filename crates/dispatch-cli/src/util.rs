use anyhow::{anyhow, Result};
use dispatch_core::error::CoreError;
use dispatch_core::gateway::SqliteGateway;
use uuid::Uuid;

pub async fn resolve_trip_id(gateway: &SqliteGateway, short_id: &str) -> Result<Uuid> {
    if let Ok(id) = short_id.parse::<Uuid>() {
        return Ok(id);
    }
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::Validation(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let trips = gateway.find_by_short_id(short_id).await?;
    if trips.len() == 1 {
        Ok(trips[0].id)
    } else if trips.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No trip found with ID ending in '{}'",
            short_id
        ))))
    } else {
        let trip_info: Vec<(String, String)> = trips
            .into_iter()
            .map(|t| (t.id.to_string(), t.job_number))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(trip_info)))
    }
}

/// The last eight hex digits, which is what `resolve_trip_id` matches on.
pub fn short_id(id: &Uuid) -> String {
    let hex = id.simple().to_string();
    hex[hex.len() - 8..].to_string()
}
