use reqwest::StatusCode;

use super::dto::LoggingEndpointsDto;
use super::AltitudeClient;
use crate::error::ProviderError;
use crate::model::LoggingEndpoints;

const PATH: &str = "/v1/admin/logging";

impl AltitudeClient {
    /// All logging endpoints visible to the client.
    pub async fn read_logging_endpoints(&self) -> Result<LoggingEndpoints, ProviderError> {
        let response = self.gateway.get(PATH).await?;

        match response.status {
            StatusCode::OK => Ok(LoggingEndpoints::from(response.json::<LoggingEndpointsDto>()?)),
            _ => Err(response.unexpected(StatusCode::OK)),
        }
    }
}
