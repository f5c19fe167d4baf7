use async_trait::async_trait;

use crate::{GraphQLRequest, GraphQLResponse};

#[async_trait]
pub trait QueryExecutor {
    async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, String>;
}

pub struct HttpQueryExecutor {
    client: reqwest::Client,
    endpoint_url: String,
}

impl HttpQueryExecutor {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        HttpQueryExecutor {
            client: reqwest::Client::new(),
            endpoint_url: endpoint_url.into(),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl QueryExecutor for HttpQueryExecutor {
    async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, String> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| format!("Failed to send request to {}: {}", self.endpoint_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "Endpoint {} answered with status {}",
                self.endpoint_url, status
            ));
        }

        response
            .json::<GraphQLResponse>()
            .await
            .map_err(|e| format!("Failed to parse response from {}: {}", self.endpoint_url, e))
    }
}
