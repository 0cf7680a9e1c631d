//! [`MessageBus`] over the RabbitMQ management HTTP API.
//!
//! Plain AMQP cannot enumerate queues, so listing and deletion both go through
//! the management plugin:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | connect | `GET /api/overview` |
//! | list queues | `GET /api/queues/{vhost}?columns=name` |
//! | delete queue | `DELETE /api/queues/{vhost}/{name}` |
//! | delete exchange | `DELETE /api/exchanges/{vhost}/{name}` |
//!
//! A 404 on delete means the resource is already gone and is reported as
//! [`Deletion::AlreadyAbsent`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info};

use super::{BusConnector, BusError, Deletion, MessageBus};
use crate::config::BrokerConfig;

#[derive(Debug, Deserialize)]
struct QueueInfo {
    name: String,
}

/// Opens a [`ManagementBus`] per [`BusConnector::connect`] call.
#[derive(Debug, Clone)]
pub struct ManagementConnector {
    config: BrokerConfig,
}

impl ManagementConnector {
    pub fn new(config: &BrokerConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl BusConnector for ManagementConnector {
    async fn connect(&self) -> Result<Box<dyn MessageBus>, BusError> {
        let bus = ManagementBus::connect(&self.config).await?;
        Ok(Box::new(bus))
    }
}

#[derive(Debug)]
pub struct ManagementBus {
    client: Client,
    base: Url,
    vhost: String,
    user: String,
    password: String,
}

impl ManagementBus {
    /// Build a client and verify the API is reachable with the configured credentials.
    pub async fn connect(config: &BrokerConfig) -> Result<Self, BusError> {
        let connect_err = |message: String| BusError::Connect {
            url: config.management_url.clone(),
            message,
        };

        let base = Url::parse(&config.management_url).map_err(|e| connect_err(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(connect_err("management URL cannot be a base URL".into()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| connect_err(e.to_string()))?;

        let bus = Self {
            client,
            base,
            vhost: config.vhost.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        };

        let url = bus.endpoint(&["api", "overview"]);
        let response = bus
            .authed(bus.client.get(url))
            .send()
            .await
            .map_err(|e| connect_err(e.to_string()))?;
        bus.check(response, "overview").await?;

        info!(url = %bus.base, vhost = %bus.vhost, "connected to broker management API");
        Ok(bus)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // connect() rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.user, Some(&self.password))
    }

    async fn check(&self, response: Response, resource: &str) -> Result<Response, BusError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(BusError::Authentication {
                user: self.user.clone(),
            });
        }
        Err(BusError::Status {
            resource: resource.to_string(),
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }

    async fn delete(&self, collection: &str, name: &str) -> Result<Deletion, BusError> {
        let resource = format!("{collection}/{name}");
        let url = self.endpoint(&["api", collection, self.vhost.as_str(), name]);
        let response = self
            .authed(self.client.delete(url))
            .send()
            .await
            .map_err(|source| BusError::Http {
                resource: resource.clone(),
                source,
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Deletion::AlreadyAbsent);
        }
        self.check(response, &resource).await?;
        Ok(Deletion::Deleted)
    }
}

#[async_trait]
impl MessageBus for ManagementBus {
    async fn list_queues(&mut self) -> Result<Vec<String>, BusError> {
        let resource = format!("queues/{}", self.vhost);
        let mut url = self.endpoint(&["api", "queues", self.vhost.as_str()]);
        url.set_query(Some("columns=name"));

        let response = self
            .authed(self.client.get(url))
            .send()
            .await
            .map_err(|source| BusError::Http {
                resource: resource.clone(),
                source,
            })?;
        let response = self.check(response, &resource).await?;

        let queues: Vec<QueueInfo> = response.json().await.map_err(|e| BusError::Malformed {
            resource,
            message: e.to_string(),
        })?;
        Ok(queues.into_iter().map(|q| q.name).collect())
    }

    async fn delete_queue(&mut self, name: &str) -> Result<Deletion, BusError> {
        self.delete("queues", name).await
    }

    async fn delete_exchange(&mut self, name: &str) -> Result<Deletion, BusError> {
        self.delete("exchanges", name).await
    }
}

impl Drop for ManagementBus {
    fn drop(&mut self) {
        debug!(url = %self.base, "released broker management session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus(base: &str, vhost: &str) -> ManagementBus {
        ManagementBus {
            client: Client::new(),
            base: Url::parse(base).unwrap(),
            vhost: vhost.into(),
            user: "guest".into(),
            password: "guest".into(),
        }
    }

    #[test]
    fn endpoint_encodes_default_vhost() {
        let bus = bus("http://localhost:15672", "/");
        let url = bus.endpoint(&["api", "queues", "/", "taurus.dynamodb"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:15672/api/queues/%2F/taurus.dynamodb"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let bus = bus("http://broker/rabbitmq/", "taurus");
        let url = bus.endpoint(&["api", "overview"]);
        assert_eq!(url.as_str(), "http://broker/rabbitmq/api/overview");
    }
}
