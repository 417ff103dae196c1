use crate::core::{ConfigProvider, SaleId, SaleRecord, SaleRepository};
use crate::utils::error::{LedgerError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:4000/api/producto/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// REST client for the `producto` resource.
#[derive(Debug, Clone)]
pub struct ProductoClient {
    client: Client,
    base: Url,
}

impl ProductoClient {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let base = normalize_base(endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        tracing::debug!("Producto client targeting {}", base);
        Ok(Self { client, base })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.api_endpoint(), config.request_timeout_secs())
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        {
            let mut path = url.path_segments_mut().map_err(|_| LedgerError::ConfigError {
                message: format!("API endpoint cannot be used as a base URL: {}", self.base),
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn ensure_success(response: Response, id: Option<&SaleId>) -> Result<Response> {
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("API request failed with status {}: {}", status, body);

        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => Err(LedgerError::NotFoundError { id: id.to_string() }),
            _ => Err(LedgerError::ApiStatusError {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

fn normalize_base(endpoint: &str) -> Result<Url> {
    let trimmed = endpoint.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    Url::parse(&with_slash).map_err(|e| LedgerError::InvalidConfigValueError {
        field: "api.endpoint".to_string(),
        value: endpoint.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

#[async_trait]
impl SaleRepository for ProductoClient {
    async fn list(&self) -> Result<Vec<SaleRecord>> {
        let url = self.url_for(&[])?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response, None).await?;
        let records: Vec<SaleRecord> = response.json().await?;
        tracing::info!("Fetched {} sale records", records.len());
        Ok(records)
    }

    async fn get(&self, id: &SaleId) -> Result<SaleRecord> {
        let url = self.url_for(&[id.as_str()])?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, record: &SaleRecord) -> Result<SaleRecord> {
        let url = self.url_for(&[])?;
        let mut payload = record.clone();
        payload.id = None;

        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(&payload).send().await?;
        let response = Self::ensure_success(response, None).await?;
        let created: SaleRecord = response.json().await?;
        tracing::info!("Created sale record {:?}", created.id);
        Ok(created)
    }

    async fn update(&self, id: &SaleId, record: &SaleRecord) -> Result<SaleRecord> {
        let url = self.url_for(&[id.as_str()])?;
        let mut payload = record.clone();
        payload.id = Some(id.clone());

        tracing::debug!("PUT {}", url);
        let response = self.client.put(url).json(&payload).send().await?;
        let response = Self::ensure_success(response, Some(id)).await?;
        let mut updated: SaleRecord = response.json().await?;
        if updated.id.is_none() {
            updated.id = Some(id.clone());
        }
        tracing::info!("Updated sale record {}", id);
        Ok(updated)
    }

    async fn delete(&self, id: &SaleId) -> Result<()> {
        let url = self.url_for(&[id.as_str()])?;
        tracing::debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        Self::ensure_success(response, Some(id)).await?;
        tracing::info!("Deleted sale record {}", id);
        Ok(())
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<SaleRecord>> {
        let url = self.url_for(&["buscar"])?;
        tracing::debug!("GET {} nombre={}", url, name);
        let response = self
            .client
            .get(url)
            .query(&[("nombre", name)])
            .send()
            .await?;
        let response = Self::ensure_success(response, None).await?;
        Ok(response.json().await?)
    }

    async fn increment_counter(&self, id: &SaleId) -> Result<()> {
        let url = self.url_for(&["incrementar", id.as_str()])?;
        tracing::debug!("PUT {}", url);
        let response = self.client.put(url).send().await?;
        Self::ensure_success(response, Some(id)).await?;
        Ok(())
    }

    async fn chart_data(&self) -> Result<Vec<serde_json::Value>> {
        let url = self.url_for(&["datosgrafico"])?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response, None).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LineItem;
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use serde_json::json;

    fn sample_record() -> SaleRecord {
        SaleRecord {
            id: None,
            seller_name: "Ana".to_string(),
            customer_name: "Pedro Soto".to_string(),
            customer_tax_id: "12.345.678-9".to_string(),
            customer_phone: "+56911112222".to_string(),
            price: 100.0,
            deposit: 40.0,
            balance: 60.0,
            date: NaiveDate::from_ymd_opt(2024, 3, 15),
            note: "Bifocal".to_string(),
            payment_type: "Efectivo".to_string(),
            line_items: vec![LineItem {
                od_sphere: "+1.25".to_string(),
                ..Default::default()
            }],
        }
    }

    fn client_for(server: &MockServer) -> ProductoClient {
        ProductoClient::new(&server.url("/api/producto/"), 5).unwrap()
    }

    #[test]
    fn test_normalize_base_appends_slash() {
        let client = ProductoClient::new("http://localhost:4000/api/producto", 5).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:4000/api/producto/");
        assert_eq!(
            client.url_for(&["abc"]).unwrap().as_str(),
            "http://localhost:4000/api/producto/abc"
        );
        assert_eq!(
            client.url_for(&["incrementar", "7"]).unwrap().as_str(),
            "http://localhost:4000/api/producto/incrementar/7"
        );
        assert!(ProductoClient::new("not a url", 5).is_err());
    }

    #[tokio::test]
    async fn test_list_records() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/producto/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([
                    {"_id": "a1", "vendedor": "Ana", "precio": 100, "abono": 40, "saldo": 60, "fecha": "2024-03-15"},
                    {"_id": "a2", "vendedor": "Luis", "precio": 50, "abono": 50, "saldo": 0, "fecha": "2024-04-01"}
                ]));
        });

        let records = client_for(&server).list().await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].seller_name, "Luis");
        assert_eq!(records[0].balance, 60.0);
    }

    #[tokio::test]
    async fn test_create_never_sends_id() {
        let server = MockServer::start();
        let mut record = sample_record();
        record.id = Some(SaleId::new("should-not-be-sent"));

        let mut expected_body = serde_json::to_value(&sample_record()).unwrap();
        expected_body.as_object_mut().unwrap().remove("_id");

        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/api/producto/").json_body(expected_body);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"_id": "new-1", "vendedor": "Ana", "precio": 100, "abono": 40, "saldo": 60}));
        });

        let created = client_for(&server).create(&record).await.unwrap();

        api_mock.assert();
        assert_eq!(created.id, Some(SaleId::new("new-1")));
    }

    #[tokio::test]
    async fn test_update_targets_record_path() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/producto/a1")
                .json_body_partial(r#"{"_id": "a1", "vendedor": "Ana"}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"vendedor": "Ana"}));
        });

        let id = SaleId::new("a1");
        let updated = client_for(&server).update(&id, &sample_record()).await.unwrap();

        api_mock.assert();
        assert_eq!(updated.id, Some(id));
    }

    #[tokio::test]
    async fn test_update_keeps_digit_string_id_as_string() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/producto/123")
                .json_body_partial(r#"{"_id": "123"}"#);
            then.status(200).json_body(json!({"_id": "123", "vendedor": "Ana"}));
        });

        let id = SaleId::new("123");
        let updated = client_for(&server).update(&id, &sample_record()).await.unwrap();

        api_mock.assert();
        assert_eq!(updated.id, Some(id));
    }

    #[tokio::test]
    async fn test_delete_and_not_found() {
        let server = MockServer::start();
        let ok_mock = server.mock(|when, then| {
            when.method(DELETE).path("/api/producto/a1");
            then.status(200).json_body(json!({"msg": "Producto eliminado con exito"}));
        });
        let missing_mock = server.mock(|when, then| {
            when.method(DELETE).path("/api/producto/zz");
            then.status(404).body("No existe el producto");
        });

        let client = client_for(&server);
        client.delete(&SaleId::new("a1")).await.unwrap();
        let err = client.delete(&SaleId::new("zz")).await.unwrap_err();

        ok_mock.assert();
        missing_mock.assert();
        assert!(matches!(err, LedgerError::NotFoundError { ref id } if id == "zz"));
    }

    #[tokio::test]
    async fn test_server_error_is_reported_with_body() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/producto/");
            then.status(500).body("Hubo un error");
        });

        let err = client_for(&server).list().await.unwrap_err();

        api_mock.assert();
        match err {
            LedgerError::ApiStatusError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Hubo un error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_increment_and_chart_data() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/producto/buscar")
                .query_param("nombre", "Pedro Soto");
            then.status(200).json_body(json!([{"_id": 3, "nombre": "Pedro Soto"}]));
        });
        let increment_mock = server.mock(|when, then| {
            when.method(PUT).path("/api/producto/incrementar/3");
            then.status(204);
        });
        let chart_mock = server.mock(|when, then| {
            when.method(GET).path("/api/producto/datosgrafico");
            then.status(200).json_body(json!([{"name": "Ana", "value": 2}]));
        });

        let client = client_for(&server);
        let found = client.search_by_name("Pedro Soto").await.unwrap();
        client.increment_counter(&SaleId::from(3)).await.unwrap();
        let chart = client.chart_data().await.unwrap();

        search_mock.assert();
        increment_mock.assert();
        chart_mock.assert();
        assert_eq!(found[0].id, Some(SaleId::from(3)));
        assert_eq!(chart.len(), 1);
    }
}
