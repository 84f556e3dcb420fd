use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use crate::config::PinataConfig;

#[async_trait]
pub trait PinningClient: Send + Sync {
    async fn pin_file(
        &self,
        filename: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<String>;
    async fn pin_json(&self, value: &serde_json::Value) -> anyhow::Result<String>;
}

pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    gateway_url: String,
    api_key: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

impl PinataClient {
    pub fn new(cfg: &PinataConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            gateway_url: cfg.gateway_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            secret_key: cfg.secret_key.clone(),
        }
    }

    fn ipfs_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url, cid)
    }
}

#[async_trait]
impl PinningClient for PinataClient {
    async fn pin_file(
        &self,
        filename: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<String> {
        let part = reqwest::multipart::Part::bytes(body.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)
            .context("invalid content type")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp: PinResponse = self
            .http
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .header("pinata_api_key", self.api_key.as_str())
            .header("pinata_secret_api_key", self.secret_key.as_str())
            .multipart(form)
            .send()
            .await
            .context("pinata pinFileToIPFS")?
            .error_for_status()
            .context("pinata rejected file")?
            .json()
            .await
            .context("decode pinata response")?;

        Ok(self.ipfs_url(&resp.ipfs_hash))
    }

    async fn pin_json(&self, value: &serde_json::Value) -> anyhow::Result<String> {
        let resp: PinResponse = self
            .http
            .post(format!("{}/pinning/pinJSONToIPFS", self.api_url))
            .header("pinata_api_key", self.api_key.as_str())
            .header("pinata_secret_api_key", self.secret_key.as_str())
            .json(value)
            .send()
            .await
            .context("pinata pinJSONToIPFS")?
            .error_for_status()
            .context("pinata rejected json")?
            .json()
            .await
            .context("decode pinata response")?;

        Ok(self.ipfs_url(&resp.ipfs_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> PinataClient {
        PinataClient::new(&PinataConfig {
            api_url: "https://api.pinata.cloud/".into(),
            gateway_url: "https://gateway.pinata.cloud/".into(),
            api_key: "k".into(),
            secret_key: "s".into(),
        })
    }

    #[test]
    fn gateway_url_is_normalized() {
        let client = test_client();
        assert_eq!(
            client.ipfs_url("QmHash"),
            "https://gateway.pinata.cloud/ipfs/QmHash"
        );
    }

    #[test]
    fn pin_response_accepts_pinata_casing() {
        let resp: PinResponse = serde_json::from_str(r#"{"IpfsHash":"QmX","PinSize":12}"#).unwrap();
        assert_eq!(resp.ipfs_hash, "QmX");
    }
}
