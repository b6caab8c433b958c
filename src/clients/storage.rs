// src/clients/storage.rs

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::json;

use crate::common::error::AppError;

pub const PIX_PROOFS_BUCKET: &str = "pix-proofs";
// Validade da URL assinada usada para baixar o comprovante
pub const SIGNED_URL_TTL_SECS: u64 = 300;

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Imagem de comprovante já baixada.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ProofImage {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

#[async_trait]
pub trait ProofStorage: Send + Sync {
    async fn fetch_proof(&self, bucket: &str, path: &str) -> Result<ProofImage, AppError>;
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

// Cliente da API REST de storage (compatível com o storage do Supabase):
// assina uma URL curta para o objeto e baixa por ela.
#[derive(Clone)]
pub struct StorageClient {
    base_url: String,
    service_key: String,
    client: Client,
}

impl StorageClient {
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            client: Client::new(),
        }
    }

    pub async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: u64,
    ) -> Result<String, AppError> {
        let url = format!(
            "{}/object/sign/{}/{}",
            self.base_url,
            bucket,
            path.trim_start_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&json!({ "expiresIn": expires_in }))
            .send()
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::StorageError(format!(
                "falha ao assinar {}/{}: {}",
                bucket,
                path,
                response.status()
            )));
        }

        let signed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        if signed.signed_url.starts_with("http") {
            Ok(signed.signed_url)
        } else {
            Ok(format!("{}{}", self.base_url, signed.signed_url))
        }
    }
}

#[async_trait]
impl ProofStorage for StorageClient {
    async fn fetch_proof(&self, bucket: &str, path: &str) -> Result<ProofImage, AppError> {
        let signed_url = self.create_signed_url(bucket, path, SIGNED_URL_TTL_SECS).await?;

        let response = self
            .client
            .get(&signed_url)
            .send()
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::StorageError(format!(
                "download de {} falhou: {}",
                path,
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        Ok(ProofImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn data_url_embeds_base64_payload() {
        let image = ProofImage {
            bytes: b"abc".to_vec(),
            content_type: "image/png".into(),
        };
        assert_eq!(image.to_data_url(), "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn signs_then_downloads_the_proof() {
        let mut server = mockito::Server::new_async().await;
        let sign = server
            .mock("POST", "/object/sign/pix-proofs/u1/recibo.png")
            .match_header("authorization", "Bearer service-key")
            .match_body(Matcher::Json(json!({ "expiresIn": 300 })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"signedURL":"/object/sign/pix-proofs/u1/recibo.png?token=t"}"#)
            .create_async()
            .await;
        let download = server
            .mock("GET", "/object/sign/pix-proofs/u1/recibo.png")
            .match_query(Matcher::UrlEncoded("token".into(), "t".into()))
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body("PNGDATA")
            .create_async()
            .await;

        let client = StorageClient::new(server.url(), "service-key".into());
        let image = client.fetch_proof(PIX_PROOFS_BUCKET, "u1/recibo.png").await.unwrap();

        assert_eq!(image.bytes, b"PNGDATA".to_vec());
        assert_eq!(image.content_type, "image/png");
        sign.assert_async().await;
        download.assert_async().await;
    }

    #[tokio::test]
    async fn missing_object_is_a_storage_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/object/sign/pix-proofs/sumiu.jpg")
            .with_status(404)
            .create_async()
            .await;

        let client = StorageClient::new(server.url(), "k".into());
        let err = client.fetch_proof(PIX_PROOFS_BUCKET, "sumiu.jpg").await.unwrap_err();
        assert!(matches!(err, AppError::StorageError(_)));
    }
}
