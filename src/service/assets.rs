use crate::config::AssetHostConfig;
use crate::error::app_error::AppError;
use crate::models::upload::UploadResponse;
use serde::Deserialize;

/// Shape of the asset host's upload response.
#[derive(Deserialize)]
struct HostUploadResponse {
    url: String,
    public_id: String,
}

/// Thin proxy to the external image host. Files land here as bytes and are
/// forwarded immediately; nothing is retained locally.
pub struct AssetHostClient {
    http: reqwest::Client,
    config: AssetHostConfig,
}

impl AssetHostClient {
    pub fn new(config: AssetHostConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse, AppError> {
        if !self.config.enabled {
            return Err(AppError::BadRequest("Image uploads are not configured".to_string()));
        }

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/image/upload", self.config.upload_url))
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "asset upload failed");
            return Err(AppError::upstream(format!("Asset host returned {}", status)));
        }

        let uploaded: HostUploadResponse = response.json().await?;
        Ok(UploadResponse {
            url: uploaded.url,
            public_id: uploaded.public_id,
        })
    }

    pub async fn delete(&self, public_id: &str) -> Result<(), AppError> {
        if !self.config.enabled {
            return Err(AppError::BadRequest("Image uploads are not configured".to_string()));
        }

        let response = self
            .http
            .post(format!("{}/image/destroy", self.config.upload_url))
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .form(&[("public_id", public_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, public_id = %public_id, "asset deletion failed");
            return Err(AppError::upstream(format!("Asset host returned {}", status)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn disabled_host_rejects_uploads() {
        let client = AssetHostClient::new(AssetHostConfig {
            upload_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            enabled: false,
        });

        assert!(client.upload("photo.jpg", vec![0xFF, 0xD8]).await.is_err());
        assert!(client.delete("abc").await.is_err());
    }
}
