use crate::app::config::Config;
use crate::models::image::{Image, SearchPage, SearchResponseDto, UnsplashImageDto};
use crate::repository::ImageSource;
use anyhow::Result;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client, ClientBuilder, StatusCode,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use urlencoding::encode;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("HTTP error {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error(transparent)]
    Request(reqwest::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ApiError::Unreachable(e)
        } else if e.is_decode() {
            ApiError::Decode(e)
        } else {
            ApiError::Request(e)
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnsplashClient {
    http_client: Client,
    api_url: String,
}

impl UnsplashClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept-Version", HeaderValue::from_static("v1"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        match &config.access_key {
            Some(access_key) => {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Client-ID {access_key}"))?,
                );
            }
            None => log::warn!("No access key configured, requests will be unauthenticated"),
        }
        let http_client = ClientBuilder::new()
            .user_agent(format!("photoreel/{}", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        log::debug!("GET {url}");
        let response = self.http_client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => response.json::<T>().await.map_err(ApiError::Decode),
            status => {
                let body = response.text().await.unwrap_or_default();
                log::error!("HTTP Error while requesting {url} {status:?}:\n{body:?}");
                Err(ApiError::Status { status, body })
            }
        }
    }

    pub async fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(ApiError::from)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body }.into());
        }
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        Ok(bytes.to_vec())
    }
}

impl ImageSource for UnsplashClient {
    async fn fetch_editorial_feed(&self, page: u32, per_page: u32) -> Result<Vec<Image>> {
        let url = format!("{}/photos?page={page}&per_page={per_page}", self.api_url);
        let images: Vec<UnsplashImageDto> = self.get_json(url).await?;
        Ok(images.into_iter().map(Image::from).collect())
    }

    async fn search_images(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage> {
        let url = format!(
            "{}/search/photos?query={}&page={page}&per_page={per_page}",
            self.api_url,
            encode(query)
        );
        let response: SearchResponseDto = self.get_json(url).await?;
        Ok(SearchPage::from(response))
    }

    async fn fetch_image(&self, image_id: &str) -> Result<Image> {
        let url = format!("{}/photos/{}", self.api_url, encode(image_id));
        let image: UnsplashImageDto = self.get_json(url).await?;
        Ok(Image::from(image))
    }
}
