use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use crate::config::ObjectStorageSettings;

type HmacSha256 = Hmac<Sha256>;

const AWS_URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// File storage collaborator, used around thumbnail changes only.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores a blob under `prefix` and returns the stored path.
    async fn upload(&self, prefix: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
    async fn remove(&self, path: &str) -> Result<()>;
}

/// S3-compatible object storage client (SigV4-signed PUT/DELETE).
#[derive(Clone, Debug)]
pub struct ObjectStorageClient {
    bucket: String,
    region: String,
    endpoint: Url,
    access_key: String,
    secret_key: String,
    http: Client,
}

impl ObjectStorageClient {
    pub fn new(settings: ObjectStorageSettings) -> Result<Self> {
        let endpoint = settings
            .endpoint
            .unwrap_or_else(|| "https://storage.yandexcloud.net".to_string());

        let endpoint = Url::parse(&endpoint).context("Invalid object storage endpoint URL")?;
        if endpoint.host_str().is_none() {
            bail!("Object storage endpoint must include a host");
        }
        if endpoint.scheme() != "https" && endpoint.scheme() != "http" {
            bail!(
                "Invalid endpoint scheme: {}. Must be http or https.",
                endpoint.scheme()
            );
        }

        Ok(Self {
            bucket: settings.bucket,
            region: settings.region,
            access_key: settings.access_key,
            secret_key: settings.secret_key,
            endpoint,
            http: Client::new(),
        })
    }

    fn object_url(&self, object_key: &str) -> Result<Url> {
        let encoded = object_key
            .split('/')
            .map(|segment| utf8_percent_encode(segment, AWS_URI_ENCODE_SET).to_string())
            .collect::<Vec<_>>()
            .join("/");

        let mut url = self.endpoint.clone();
        url.set_path(&format!("{}/{}", self.bucket, encoded));
        Ok(url)
    }

    /// Builds the SigV4 Authorization header shared by PUT and DELETE.
    fn sign(
        &self,
        method: &str,
        object_key: &str,
        payload_hash: &str,
        amz_date: &str,
        date_stamp: &str,
    ) -> Result<String> {
        let host = self
            .endpoint
            .host_str()
            .ok_or_else(|| anyhow!("Object storage endpoint missing host"))?
            .to_lowercase();

        let canonical_uri = format!(
            "/{}/{}",
            self.bucket,
            object_key
                .split('/')
                .map(|segment| utf8_percent_encode(segment, AWS_URI_ENCODE_SET).to_string())
                .collect::<Vec<_>>()
                .join("/")
        );

        let canonical_headers = format!(
            "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            host, payload_hash, amz_date
        );
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "{}\n{}\n\n{}\n{}\n{}",
            method, canonical_uri, canonical_headers, signed_headers, payload_hash
        );

        let scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = derive_signing_key(&self.secret_key, date_stamp, &self.region, "s3");
        let signature = hex::encode(hmac_sign(&signing_key, string_to_sign.as_bytes()));

        Ok(format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key, scope, signed_headers, signature
        ))
    }

    async fn signed_request(
        &self,
        method: reqwest::Method,
        object_key: &str,
        body: Option<(Vec<u8>, String)>,
    ) -> Result<()> {
        let payload_hash = match &body {
            Some((bytes, _)) => hex::encode(Sha256::digest(bytes)),
            None => hex::encode(Sha256::digest(b"")),
        };

        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = now.format("%Y%m%d").to_string();

        let authorization = self.sign(
            method.as_str(),
            object_key,
            &payload_hash,
            &amz_date,
            &date_stamp,
        )?;
        let url = self.object_url(object_key)?;

        let mut request = self
            .http
            .request(method, url)
            .header("authorization", authorization)
            .header("x-amz-content-sha256", payload_hash)
            .header("x-amz-date", amz_date);

        if let Some((bytes, content_type)) = body {
            request = request.header("content-type", content_type).body(bytes);
        }

        let response = request
            .send()
            .await
            .context("Object storage request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("Object storage returned {}: {}", status, text);
        }

        Ok(())
    }
}

#[async_trait]
impl FileStore for ObjectStorageClient {
    async fn upload(&self, prefix: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let key = format!(
            "{}/{}{}",
            prefix.trim_matches('/'),
            Uuid::new_v4(),
            extension_for(content_type)
        );

        self.signed_request(
            reqwest::Method::PUT,
            &key,
            Some((bytes, content_type.to_string())),
        )
        .await?;

        tracing::info!(key = %key, "Uploaded object");
        Ok(key)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.signed_request(reqwest::Method::DELETE, path, None)
            .await?;
        tracing::info!(key = %path, "Removed object");
        Ok(())
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/webp" => ".webp",
        _ => ".bin",
    }
}

fn derive_signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sign(format!("AWS4{}", secret).as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sign(&k_date, region.as_bytes());
    let k_service = hmac_sign(&k_region, service.as_bytes());
    hmac_sign(&k_service, b"aws4_request")
}

fn hmac_sign(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// In-memory file store for local development and tests.
#[derive(Default)]
pub struct InMemoryFileStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn upload(&self, prefix: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let path = format!(
            "{}/{}{}",
            prefix.trim_matches('/'),
            Uuid::new_v4(),
            extension_for(content_type)
        );
        self.files.lock().unwrap().insert(path.clone(), bytes);
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }
}
