use anyhow::anyhow;
use bytes::Bytes;
use filehub_core::store::{ObjectEntry, StoreError, StoreFeatures, StoreResult};
use s3::{Bucket, Region, creds::Credentials};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct S3StoreConfig {
    pub endpoint: String,
    #[serde(default)]
    pub region: String,
    pub bucket_name: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone)]
pub struct S3Store {
    bucket: Box<Bucket>,
}

impl S3Store {
    pub fn create(config: S3StoreConfig) -> anyhow::Result<Self> {
        let bucket = Bucket::new(
            &config.bucket_name,
            Region::Custom {
                endpoint: config.endpoint,
                region: config.region,
            },
            Credentials::new(
                Some(&config.access_key),
                Some(&config.secret_key),
                None,
                None,
                None,
            )?,
        )?
        .with_path_style();
        s3::set_retries(5);
        Ok(Self { bucket })
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        match self.bucket.head_object(key).await {
            Ok((_, 200)) => Ok(true),
            Ok((_, 404)) => Ok(false),
            Ok((_, code)) => Err(StoreError::Other(anyhow!(
                "unexpected http status code {code}"
            ))),
            Err(e) => Err(StoreError::Other(e.into())),
        }
    }
}

#[async_trait::async_trait]
impl filehub_core::store::ObjectStore for S3Store {
    /// S3 has no server-side rename; callers fall back to get + put + delete.
    fn features(&self) -> StoreFeatures {
        StoreFeatures {
            supports_move: false,
        }
    }

    /// Lists immediate children using a `/` delimiter: objects under the
    /// prefix become file entries, common prefixes become prefix entries.
    async fn list(&self, prefix: &str, limit: usize) -> StoreResult<Vec<ObjectEntry>> {
        let scope = match prefix.trim_end_matches('/') {
            "" => String::new(),
            p => format!("{p}/"),
        };

        let pages = self
            .bucket
            .list(scope.clone(), Some("/".to_string()))
            .await
            .map_err(|e| StoreError::Other(e.into()))?;

        let mut entries = Vec::new();
        for page in pages {
            for object in page.contents {
                let Some(name) = object.key.strip_prefix(&scope) else {
                    continue;
                };
                if name.is_empty() {
                    continue;
                }
                entries.push(ObjectEntry {
                    name: name.to_string(),
                    size: Some(object.size),
                });
            }
            for common in page.common_prefixes.into_iter().flatten() {
                let name = common
                    .prefix
                    .strip_prefix(&scope)
                    .unwrap_or(&common.prefix)
                    .trim_end_matches('/');
                if name.is_empty() {
                    continue;
                }
                entries.push(ObjectEntry {
                    name: name.to_string(),
                    size: None,
                });
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn put(&self, key: &str, bytes: Bytes) -> StoreResult<()> {
        self.bucket
            .put_object(key, &bytes)
            .await
            .map_err(|e| StoreError::Other(e.into()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let res = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| StoreError::Other(e.into()))?;
        match res.status_code() {
            200 => Ok(res.into_bytes()),
            404 => Err(StoreError::NotFound),
            code => Err(StoreError::Other(anyhow!(
                "unexpected http status code {code}"
            ))),
        }
    }

    /// S3 deletes are idempotent at the wire level (204 for absent keys),
    /// so absence is checked first to keep the trait contract exact.
    async fn delete(&self, key: &str) -> StoreResult<()> {
        if !self.exists(key).await? {
            return Err(StoreError::NotFound);
        }
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| StoreError::Other(e.into()))?;
        Ok(())
    }
}
