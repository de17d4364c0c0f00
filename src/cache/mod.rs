//! Resolved-IP cache. A hit skips the DNS round trip entirely.

mod memory;

pub use memory::MemoryCache;

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CacheError, Result};

/// Cache trait: look up and persist resolved addresses per domain.
///
/// A miss is `Ok(None)`; only a present-but-unreadable entry is an error,
/// and callers treat that the same as a miss after logging it.
#[async_trait]
pub trait IpCache: Send + Sync {
    async fn get(&self, domain: &str) -> Result<Option<IpAddr>>;

    async fn put(&self, domain: &str, ip: IpAddr) -> Result<()>;
}

/// Alias for a shared cache handle.
pub type Cache = Arc<dyn IpCache>;

/// One file per domain under the cache directory, holding the IP in its
/// display form.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Cache rooted at `~/.rurl/ipcache`, created if missing.
    pub async fn open_default() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            CacheError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no home directory",
            ))
        })?;
        Self::open(home.join(".rurl").join("ipcache")).await
    }

    pub async fn open(dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(CacheError::Io)?;
        Ok(Self { dir })
    }

    fn entry_path(&self, domain: &str) -> PathBuf {
        self.dir.join(domain)
    }
}

#[async_trait]
impl IpCache for FileCache {
    async fn get(&self, domain: &str) -> Result<Option<IpAddr>> {
        let path = self.entry_path(domain);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e).into()),
        };

        let ip: IpAddr = raw
            .trim()
            .parse()
            .map_err(|_| CacheError::Corrupt(format!("{domain}: {raw:?}")))?;
        debug!(%domain, %ip, "cache hit");
        Ok(Some(ip))
    }

    async fn put(&self, domain: &str, ip: IpAddr) -> Result<()> {
        let path = self.entry_path(domain);
        tokio::fs::write(&path, ip.to_string())
            .await
            .map_err(CacheError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_then_hit() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::open(tmp.path().join("ipcache")).await.unwrap();

        assert_eq!(cache.get("example.com").await.unwrap(), None);

        let ip: IpAddr = "93.184.216.34".parse().unwrap();
        cache.put("example.com", ip).await.unwrap();
        assert_eq!(cache.get("example.com").await.unwrap(), Some(ip));

        // Unrelated domain stays a miss.
        assert_eq!(cache.get("other.org").await.unwrap(), None);
    }

    #[tokio::test]
    async fn ipv6_entries_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::open(tmp.path().to_path_buf()).await.unwrap();

        let ip: IpAddr = "2606:2800:220:1:248:1893:25c8:1946".parse().unwrap();
        cache.put("example.com", ip).await.unwrap();
        assert_eq!(cache.get("example.com").await.unwrap(), Some(ip));
    }

    #[tokio::test]
    async fn corrupt_entry_is_an_error_not_a_panic() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::open(tmp.path().to_path_buf()).await.unwrap();

        tokio::fs::write(tmp.path().join("bad.example"), "not-an-ip")
            .await
            .unwrap();
        let err = cache.get("bad.example").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Cache(CacheError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn put_overwrites_existing_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::open(tmp.path().to_path_buf()).await.unwrap();

        cache
            .put("example.com", "1.2.3.4".parse().unwrap())
            .await
            .unwrap();
        cache
            .put("example.com", "5.6.7.8".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(
            cache.get("example.com").await.unwrap(),
            Some("5.6.7.8".parse().unwrap())
        );
    }
}
