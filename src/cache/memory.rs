use super::IpCache;
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::RwLock;

/// In-memory cache (for testing or single-run; not persistent).
pub struct MemoryCache {
    entries: RwLock<HashMap<String, IpAddr>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpCache for MemoryCache {
    async fn get(&self, domain: &str) -> Result<Option<IpAddr>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheError::Io(std::io::Error::other(e.to_string())))?;
        Ok(entries.get(domain).copied())
    }

    async fn put(&self, domain: &str, ip: IpAddr) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Io(std::io::Error::other(e.to_string())))?;
        entries.insert(domain.to_string(), ip);
        Ok(())
    }
}
