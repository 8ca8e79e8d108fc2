use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AGE, CACHE_CONTROL, HeaderMap, HeaderValue};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::console::Command;
use crate::kernel::component::DependencyRegistry;
use crate::kernel::constants::{CACHE_STATUS_HEADER, HTTP_CACHE_WRAPPER};
use crate::kernel::error::Result;
use crate::kernel::traits::Kernel;
use crate::web::{Request, Response};

/// Builds a decorator kernel around the kernel it is given.
pub type CacheWrapperFactory = Arc<dyn Fn(Arc<dyn Kernel>) -> Arc<dyn Kernel> + Send + Sync>;

/// Named cache wrappers that `Application::enable_cache` can select.
///
/// `"http_cache"` resolves to [`HttpCache`] out of the box.
#[derive(Clone)]
pub struct CacheWrapperRegistry {
    factories: HashMap<String, CacheWrapperFactory>,
}

impl CacheWrapperRegistry {
    /// A registry without any wrapper, not even the built-in one.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Arc<dyn Kernel>) -> Arc<dyn Kernel> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn resolve(&self, name: &str) -> Option<CacheWrapperFactory> {
        self.factories.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for CacheWrapperRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(HTTP_CACHE_WRAPPER, |kernel| Arc::new(HttpCache::new(kernel)) as Arc<dyn Kernel>);
        registry
    }
}

impl fmt::Debug for CacheWrapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheWrapperRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// What the cache did with a request, reported in the `x-mindy-cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Pass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Pass => "pass",
        }
    }
}

struct CacheEntry {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    stored_at: SystemTime,
    ttl: Duration,
}

impl CacheEntry {
    fn age(&self) -> Duration {
        self.stored_at.elapsed().unwrap_or(Duration::ZERO)
    }

    fn is_fresh(&self) -> bool {
        self.age() < self.ttl
    }

    fn to_response(&self) -> Response {
        let mut response = http::Response::new(self.body.clone());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
            .headers_mut()
            .insert(AGE, HeaderValue::from(self.age().as_secs()));
        response
    }
}

/// On-disk form of a [`CacheEntry`].
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    status: u16,
    headers: Vec<(String, Vec<u8>)>,
    body: Vec<u8>,
    stored_at: u64,
    ttl: u64,
}

impl StoredEntry {
    fn from_entry(key: &str, entry: &CacheEntry) -> Self {
        Self {
            key: key.to_string(),
            status: entry.status.as_u16(),
            headers: entry
                .headers
                .iter()
                .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
                .collect(),
            body: entry.body.to_vec(),
            stored_at: entry
                .stored_at
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            ttl: entry.ttl.as_secs(),
        }
    }

    fn into_entry(self) -> Option<CacheEntry> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            let name = http::HeaderName::from_bytes(name.as_bytes()).ok()?;
            headers.append(name, HeaderValue::from_bytes(&value).ok()?);
        }
        Some(CacheEntry {
            status: StatusCode::from_u16(self.status).ok()?,
            headers,
            body: Bytes::from(self.body),
            stored_at: UNIX_EPOCH + Duration::from_secs(self.stored_at),
            ttl: Duration::from_secs(self.ttl),
        })
    }
}

/// Directory of JSON files, one per cached URI, shared by every process
/// serving the same application.
#[derive(Debug, Clone)]
struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    fn path_for(&self, key: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        self.dir.join(format!("{:016x}.json", hasher.finish()))
    }

    fn load(&self, key: &str) -> Option<CacheEntry> {
        let raw = std::fs::read(self.path_for(key)).ok()?;
        let stored: StoredEntry = match serde_json::from_slice(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("http cache: unreadable entry for {}: {}", key, e);
                return None;
            }
        };
        // Hash collisions leave another URI's entry in the file.
        if stored.key != key {
            return None;
        }
        stored.into_entry()
    }

    fn save(&self, key: &str, entry: &CacheEntry) {
        let write = || -> std::io::Result<()> {
            std::fs::create_dir_all(&self.dir)?;
            let json = serde_json::to_vec(&StoredEntry::from_entry(key, entry))?;
            std::fs::write(self.path_for(key), json)
        };
        if let Err(e) = write() {
            log::warn!("http cache: could not persist {} in {}: {}", key, self.dir.display(), e);
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("http cache: could not remove {}: {}", path.display(), e);
            }
        }
    }

    fn clear(&self) {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return;
        };
        for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
            if path.extension().is_some_and(|ext| ext == "json") {
                let _ = std::fs::remove_file(path);
            }
        }
    }
}

/// Reverse-proxy style decorator that keeps shared-cacheable responses.
///
/// Only `GET` responses are stored; `HEAD` is answered from them without a
/// body. Any other method passes through and evicts the entry for its URI.
/// Entries live in memory and, with [`HttpCache::with_store_dir`], also in a
/// directory so that separate processes share them.
pub struct HttpCache {
    kernel: Arc<dyn Kernel>,
    store: Mutex<HashMap<String, CacheEntry>>,
    disk: Option<DiskStore>,
}

impl HttpCache {
    pub fn new(kernel: Arc<dyn Kernel>) -> Self {
        Self {
            kernel,
            store: Mutex::new(HashMap::new()),
            disk: None,
        }
    }

    /// Cache that also persists entries under `dir`.
    pub fn with_store_dir(kernel: Arc<dyn Kernel>, dir: impl AsRef<Path>) -> Self {
        Self {
            disk: Some(DiskStore {
                dir: dir.as_ref().to_path_buf(),
            }),
            ..Self::new(kernel)
        }
    }

    /// The decorated kernel.
    pub fn inner(&self) -> &Arc<dyn Kernel> {
        &self.kernel
    }

    /// Number of entries held in memory.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.store.lock().await.clear();
        if let Some(disk) = &self.disk {
            disk.clear();
        }
    }

    /// A fresh response for `key`; stale entries found on the way are dropped.
    async fn lookup(&self, key: &str) -> Option<Response> {
        let mut store = self.store.lock().await;
        if !store.contains_key(key) {
            if let Some(entry) = self.disk.as_ref().and_then(|d| d.load(key)) {
                store.insert(key.to_string(), entry);
            }
        }
        let entry = store.get(key)?;
        if entry.is_fresh() {
            return Some(entry.to_response());
        }
        log::debug!("http cache: drop stale {}", key);
        store.remove(key);
        if let Some(disk) = &self.disk {
            disk.remove(key);
        }
        None
    }

    async fn keep(&self, key: String, entry: CacheEntry) {
        if let Some(disk) = &self.disk {
            disk.save(&key, &entry);
        }
        self.store.lock().await.insert(key, entry);
    }

    async fn evict(&self, key: &str) {
        self.store.lock().await.remove(key);
        if let Some(disk) = &self.disk {
            disk.remove(key);
        }
    }

    async fn forward(&self, request: &Request, status: CacheStatus) -> Result<Response> {
        let mut response = self.kernel.handle(request).await?;
        mark(&mut response, status);
        Ok(response)
    }
}

fn mark(response: &mut Response, status: CacheStatus) {
    response
        .headers_mut()
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static(status.as_str()));
}

/// Cache-Control directives as lowercase `(name, value)` pairs.
fn directives(headers: &HeaderMap) -> Vec<(String, Option<String>)> {
    headers
        .get_all(CACHE_CONTROL)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| match d.split_once('=') {
            Some((name, value)) => (
                name.trim().to_ascii_lowercase(),
                Some(value.trim().trim_matches('"').to_string()),
            ),
            None => (d.to_ascii_lowercase(), None),
        })
        .collect()
}

fn has_directive(directives: &[(String, Option<String>)], name: &str) -> bool {
    directives.iter().any(|(n, _)| n == name)
}

fn seconds_directive(directives: &[(String, Option<String>)], name: &str) -> Option<u64> {
    directives
        .iter()
        .find(|(n, _)| n == name)
        .and_then(|(_, v)| v.as_deref())
        .and_then(|v| v.parse().ok())
}

/// How long a shared cache may keep `response`, if at all.
pub fn shared_lifetime(response: &Response) -> Option<Duration> {
    if !response.status().is_success() {
        return None;
    }
    let directives = directives(response.headers());
    if has_directive(&directives, "private") || has_directive(&directives, "no-store") {
        return None;
    }
    seconds_directive(&directives, "s-maxage")
        .or_else(|| seconds_directive(&directives, "max-age"))
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[async_trait]
impl Kernel for HttpCache {
    fn name(&self) -> &str {
        self.kernel.name()
    }

    fn environment(&self) -> &str {
        self.kernel.environment()
    }

    fn is_debug(&self) -> bool {
        self.kernel.is_debug()
    }

    fn container(&self) -> &DependencyRegistry {
        self.kernel.container()
    }

    async fn handle(&self, request: &Request) -> Result<Response> {
        let key = request.uri().to_string();
        let is_head = request.method() == Method::HEAD;

        if request.method() != Method::GET && !is_head {
            self.evict(&key).await;
            log::debug!("http cache: pass {} {}", request.method(), key);
            return self.forward(request, CacheStatus::Pass).await;
        }

        let reload = has_directive(&directives(request.headers()), "no-cache");
        if !reload {
            if let Some(mut response) = self.lookup(&key).await {
                log::debug!("http cache: hit {} {}", request.method(), key);
                if is_head {
                    *response.body_mut() = Bytes::new();
                }
                mark(&mut response, CacheStatus::Hit);
                return Ok(response);
            }
        }

        let mut response = self.kernel.handle(request).await?;
        if !is_head {
            if let Some(ttl) = shared_lifetime(&response) {
                log::debug!("http cache: store {} for {:?}", key, ttl);
                let entry = CacheEntry {
                    status: response.status(),
                    headers: response.headers().clone(),
                    body: response.body().clone(),
                    stored_at: SystemTime::now(),
                    ttl,
                };
                self.keep(key, entry).await;
            }
        }
        mark(&mut response, CacheStatus::Miss);
        Ok(response)
    }

    async fn terminate(&self, request: &Request, response: &Response) -> Result<()> {
        self.kernel.terminate(request, response).await
    }

    fn load_class_cache(&self) -> Result<()> {
        self.kernel.load_class_cache()
    }

    fn commands(&self) -> Vec<Arc<dyn Command>> {
        self.kernel.commands()
    }
}
