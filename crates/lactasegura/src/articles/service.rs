//! Article working-set management: cache/bundled loading and best-effort
//! background refresh from the configured remote endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::Article;

use super::{
    bundled_articles, probe_connectivity, ArticleCache, ArticleFetcher, HttpFetcher,
    RemoteConfigStore,
};

/// How the service decides whether the device is online.
#[derive(Debug, Clone)]
pub enum ConnectivityCheck {
    /// TCP-connect to a well-known endpoint under a short timeout.
    Probe {
        /// Probe host.
        host: String,
        /// Probe port.
        port: u16,
        /// Probe timeout.
        timeout: Duration,
    },
    /// Skip probing and treat the device as online.
    AssumeOnline,
    /// Skip probing and treat the device as offline.
    AssumeOffline,
}

/// Loads the article working set and keeps it fresh.
///
/// The synchronous result of [`load`](ArticleService::load) always comes from
/// local data (cache file or bundled list); remote fetches run on detached
/// background tasks and replace the working set plus the cache file on
/// success. Each fetch carries a generation number; a completion whose
/// generation is no longer current is discarded, so an in-flight stale fetch
/// can never overwrite newer data.
#[derive(Clone)]
pub struct ArticleService {
    cache: ArticleCache,
    remote: RemoteConfigStore,
    fetcher: Arc<dyn ArticleFetcher>,
    connectivity: ConnectivityCheck,
    articles: Arc<RwLock<Vec<Article>>>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for ArticleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleService")
            .field("cache", &self.cache)
            .field("remote", &self.remote)
            .field("connectivity", &self.connectivity)
            .finish_non_exhaustive()
    }
}

impl ArticleService {
    /// Build the service from the application configuration, with the HTTP
    /// fetcher and a TCP connectivity probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.fetch_timeout())?;
        Ok(Self::with_fetcher(
            ArticleCache::new(config.articles_cache_path()),
            RemoteConfigStore::new(config.remote_config_path()),
            Arc::new(fetcher),
            ConnectivityCheck::Probe {
                host: config.network.probe_host.clone(),
                port: config.network.probe_port,
                timeout: config.probe_timeout(),
            },
        ))
    }

    /// Build the service from explicit parts. Used by hosts that supply
    /// their own fetcher or connectivity policy, and by tests.
    #[must_use]
    pub fn with_fetcher(
        cache: ArticleCache,
        remote: RemoteConfigStore,
        fetcher: Arc<dyn ArticleFetcher>,
        connectivity: ConnectivityCheck,
    ) -> Self {
        Self {
            cache,
            remote,
            fetcher,
            connectivity,
            articles: Arc::new(RwLock::new(bundled_articles())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The current in-memory working set.
    pub async fn current(&self) -> Vec<Article> {
        self.articles.read().await.clone()
    }

    /// The configured remote URL, if any.
    #[must_use]
    pub fn remote_url(&self) -> Option<String> {
        self.remote.load().remote_articles_url
    }

    /// Persist a new remote articles URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote config rewrite fails.
    pub fn set_remote_url(&self, url: impl Into<String>) -> Result<()> {
        let mut config = self.remote.load();
        config.remote_articles_url = Some(url.into());
        self.remote.save(&config)
    }

    /// Classify the device as online or offline. Never errors.
    pub async fn is_online(&self) -> bool {
        match &self.connectivity {
            ConnectivityCheck::Probe {
                host,
                port,
                timeout,
            } => probe_connectivity(host, *port, *timeout).await,
            ConnectivityCheck::AssumeOnline => true,
            ConnectivityCheck::AssumeOffline => false,
        }
    }

    /// Load the article working set.
    ///
    /// When `force_remote` is set, a remote URL is configured, and the
    /// connectivity probe succeeds, a background fetch is kicked off and the
    /// current working set is returned unchanged (the fetch never blocks the
    /// caller). Otherwise the cache file is loaded if present, falling back
    /// to the bundled list; if a remote URL is configured and the device is
    /// online, an opportunistic background refresh runs as well.
    pub async fn load(&self, force_remote: bool) -> Vec<Article> {
        let remote_url = self.remote.load().remote_articles_url;

        if force_remote {
            if let Some(url) = remote_url.clone() {
                if self.is_online().await {
                    self.spawn_refresh(url);
                    return self.current().await;
                }
                debug!("forced refresh requested while offline, using local data");
            } else {
                debug!("forced refresh requested but no remote URL configured");
            }
        }

        let working = self.cache.read().unwrap_or_else(bundled_articles);
        *self.articles.write().await = working.clone();

        if !force_remote {
            if let Some(url) = remote_url {
                if self.is_online().await {
                    self.spawn_refresh(url);
                }
            }
        }

        working
    }

    /// Fetch from the configured remote URL inline and apply the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteUrlMissing`] if no URL is configured, or the
    /// fetch error. On error the working set and cache are untouched.
    pub async fn refresh_now(&self) -> Result<()> {
        let url = self
            .remote
            .load()
            .remote_articles_url
            .ok_or(Error::RemoteUrlMissing)?;
        let generation = self.begin_generation();
        self.run_refresh(url, generation).await
    }

    /// Start a new fetch generation, invalidating completions of any fetch
    /// still in flight.
    fn begin_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn spawn_refresh(&self, url: String) -> JoinHandle<()> {
        let generation = self.begin_generation();
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(err) = service.run_refresh(url, generation).await {
                warn!("background article refresh failed: {err}");
            }
        })
    }

    async fn run_refresh(&self, url: String, generation: u64) -> Result<()> {
        let fresh = self.fetcher.fetch(&url).await?;

        // The generation check happens under the working-set lock, and the
        // cache write stays inside it: once a completion passes the check,
        // no newer completion can slip in before it applies.
        let mut articles = self.articles.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("discarding stale article fetch result (generation {generation})");
            return Ok(());
        }

        if let Err(err) = self.cache.write(&fresh) {
            warn!("failed writing articles cache: {err}");
        }
        *articles = fresh;
        info!("articles updated from remote");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Notify;

    fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: format!("title {id}"),
            authors: "A. Author".to_string(),
            source: "Journal".to_string(),
            url: "https://example.org".to_string(),
            summary: "resumen".to_string(),
        }
    }

    struct StubFetcher {
        articles: Vec<Article>,
    }

    #[async_trait]
    impl ArticleFetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<Article>> {
            Ok(self.articles.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl ArticleFetcher for FailingFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<Article>> {
            Err(Error::fetch_payload("simulated transport failure"))
        }
    }

    /// First call returns the stale list immediately; later calls return
    /// the fresh list.
    struct SequenceFetcher {
        first_taken: AtomicBool,
    }

    #[async_trait]
    impl ArticleFetcher for SequenceFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<Article>> {
            if !self.first_taken.swap(true, Ordering::SeqCst) {
                Ok(vec![article("stale")])
            } else {
                Ok(vec![article("fresh")])
            }
        }
    }

    /// First call blocks until released and returns the stale list; later
    /// calls return the fresh list immediately.
    struct GatedFetcher {
        gate: Arc<Notify>,
        first_taken: AtomicBool,
    }

    #[async_trait]
    impl ArticleFetcher for GatedFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<Article>> {
            if !self.first_taken.swap(true, Ordering::SeqCst) {
                self.gate.notified().await;
                Ok(vec![article("stale")])
            } else {
                Ok(vec![article("fresh")])
            }
        }
    }

    fn service_in(
        dir: &std::path::Path,
        fetcher: Arc<dyn ArticleFetcher>,
        connectivity: ConnectivityCheck,
    ) -> ArticleService {
        ArticleService::with_fetcher(
            ArticleCache::new(dir.join("cache.json")),
            RemoteConfigStore::new(dir.join("remote_config.json")),
            fetcher,
            connectivity,
        )
    }

    #[tokio::test]
    async fn test_load_without_cache_or_remote_uses_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(
            dir.path(),
            Arc::new(StubFetcher { articles: vec![] }),
            ConnectivityCheck::AssumeOffline,
        );

        let articles = service.load(false).await;
        assert_eq!(articles, bundled_articles());
    }

    #[tokio::test]
    async fn test_load_prefers_cache_over_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(
            dir.path(),
            Arc::new(StubFetcher { articles: vec![] }),
            ConnectivityCheck::AssumeOffline,
        );
        service.cache.write(&[article("cached")]).unwrap();

        let articles = service.load(false).await;
        assert_eq!(articles, vec![article("cached")]);
        assert_eq!(service.current().await, vec![article("cached")]);
    }

    #[tokio::test]
    async fn test_forced_load_returns_current_and_refreshes_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(
            dir.path(),
            Arc::new(StubFetcher {
                articles: vec![article("remote")],
            }),
            ConnectivityCheck::AssumeOnline,
        );
        service.set_remote_url("https://example.org/articles.json").unwrap();

        // The synchronous return is the working set as it was.
        let articles = service.load(true).await;
        assert_eq!(articles, bundled_articles());

        // Drive the same refresh path to completion deterministically.
        let handle = service.spawn_refresh("https://example.org/articles.json".to_string());
        handle.await.unwrap();

        assert_eq!(service.current().await, vec![article("remote")]);
        assert_eq!(service.cache.read().unwrap(), vec![article("remote")]);
    }

    #[tokio::test]
    async fn test_forced_load_offline_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(
            dir.path(),
            Arc::new(StubFetcher {
                articles: vec![article("remote")],
            }),
            ConnectivityCheck::AssumeOffline,
        );
        service.set_remote_url("https://example.org/articles.json").unwrap();
        service.cache.write(&[article("cached")]).unwrap();

        let articles = service.load(true).await;
        assert_eq!(articles, vec![article("cached")]);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_cache_and_working_set_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(
            dir.path(),
            Arc::new(FailingFetcher),
            ConnectivityCheck::AssumeOnline,
        );
        service.set_remote_url("https://example.org/articles.json").unwrap();
        service.cache.write(&[article("cached")]).unwrap();
        service.load(false).await;

        let err = service.refresh_now().await.unwrap_err();
        assert!(err.is_network());

        assert_eq!(service.current().await, vec![article("cached")]);
        assert_eq!(service.cache.read().unwrap(), vec![article("cached")]);
    }

    #[tokio::test]
    async fn test_stale_fetch_completion_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(Notify::new());
        let service = service_in(
            dir.path(),
            Arc::new(GatedFetcher {
                gate: Arc::clone(&gate),
                first_taken: AtomicBool::new(false),
            }),
            ConnectivityCheck::AssumeOnline,
        );
        service.set_remote_url("https://example.org/articles.json").unwrap();

        // First fetch starts and blocks; second starts later and finishes first.
        let first = service.spawn_refresh("https://example.org/articles.json".to_string());
        tokio::task::yield_now().await;
        let second = service.spawn_refresh("https://example.org/articles.json".to_string());
        second.await.unwrap();
        assert_eq!(service.current().await, vec![article("fresh")]);

        // Release the stale fetch; its completion must not win.
        gate.notify_one();
        first.await.unwrap();
        assert_eq!(service.current().await, vec![article("fresh")]);
        assert_eq!(service.cache.read().unwrap(), vec![article("fresh")]);
    }

    #[tokio::test]
    async fn test_refresh_overtaken_at_working_set_lock_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(
            dir.path(),
            Arc::new(SequenceFetcher {
                first_taken: AtomicBool::new(false),
            }),
            ConnectivityCheck::AssumeOnline,
        );
        service.set_remote_url("https://example.org/articles.json").unwrap();

        // Hold the working-set lock so the first refresh parks after its
        // fetch returns. It must not have touched the cache file yet.
        let guard = service.articles.write().await;
        let first = service.spawn_refresh("https://example.org/articles.json".to_string());
        tokio::task::yield_now().await;
        assert!(service.cache.read().is_none());

        // A newer refresh supersedes the parked one before it can apply.
        let second = service.spawn_refresh("https://example.org/articles.json".to_string());
        drop(guard);
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(service.current().await, vec![article("fresh")]);
        assert_eq!(service.cache.read().unwrap(), vec![article("fresh")]);
    }

    #[tokio::test]
    async fn test_refresh_now_without_url_errors() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(
            dir.path(),
            Arc::new(StubFetcher { articles: vec![] }),
            ConnectivityCheck::AssumeOnline,
        );

        let err = service.refresh_now().await.unwrap_err();
        assert!(matches!(err, Error::RemoteUrlMissing));
    }

    #[tokio::test]
    async fn test_set_remote_url_persists() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(
            dir.path(),
            Arc::new(StubFetcher { articles: vec![] }),
            ConnectivityCheck::AssumeOffline,
        );

        service.set_remote_url("https://example.org/a.json").unwrap();
        assert_eq!(
            service.remote_url(),
            Some("https://example.org/a.json".to_string())
        );
    }
}
