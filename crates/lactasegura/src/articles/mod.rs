//! Article list: bundled defaults, local cache, and remote refresh.
//!
//! The article working set comes from one of three sources: the bundled
//! default list compiled into the crate, the local cache file, or a remote
//! endpoint configured in `remote_config.json`. Whichever loaded last wins.

mod fetch;
mod service;

pub use fetch::{probe_connectivity, ArticleFetcher, HttpFetcher};
pub use service::{ArticleService, ConnectivityCheck};

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::model::{Article, RemoteConfig};
use crate::store;

/// The bundled default article list, used when neither cache nor remote
/// data is available.
#[must_use]
pub fn bundled_articles() -> Vec<Article> {
    vec![
        Article {
            id: "art1".to_string(),
            title: "Assistência da enfermagem à desnutrição infantil na primeira infância: \
                    revisão integrativa (Brasil, 2022)"
                .to_string(),
            authors: "Jussiely Bezerra; Lívia Carla Silva Barbosa; Luciana Cristina da Silva; \
                      Lilian de Lucena Oliveira; Alessandra Victoria da Silva Santos; \
                      Gabriele Barros da Silva"
                .to_string(),
            source: "RSD Journal (PDF copy)".to_string(),
            url: "https://rsdjournal.org/rsd/article/download/38510/31880/420385".to_string(),
            summary: "Revisión integrativa (20 artículos, 2015-2022) que evidencia el rol de la \
                      enfermería en la detección temprana de la desnutrición infantil, educación \
                      alimentaria, acompañamiento familiar y vigilancia del crecimiento."
                .to_string(),
        },
        Article {
            id: "art2".to_string(),
            title: "Facilitators and barriers of wet nursing: a qualitative study with \
                    implications for emergencies (Australia, 2025)"
                .to_string(),
            authors: "Khadija Abdelrahmman; Bindi Borg; Karleen Gribble; Seema Mihrshahi"
                .to_string(),
            source: "Frontiers in Nutrition (2025). DOI: 10.3389/fnut.2025.1456675".to_string(),
            url: "https://www.frontiersin.org/articles/10.3389/fnut.2025.1456675/full".to_string(),
            summary: "Estudio cualitativo que explora facilitadores y barreras de la lactancia \
                      cruzada en emergencias; identifica barreras culturales, religiosas y \
                      estructurales y sugiere protocolos para una implementación segura."
                .to_string(),
        },
    ]
}

/// Local JSON cache of the article list.
#[derive(Debug, Clone)]
pub struct ArticleCache {
    path: PathBuf,
}

impl ArticleCache {
    /// Create a cache backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached list. Missing or unparsable files yield `None`.
    #[must_use]
    pub fn read(&self) -> Option<Vec<Article>> {
        if !self.path.exists() {
            return None;
        }
        let articles: Vec<Article> = store::read_array(&self.path);
        if articles.is_empty() {
            None
        } else {
            Some(articles)
        }
    }

    /// Overwrite the cache with a fresh list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file rewrite fails.
    pub fn write(&self, articles: &[Article]) -> Result<()> {
        store::write_array(&self.path, articles)
    }
}

/// File-backed remote endpoint configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfigStore {
    path: PathBuf,
}

impl RemoteConfigStore {
    /// Create a store backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the remote configuration. Missing or corrupt files yield the
    /// default (no remote URL).
    #[must_use]
    pub fn load(&self) -> RemoteConfig {
        if !self.path.exists() {
            return RemoteConfig::default();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(body) => serde_json::from_str(&body).unwrap_or_else(|err| {
                warn!("unparsable remote config {}: {err}", self.path.display());
                RemoteConfig::default()
            }),
            Err(err) => {
                warn!("unreadable remote config {}: {err}", self.path.display());
                RemoteConfig::default()
            }
        }
    }

    /// Persist the remote configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file rewrite fails.
    pub fn save(&self, config: &RemoteConfig) -> Result<()> {
        store::write_json(&self.path, config)
    }
}
