// ⚙️ Client configuration - which feed, where it lives, how names resolve

use crate::error::{FeedError, Result};
use crate::resolver::{Catalogue, CatalogueEntry, ResolutionPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Geotag used when a feed block carries no coordinates
pub const DEFAULT_GEOTAG: &str = "0, 0";

/// Registry type the comparison run reads
pub const DEFAULT_FEED_KIND: &str = "feed";

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_geotag() -> String {
    DEFAULT_GEOTAG.to_string()
}

fn default_feed_kind() -> String {
    DEFAULT_FEED_KIND.to_string()
}

/// Per-client settings, loaded from TOML
///
/// ```toml
/// client_key = "acme"
/// data_dir = "/var/lib/bdx"
/// name_filters = [" Collection"]
///
/// [[catalogue]]
/// slug = "1234-lakeside-homes"
/// id = 115
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub client_key: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_feed_kind")]
    pub feed_kind: String,

    #[serde(default)]
    pub name_filters: Vec<String>,

    #[serde(default = "default_geotag")]
    pub default_geotag: String,

    #[serde(default)]
    pub resolution: ResolutionPolicy,

    /// Declared order is the fuzzy-resolution tie-break
    #[serde(default)]
    pub catalogue: Vec<CatalogueEntry>,
}

impl ClientConfig {
    /// Minimal config for a client with an empty catalogue
    pub fn new(client_key: impl Into<String>) -> Self {
        ClientConfig {
            client_key: client_key.into(),
            data_dir: default_data_dir(),
            feed_kind: default_feed_kind(),
            name_filters: Vec::new(),
            default_geotag: default_geotag(),
            resolution: ResolutionPolicy::default(),
            catalogue: Vec::new(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_key.trim().is_empty() {
            return Err(FeedError::Config("client_key must not be empty".to_string()));
        }
        if self.client_key.contains('-') {
            return Err(FeedError::Config(format!(
                "client_key '{}' must not contain '-' (used as filename separator)",
                self.client_key
            )));
        }
        Ok(())
    }

    /// Directory holding this client's dated extracts
    pub fn client_dir(&self) -> PathBuf {
        self.data_dir.join(&self.client_key)
    }

    /// Read-only options shared by every ingestion run of this client
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            name_filters: self.name_filters.clone(),
            catalogue: Catalogue::new(self.catalogue.clone(), self.resolution),
            default_geotag: self.default_geotag.clone(),
        }
    }
}

/// Inputs of the Entity Builder besides the document itself
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub name_filters: Vec<String>,
    pub catalogue: Catalogue,
    pub default_geotag: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            name_filters: Vec::new(),
            catalogue: Catalogue::default(),
            default_geotag: default_geotag(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
