//! Analysis settings

use crate::error::{Error, Result};
use crate::reply::{ReplyAnalyzer, SelfIdentity};
use crate::transcript::MAX_CHUNK_CHARS;
use serde::{Deserialize, Serialize};

const fn default_max_chunk_chars() -> usize {
    MAX_CHUNK_CHARS
}

/// Who "self" is and how thread text is chunked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Address whose messages count as replies
    pub self_address: String,

    /// Other addresses of the same person
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Transcript size limit per summarization chunk
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
}

impl AnalysisConfig {
    pub fn new(self_address: impl Into<String>) -> Self {
        Self {
            self_address: self_address.into(),
            aliases: Vec::new(),
            max_chunk_chars: MAX_CHUNK_CHARS,
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for address in std::iter::once(&self.self_address).chain(&self.aliases) {
            if !address.contains('@') {
                return Err(Error::Config(format!(
                    "\"{address}\" is not an email address"
                )));
            }
        }

        if self.max_chunk_chars == 0 {
            return Err(Error::Config("max_chunk_chars must be positive".into()));
        }

        Ok(())
    }

    #[must_use]
    pub fn identity(&self) -> SelfIdentity {
        self.aliases
            .iter()
            .fold(SelfIdentity::new(&self.self_address), |identity, alias| {
                identity.with_alias(alias)
            })
    }

    #[must_use]
    pub fn analyzer(&self) -> ReplyAnalyzer {
        ReplyAnalyzer::new(self.identity())
    }
}
