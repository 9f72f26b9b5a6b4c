use anyhow::{Context, Result};
use beehive_core::{BeehiveConfig, BeehiveError, CliErrorDisplay, Session, Wiring};
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub core: BeehiveConfig,
    pub source: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            core: BeehiveConfig::default(),
            source: None,
        }
    }
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let core = match path {
            Some(path) => BeehiveConfig::load_from_paths(vec![path.to_path_buf()])
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => BeehiveConfig::load().context("Failed to load configuration")?,
        };

        Ok(Self {
            core,
            source: path.map(Path::to_path_buf),
        })
    }

    pub fn session(&self) -> Result<Session> {
        self.core.session().map_err(|e| {
            let err = BeehiveError::from(e);
            anyhow::anyhow!("{}", CliErrorDisplay::new(&err).to_string().trim_end())
        })
    }

    pub fn wiring(&self) -> Result<Wiring> {
        let session = self.session()?;
        Ok(Wiring::new(&self.core, session)?)
    }

    pub fn colors_enabled(&self) -> bool {
        self.core.display.color
    }

    pub fn format_time(&self, at: &DateTime<Utc>) -> String {
        at.with_timezone(&Local)
            .format(&self.core.display.datetime_format)
            .to_string()
    }
}
