// Configuration constants and environment helpers
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

// Progress reporting intervals
pub const NODE_REPORT_INTERVAL: usize = 500;
pub const EDGE_REPORT_INTERVAL: usize = 1000;

// Defaults for the target store and export location
pub const DEFAULT_NEO4J_HOST: &str = "localhost";
pub const DEFAULT_NEO4J_PORT: u16 = 7687;
pub const DEFAULT_NEO4J_DATABASE: &str = "neo4j";
pub const DEFAULT_EXPORT_DIR: &str = "./export";

/// Connection settings for the target Neo4j database.
#[derive(Clone)]
pub struct Neo4jSettings {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl std::fmt::Debug for Neo4jSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jSettings")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MigrateConfig {
    pub export_dir: PathBuf,
    /// Wipe the target graph before migrating.
    pub clear_target: bool,
    /// Migrate into an in-memory graph instead of Neo4j.
    pub dry_run: bool,
    /// `None` in dry-run mode.
    pub neo4j: Option<Neo4jSettings>,
}

impl MigrateConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let export_dir = lookup("EXPORT_DIR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPORT_DIR.to_string());
        let clear_target = is_enabled(lookup("CLEAR_TARGET"));
        let dry_run = is_enabled(lookup("DRY_RUN"));

        let neo4j = if dry_run {
            None
        } else {
            Some(neo4j_settings(&lookup)?)
        };

        Ok(Self {
            export_dir: PathBuf::from(export_dir),
            clear_target,
            dry_run,
            neo4j,
        })
    }
}

fn is_enabled(value: Option<String>) -> bool {
    value.unwrap_or_else(|| "false".to_string()).to_lowercase() == "true"
}

fn neo4j_settings<F>(lookup: &F) -> Result<Neo4jSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let uri = match lookup("NEO4J_URI").filter(|v| !v.is_empty()) {
        Some(uri) => uri,
        None => {
            let host = lookup("NEO4J_HOST")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_NEO4J_HOST.to_string());
            let port = match lookup("NEO4J_PORT").filter(|v| !v.is_empty()) {
                Some(raw) => raw
                    .parse::<u16>()
                    .with_context(|| format!("NEO4J_PORT must be a port number, got '{}'", raw))?,
                None => DEFAULT_NEO4J_PORT,
            };
            format!("neo4j://{}:{}", host, port)
        }
    };

    let user = lookup("NEO4J_USER").context("NEO4J_USER must be set")?;
    let password = lookup("NEO4J_PASSWORD").context("NEO4J_PASSWORD must be set")?;
    if user.is_empty() {
        bail!("NEO4J_USER must not be empty");
    }

    let database = lookup("NEO4J_DATABASE")
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_NEO4J_DATABASE.to_string());

    Ok(Neo4jSettings {
        uri,
        user,
        password,
        database,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<MigrateConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MigrateConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn builds_uri_from_host_and_port() {
        let config = config(&[
            ("NEO4J_HOST", "graph.local"),
            ("NEO4J_PORT", "7688"),
            ("NEO4J_USER", "neo4j"),
            ("NEO4J_PASSWORD", "secret"),
        ])
        .unwrap();

        let neo4j = config.neo4j.unwrap();
        assert_eq!(neo4j.uri, "neo4j://graph.local:7688");
        assert_eq!(neo4j.database, DEFAULT_NEO4J_DATABASE);
        assert_eq!(config.export_dir, PathBuf::from(DEFAULT_EXPORT_DIR));
        assert!(!config.clear_target);
        assert!(!config.dry_run);
    }

    #[test]
    fn explicit_uri_wins() {
        let config = config(&[
            ("NEO4J_URI", "bolt://10.0.0.5:7687"),
            ("NEO4J_HOST", "ignored"),
            ("NEO4J_USER", "neo4j"),
            ("NEO4J_PASSWORD", "secret"),
            ("NEO4J_DATABASE", "databass"),
            ("EXPORT_DIR", "/srv/export"),
            ("CLEAR_TARGET", "TRUE"),
        ])
        .unwrap();

        let neo4j = config.neo4j.unwrap();
        assert_eq!(neo4j.uri, "bolt://10.0.0.5:7687");
        assert_eq!(neo4j.database, "databass");
        assert_eq!(config.export_dir, PathBuf::from("/srv/export"));
        assert!(config.clear_target);
    }

    #[test]
    fn credentials_are_required_outside_dry_run() {
        let err = config(&[("NEO4J_PASSWORD", "secret")]).unwrap_err();
        assert!(err.to_string().contains("NEO4J_USER"));

        let config = config(&[("DRY_RUN", "true")]).unwrap();
        assert!(config.dry_run);
        assert!(config.neo4j.is_none());
    }

    #[test]
    fn empty_host_and_port_fall_back_to_defaults() {
        let config = config(&[
            ("NEO4J_URI", ""),
            ("NEO4J_HOST", ""),
            ("NEO4J_PORT", ""),
            ("NEO4J_USER", "neo4j"),
            ("NEO4J_PASSWORD", "secret"),
        ])
        .unwrap();

        assert_eq!(config.neo4j.unwrap().uri, "neo4j://localhost:7687");
    }

    #[test]
    fn rejects_bad_port() {
        let err = config(&[
            ("NEO4J_PORT", "bolt"),
            ("NEO4J_USER", "neo4j"),
            ("NEO4J_PASSWORD", "secret"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("NEO4J_PORT"));
    }

    #[test]
    fn password_is_not_logged() {
        let settings = Neo4jSettings {
            uri: "neo4j://localhost:7687".into(),
            user: "neo4j".into(),
            password: "hunter2".into(),
            database: "neo4j".into(),
        };
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}
