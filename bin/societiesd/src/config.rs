//! Server configuration, loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use societies_notify::{MailConfig, SlackConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Listen address, overridable with `--listen`.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret shared with the identity provider.
    pub secret: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    /// Sender address for all outbound email.
    #[serde(default)]
    pub sender: String,
    /// CIO mailbox for redemption creation notices.
    #[serde(default)]
    pub cio_email: String,
    /// Public base URL used in email links.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub mailgun: Option<MailConfig>,
    #[serde(default)]
    pub slack: Option<SlackConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    /// Staff directory API base url. Claims enrichment is skipped when
    /// unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ServerConfig {
    /// A bare name resolves to `/etc/societies/<name>.toml`; anything
    /// containing a `/` or `.` is taken as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/societies/{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("cannot parse {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("societies.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/societies/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn test_load_minimal_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            r#"
[storage]
data_dir = "/var/lib/societies"

[jwt]
secret = "s3cret"
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.jwt.secret, "s3cret");
        assert!(config.notify.mailgun.is_none());
        assert!(config.directory.base_url.is_none());
        assert_eq!(
            config.sqlite_path(),
            PathBuf::from("/var/lib/societies/societies.db")
        );
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            r#"
[server]
listen = "127.0.0.1:9000"

[storage]
data_dir = "/tmp/societies"

[jwt]
secret = "s3cret"

[notify]
sender = "societies@andela.com"
cio_email = "cio@andela.com"
base_url = "https://societies.andela.com"

[notify.mailgun]
domain = "mg.andela.com"
api_key = "key-123"

[directory]
base_url = "https://api.andela.com"
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9000");
        assert_eq!(config.notify.sender, "societies@andela.com");
        assert_eq!(config.notify.mailgun.as_ref().unwrap().domain, "mg.andela.com");
        assert_eq!(config.directory.base_url.as_deref(), Some("https://api.andela.com"));
    }
}
