use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::cons::provider_cons::ProviderKind;

/// Where a provider's secret may be found: an environment variable first,
/// then a flat file inside the per-user config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSource {
    pub env_var: String,
    pub file_name: String,
}

impl CredentialSource {
    pub fn new(env_var: &str, file_name: &str) -> Self {
        Self {
            env_var: env_var.to_string(),
            file_name: file_name.to_string(),
        }
    }
}

/// Resolves provider secrets on every call. Nothing is cached.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    config_dir: PathBuf,
    sources: HashMap<ProviderKind, CredentialSource>,
}

impl CredentialResolver {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            sources: HashMap::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.config_path())
            .with_source(ProviderKind::Gemini, config.gemini.credential_source())
            .with_source(ProviderKind::HuggingFace, config.huggingface.credential_source())
    }

    pub fn with_source(mut self, provider: ProviderKind, source: CredentialSource) -> Self {
        self.sources.insert(provider, source);
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Environment wins over the config file. Blank values count as absent.
    /// Providers without a registered source always resolve to `None`.
    pub fn resolve(&self, provider: ProviderKind) -> Option<String> {
        let source = self.sources.get(&provider)?;

        if let Some(v) = std::env::var(&source.env_var).ok().and_then(non_blank) {
            return Some(v);
        }

        let path = self.config_dir.join(&source.file_name);
        match fs::read_to_string(&path) {
            Ok(content) => non_blank(content),
            Err(_) => None,
        }
    }

    pub fn is_configured(&self, provider: ProviderKind) -> bool {
        self.resolve(provider).is_some()
    }

    /// Writes the secret file, creating the config directory if needed. The
    /// file is owner read/write only.
    pub fn persist(&self, provider: ProviderKind, credential: &str) -> Result<()> {
        let source = self
            .sources
            .get(&provider)
            .with_context(|| format!("provider {} does not take a credential", provider))?;

        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).context("failed to create config directory")?;
        }

        let path = self.config_dir.join(&source.file_name);
        let mut opts = fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        let mut file = opts
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        file.write_all(credential.as_bytes())
            .context("failed to write credential file")?;

        // mode() only applies on creation; tighten files that already existed
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .context("failed to restrict credential file permissions")?;
        }

        log::info!("Saved {} credential to {}", provider, path.display());
        Ok(())
    }
}

fn non_blank(v: String) -> Option<String> {
    let v = v.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}
