//! Built-in cache backend adapters.

use async_trait::async_trait;
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use super::CacheBackend;
use crate::config::{CacheBackendConfig, CacheBackendKind};
use crate::constants::OBJECT_CACHE_BACKEND;
use crate::error::BackendError;

/// Purge through an HTTP endpoint (CDN, reverse proxy, page cache plugin)
#[derive(Debug, Clone)]
pub struct HttpPurgeBackend {
    name: String,
    client: Client,
    url: String,
    method: Method,
    headers: HashMap<String, String>,
    enabled: bool,
    timeout: Duration,
}

impl HttpPurgeBackend {
    pub fn new(
        name: impl Into<String>,
        client: Client,
        url: impl Into<String>,
        method: &str,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let name = name.into();
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|e| BackendError::new(&name, format!("invalid method '{method}': {e}")))?;

        Ok(Self {
            name,
            client,
            url: url.into(),
            method,
            headers: HashMap::new(),
            enabled: true,
            timeout,
        })
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[async_trait]
impl CacheBackend for HttpPurgeBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_active(&self) -> bool {
        self.enabled && !self.url.is_empty()
    }

    async fn purge(&self) -> Result<(), BackendError> {
        let mut request = self
            .client
            .request(self.method.clone(), &self.url)
            .timeout(self.timeout);
        for (header, value) in &self.headers {
            request = request.header(header.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("request timeout ({}s)", self.timeout.as_secs())
            } else {
                format!("request error: {e}")
            };
            BackendError::new(&self.name, reason)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::new(
                &self.name,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        debug!(backend = %self.name, status = status.as_u16(), "HTTP purge accepted");
        Ok(())
    }
}

/// Purge by running a local program, e.g. `wp cache flush`
#[derive(Debug, Clone)]
pub struct CommandBackend {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandBackend {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        args: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            timeout,
        }
    }

    async fn run(&self) -> Result<(), BackendError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                BackendError::new(
                    &self.name,
                    format!("command timed out after {}s", self.timeout.as_secs()),
                )
            })?
            .map_err(|e| BackendError::new(&self.name, format!("spawn failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::new(
                &self.name,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_active(&self) -> bool {
        resolve_program(&self.program).is_some()
    }

    async fn purge(&self) -> Result<(), BackendError> {
        self.run().await
    }
}

/// Universal fallback: always active.
///
/// Delegates to a command or HTTP purge when configured, otherwise only logs.
pub struct ObjectCacheBackend {
    name: String,
    delegate: Option<Arc<dyn CacheBackend>>,
}

impl std::fmt::Debug for ObjectCacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCacheBackend")
            .field("name", &self.name)
            .field("has_delegate", &self.delegate.is_some())
            .finish()
    }
}

impl ObjectCacheBackend {
    pub fn noop() -> Self {
        Self {
            name: OBJECT_CACHE_BACKEND.to_string(),
            delegate: None,
        }
    }

    pub fn with_delegate(name: impl Into<String>, delegate: Arc<dyn CacheBackend>) -> Self {
        Self {
            name: name.into(),
            delegate: Some(delegate),
        }
    }
}

impl Default for ObjectCacheBackend {
    fn default() -> Self {
        Self::noop()
    }
}

#[async_trait]
impl CacheBackend for ObjectCacheBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_active(&self) -> bool {
        true
    }

    async fn purge(&self) -> Result<(), BackendError> {
        match &self.delegate {
            Some(delegate) => delegate.purge().await,
            None => {
                info!(backend = %self.name, "No object cache flush configured; nothing to purge");
                Ok(())
            }
        }
    }
}

/// Build the prioritised backend list and the fallback from configuration.
///
/// The fallback is the configured `object_cache` entry, or a no-op one.
pub fn build_backends(
    configs: &[CacheBackendConfig],
    client: &Client,
) -> Result<(Vec<Arc<dyn CacheBackend>>, Arc<dyn CacheBackend>), BackendError> {
    let mut backends: Vec<Arc<dyn CacheBackend>> = Vec::new();
    let mut fallback: Option<Arc<dyn CacheBackend>> = None;

    for config in configs {
        let timeout = Duration::from_secs(config.timeout_seconds);
        match &config.kind {
            CacheBackendKind::HttpPurge {
                url,
                method,
                headers,
                enabled,
            } => {
                let backend = HttpPurgeBackend::new(&config.name, client.clone(), url, method, timeout)?
                    .with_headers(headers.clone())
                    .with_enabled(*enabled);
                backends.push(Arc::new(backend));
            }
            CacheBackendKind::Command { program, args } => {
                backends.push(Arc::new(CommandBackend::new(
                    &config.name,
                    program,
                    args.clone(),
                    timeout,
                )));
            }
            CacheBackendKind::ObjectCache { program, args, url } => {
                let delegate: Option<Arc<dyn CacheBackend>> = match (program, url) {
                    (Some(program), _) => Some(Arc::new(CommandBackend::new(
                        &config.name,
                        program,
                        args.clone(),
                        timeout,
                    ))),
                    (None, Some(url)) => Some(Arc::new(HttpPurgeBackend::new(
                        &config.name,
                        client.clone(),
                        url,
                        "POST",
                        timeout,
                    )?)),
                    (None, None) => None,
                };
                fallback = Some(Arc::new(match delegate {
                    Some(delegate) => ObjectCacheBackend::with_delegate(&config.name, delegate),
                    None => ObjectCacheBackend {
                        name: config.name.clone(),
                        delegate: None,
                    },
                }));
            }
        }
    }

    let fallback = fallback.unwrap_or_else(|| Arc::new(ObjectCacheBackend::noop()));
    Ok((backends, fallback))
}

/// Locate a program either by explicit path or on `PATH`
fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}
