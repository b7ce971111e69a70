//! Service configuration.
//!
//! Every knob the HTTP service and its background tasks need lives in
//! [`ServiceConfig`], which is built once by the composition root and passed
//! down by value. Nothing in the workspace reads global state for these.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default directory for transient uploads.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Default directory for converted artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default upload limit: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 << 20;

/// Default delay between the first download of an artifact and its removal.
pub const DEFAULT_RETENTION_DELAY: Duration = Duration::from_secs(5 * 60);

/// Default age after which the sweeper removes leftover files.
pub const DEFAULT_ARTIFACT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default interval between sweeper passes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Configuration for the conversion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory where uploaded documents are staged.
    pub upload_dir: PathBuf,
    /// Directory where converted artifacts are written and served from.
    pub output_dir: PathBuf,
    /// Address to bind.
    pub host: IpAddr,
    /// Port to bind.
    pub port: u16,
    /// Maximum size of the uploaded file, in bytes.
    pub max_file_size: u64,
    /// How long an artifact survives after its first download request.
    #[serde(with = "duration_secs")]
    pub retention_delay: Duration,
    /// Files older than this are swept from both directories.
    /// `None` disables the sweeper.
    #[serde(with = "option_duration_secs")]
    pub artifact_ttl: Option<Duration>,
    /// How often the sweeper runs.
    #[serde(with = "duration_secs")]
    pub sweep_interval: Duration,
    /// Upper bound on a single conversion. `None` waits indefinitely.
    #[serde(with = "option_duration_secs")]
    pub conversion_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            retention_delay: DEFAULT_RETENTION_DELAY,
            artifact_ttl: Some(DEFAULT_ARTIFACT_TTL),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            conversion_timeout: None,
        }
    }
}

impl ServiceConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both storage directories.
    #[must_use]
    pub fn with_dirs(
        mut self,
        upload_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        self.upload_dir = upload_dir.into();
        self.output_dir = output_dir.into();
        self
    }

    /// Set the bind address.
    #[must_use]
    pub const fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Set the bind port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the upload size limit in bytes.
    #[must_use]
    pub const fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set the post-download retention delay.
    #[must_use]
    pub const fn with_retention_delay(mut self, delay: Duration) -> Self {
        self.retention_delay = delay;
        self
    }

    /// Set the sweeper TTL. `None` disables sweeping.
    #[must_use]
    pub const fn with_artifact_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.artifact_ttl = ttl;
        self
    }

    /// Set the sweeper interval.
    #[must_use]
    pub const fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the per-conversion timeout.
    #[must_use]
    pub const fn with_conversion_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.conversion_timeout = timeout;
        self
    }

    /// Check the configuration for values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_dir.as_os_str().is_empty() || self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDirectory);
        }
        if self.upload_dir == self.output_dir {
            return Err(ConfigError::SharedDirectory(self.upload_dir.clone()));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::ZeroFileSize);
        }
        if let Some(ttl) = self.artifact_ttl {
            if self.sweep_interval.is_zero() {
                return Err(ConfigError::ZeroSweepInterval);
            }
            if ttl <= self.retention_delay {
                return Err(ConfigError::TtlWithinRetention {
                    ttl,
                    retention: self.retention_delay,
                });
            }
        }
        if self.conversion_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroConversionTimeout);
        }
        Ok(())
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Upload and output directories cannot be empty")]
    EmptyDirectory,

    #[error("Upload and output directories must differ, both are {0}")]
    SharedDirectory(PathBuf),

    #[error("Maximum file size must be greater than zero")]
    ZeroFileSize,

    #[error("Sweep interval must be greater than zero when the sweeper is enabled")]
    ZeroSweepInterval,

    #[error("Conversion timeout must be greater than zero when set")]
    ZeroConversionTimeout,

    #[error("Artifact TTL ({ttl:?}) must exceed the retention delay ({retention:?})")]
    TtlWithinRetention { ttl: Duration, retention: Duration },
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod option_duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|v| v.map(Duration::from_secs))
    }
}
