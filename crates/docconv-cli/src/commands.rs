//! Main commands enum and primary subcommands.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use docconv_core::ServiceConfig;
use docconv_core::config::{
    DEFAULT_MAX_FILE_SIZE, DEFAULT_OUTPUT_DIR, DEFAULT_PORT, DEFAULT_UPLOAD_DIR,
};
use docconv_runtime::DEFAULT_SOFFICE_BINARY;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP conversion service
    Serve(ServeArgs),

    /// Convert a single DOCX file to PDF
    Convert {
        /// DOCX file to convert
        input: PathBuf,
        /// Destination PDF (defaults to the input path with a .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// LibreOffice binary used for conversion
        #[arg(long, env = "DOCCONV_SOFFICE", default_value = DEFAULT_SOFFICE_BINARY)]
        soffice: PathBuf,
    },

    /// Check that the conversion engine is installed and runnable
    CheckDeps {
        /// LibreOffice binary to probe
        #[arg(long, env = "DOCCONV_SOFFICE", default_value = DEFAULT_SOFFICE_BINARY)]
        soffice: PathBuf,
    },
}

/// Options for `docconv serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "DOCCONV_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "DOCCONV_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory for transient uploads
    #[arg(long, env = "DOCCONV_UPLOAD_DIR", default_value = DEFAULT_UPLOAD_DIR)]
    pub upload_dir: PathBuf,

    /// Directory for converted artifacts
    #[arg(long, env = "DOCCONV_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Maximum upload size in bytes
    #[arg(long, env = "DOCCONV_MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// Seconds between the first download of an artifact and its removal
    #[arg(long, env = "DOCCONV_RETENTION_SECS", default_value_t = 300)]
    pub retention_secs: u64,

    /// Age in seconds after which leftover files are swept (0 disables the sweeper)
    #[arg(long, env = "DOCCONV_ARTIFACT_TTL_SECS", default_value_t = 3600)]
    pub artifact_ttl_secs: u64,

    /// Seconds between sweeps
    #[arg(long, env = "DOCCONV_SWEEP_INTERVAL_SECS", default_value_t = 300)]
    pub sweep_interval_secs: u64,

    /// Per-conversion timeout in seconds (unbounded when unset)
    #[arg(long, env = "DOCCONV_CONVERSION_TIMEOUT_SECS")]
    pub conversion_timeout_secs: Option<u64>,

    /// LibreOffice binary used for conversion
    #[arg(long, env = "DOCCONV_SOFFICE", default_value = DEFAULT_SOFFICE_BINARY)]
    pub soffice: PathBuf,
}

impl ServeArgs {
    /// Build the service configuration from the parsed flags.
    pub fn to_config(&self) -> ServiceConfig {
        let ttl = (self.artifact_ttl_secs > 0).then(|| Duration::from_secs(self.artifact_ttl_secs));

        ServiceConfig::new()
            .with_dirs(&self.upload_dir, &self.output_dir)
            .with_host(self.host)
            .with_port(self.port)
            .with_max_file_size(self.max_file_size)
            .with_retention_delay(Duration::from_secs(self.retention_secs))
            .with_artifact_ttl(ttl)
            .with_sweep_interval(Duration::from_secs(self.sweep_interval_secs))
            .with_conversion_timeout(self.conversion_timeout_secs.map(Duration::from_secs))
    }
}
