use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime configuration for the extractor service
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Maximum accepted request body in bytes (default: 16 MB)
    pub max_upload_size: usize,

    /// Root directory for per-request scratch space (default: "uploads")
    pub scratch_dir: PathBuf,

    /// Listen address (default: 127.0.0.1:5000)
    pub bind_addr: SocketAddr,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 16 * 1024 * 1024, // 16 MB
            scratch_dir: PathBuf::from("uploads"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(default.max_upload_size),

            scratch_dir: env::var("SCRATCH_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.scratch_dir),

            bind_addr: env::var("BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.bind_addr),
        }
    }

    /// Smaller 10 MB limit with scratch space under the system temp dir
    pub fn development() -> Self {
        Self {
            max_upload_size: 10 * 1024 * 1024,
            scratch_dir: env::temp_dir().join("metadata-extractor"),
            ..Self::default()
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }
}
