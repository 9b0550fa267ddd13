//! provision
//!
//! Make sure the analysis engine is installed locally.
//!
//! # Design
//!
//! [`ensure_engine`] is the whole policy: if the engine's `bin` directory
//! exists it is returned untouched; otherwise the release archive is
//! downloaded into a temporary file under the work directory, unpacked there,
//! and the temporary file is removed on every exit path.
//!
//! The mechanics sit behind [`EnginePackage`] so the policy can be tested
//! without a network or an `unzip` binary. [`ReleasePackage`] is the real
//! implementation.
//!
//! There is no retry, no timeout and no lock. Two hooks racing to install
//! both extract the same immutable archive over the same directory.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::config::APP_NAME;
use crate::core::paths::HookPaths;

/// Errors from installing the engine.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Local filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being created or written
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// The async runtime for the download could not be started.
    #[error("failed to start download runtime: {0}")]
    Runtime(std::io::Error),

    /// The request failed or the body could not be read.
    #[error("download of {url} failed: {source}")]
    Download {
        /// The release URL
        url: String,
        /// The underlying error
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("download of {url} returned HTTP {status}")]
    HttpStatus {
        /// The release URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Unpacking the archive failed.
    #[error("failed to extract {archive}: {message}")]
    Extract {
        /// The archive being unpacked
        archive: PathBuf,
        /// Description of the failure
        message: String,
    },
}

impl ProvisionError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ProvisionError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// An installable engine release.
pub trait EnginePackage {
    /// Directory holding the engine's launcher scripts once installed.
    fn bin_dir(&self) -> PathBuf;

    /// Whether the engine is already installed.
    ///
    /// Existence of [`bin_dir`](Self::bin_dir) is the only check; nothing is
    /// validated inside it.
    fn is_installed(&self) -> bool {
        self.bin_dir().exists()
    }

    /// Fetch the release archive into `dest`, which already exists and is
    /// truncated by the implementation.
    fn download(&self, dest: &Path) -> Result<(), ProvisionError>;

    /// Unpack `archive` so that [`bin_dir`](Self::bin_dir) appears.
    fn extract(&self, archive: &Path) -> Result<(), ProvisionError>;
}

/// Return the engine's bin directory, installing the engine first if needed.
///
/// # Errors
///
/// Any failure creating `work_dir`, downloading or extracting. Nothing is
/// retried and the temporary archive never outlives this call. A failed
/// extraction removes whatever `bin` directory it left behind, so the next
/// run installs again instead of trusting a partial tree.
pub fn ensure_engine(
    package: &dyn EnginePackage,
    work_dir: &Path,
) -> Result<PathBuf, ProvisionError> {
    let bin_dir = package.bin_dir();
    if package.is_installed() {
        debug!("engine found at {}", bin_dir.display());
        return Ok(bin_dir);
    }

    info!("{} is installing PMD...", APP_NAME);
    std::fs::create_dir_all(work_dir).map_err(|e| ProvisionError::io(work_dir, e))?;

    // Removed when dropped, whichever way this function returns.
    let archive = tempfile::Builder::new()
        .prefix("pmd-")
        .suffix(".zip")
        .tempfile_in(work_dir)
        .map_err(|e| ProvisionError::io(work_dir, e))?
        .into_temp_path();

    debug!("downloading engine archive to {}", archive.display());
    package.download(&archive)?;
    debug!("extracting engine archive into {}", work_dir.display());
    if let Err(e) = package.extract(&archive) {
        if bin_dir.exists() {
            if let Err(cleanup) = std::fs::remove_dir_all(&bin_dir) {
                warn!("could not remove partial install at {}: {}", bin_dir.display(), cleanup);
            }
        }
        return Err(e);
    }

    Ok(bin_dir)
}

/// The published engine release archive.
#[derive(Debug, Clone)]
pub struct ReleasePackage {
    url: String,
    paths: HookPaths,
}

impl ReleasePackage {
    /// Create a package for the release at `url`, installed under `paths`.
    pub fn new(url: impl Into<String>, paths: HookPaths) -> Self {
        Self {
            url: url.into(),
            paths,
        }
    }

    /// The release URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn download_async(&self, dest: &Path) -> Result<(), ProvisionError> {
        let download_err = |source| ProvisionError::Download {
            url: self.url.clone(),
            source,
        };

        let mut response = reqwest::get(&self.url).await.map_err(download_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProvisionError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let mut file = File::create(dest).map_err(|e| ProvisionError::io(dest, e))?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(download_err)? {
            file.write_all(&chunk).map_err(|e| ProvisionError::io(dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush().map_err(|e| ProvisionError::io(dest, e))?;

        debug!("downloaded {} bytes from {}", written, self.url);
        Ok(())
    }
}

impl EnginePackage for ReleasePackage {
    fn bin_dir(&self) -> PathBuf {
        self.paths.engine_bin_dir()
    }

    fn download(&self, dest: &Path) -> Result<(), ProvisionError> {
        info!("downloading {}", self.url);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProvisionError::Runtime)?;
        runtime.block_on(self.download_async(dest))
    }

    fn extract(&self, archive: &Path) -> Result<(), ProvisionError> {
        let work_dir = self.paths.work_dir();
        let status = Command::new("unzip")
            .arg("-q")
            .arg("-o")
            .arg(archive)
            .arg("-d")
            .arg(work_dir)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| ProvisionError::Extract {
                archive: archive.to_path_buf(),
                message: format!("could not run unzip: {}", e),
            })?;

        if !status.success() {
            return Err(ProvisionError::Extract {
                archive: archive.to_path_buf(),
                message: format!("unzip exited with {}", status),
            });
        }

        Ok(())
    }
}
