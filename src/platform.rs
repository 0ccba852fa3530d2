use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Closed set of supported operating systems. Anything that cannot be
/// mapped onto one of these fails detection; there is no fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsTag {
    Linux,
    Darwin,
    Windows,
}

impl fmt::Display for OsTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OsTag::Linux => "linux",
            OsTag::Darwin => "darwin",
            OsTag::Windows => "windows",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized platform '{0}'")]
pub struct UnrecognizedPlatform(pub String);

/// Prefixes of POSIX-emulation environments that report their own platform
/// identifier while running on Windows (e.g. "MINGW64_NT-10.0").
const WINDOWS_EMULATION_PREFIXES: &[&str] = &["mingw", "msys", "cygwin"];

/// Map a raw host platform identifier to an [`OsTag`].
///
/// Pure function over the identifier string; the one system call that
/// produces the identifier lives in [`PlatformTarget::for_host`].
pub fn detect_os(raw: &str) -> Result<OsTag, UnrecognizedPlatform> {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "linux" => Ok(OsTag::Linux),
        "darwin" => Ok(OsTag::Darwin),
        "windows" => Ok(OsTag::Windows),
        _ if WINDOWS_EMULATION_PREFIXES
            .iter()
            .any(|prefix| normalized.starts_with(prefix)) =>
        {
            Ok(OsTag::Windows)
        }
        _ => Err(UnrecognizedPlatform(raw.to_string())),
    }
}

/// Normalize a raw CPU architecture to the naming used in release asset
/// file names.
pub fn normalize_arch(raw: &str) -> String {
    match raw {
        "x86_64" => "amd64".to_string(),
        "aarch64" => "arm64".to_string(),
        other => other.to_string(),
    }
}

/// Everything platform-specific an install attempt needs, computed once per
/// run. The archive and install paths are fixed process-global locations;
/// two concurrent invocations on the same host would race on them, which is
/// an accepted constraint of this tool. Tests substitute the paths via the
/// `with_*` builders.
#[derive(Debug, Clone)]
pub struct PlatformTarget {
    pub os: OsTag,
    /// Required asset file name suffix, e.g. "_linux_amd64.tar.gz".
    pub asset_suffix: String,
    /// Fixed temporary location the archive is downloaded to.
    pub archive_path: PathBuf,
    /// Directory the archive is extracted into.
    pub install_dir: PathBuf,
    /// Directory on the executable search path the binary is linked into
    /// (unix only; on Windows the install dir is the exposure point).
    pub bin_dir: PathBuf,
    /// File name of the installed binary.
    pub binary_name: String,
}

impl PlatformTarget {
    pub fn new(os: OsTag, arch: &str, tool: &str) -> Self {
        let (archive_ext, binary_name) = match os {
            OsTag::Windows => ("zip", format!("{}.exe", tool)),
            _ => ("tar.gz", tool.to_string()),
        };
        let (install_dir, bin_dir) = match os {
            OsTag::Windows => {
                let dir = PathBuf::from(format!("C:\\Program Files\\{}", tool));
                (dir.clone(), dir)
            }
            _ => (
                PathBuf::from("/usr/local/lib").join(tool),
                PathBuf::from("/usr/local/bin"),
            ),
        };
        Self {
            os,
            asset_suffix: format!("_{}_{}.{}", os, arch, archive_ext),
            archive_path: env::temp_dir().join(format!("{}_download.{}", tool, archive_ext)),
            install_dir,
            bin_dir,
            binary_name,
        }
    }

    /// Detect the host platform and derive the target for it.
    pub fn for_host(tool: &str) -> Result<Self, UnrecognizedPlatform> {
        let os = detect_os(env::consts::OS)?;
        Ok(Self::new(os, &normalize_arch(env::consts::ARCH), tool))
    }

    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = dir.into();
        self
    }

    pub fn with_bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = dir.into();
        self
    }

    pub fn with_archive_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = path.into();
        self
    }

    /// Path the installed binary ends up at.
    pub fn installed_binary(&self) -> PathBuf {
        self.install_dir.join(&self.binary_name)
    }
}
