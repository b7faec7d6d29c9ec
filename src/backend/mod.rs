//! Package-manager backends and their capabilities.
//!
//! [`Backend`] is the closed set of package-manager families kit can drive.
//! Matches over it carry no default arm: adding a backend forces an update
//! to the capability table and the executor dispatch.

mod executor;

pub use executor::{InstallExecutor, SystemExecutor};

/// A package-manager family that can install tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// APT - Debian/Ubuntu family
    Apt,
    /// Pacman - Arch Linux family
    Pacman,
    /// Homebrew - cross-platform fallback
    Brew,
    /// Installer script run through the shell, always available
    Script,
}

impl Backend {
    /// Key identifying this backend in a recipe's `[install.*]` tables.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Pacman => "pacman",
            Self::Brew => "brew",
            Self::Script => "script",
        }
    }

    /// Command probed to decide whether the backend is usable on this host.
    pub fn probe_command(&self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Pacman => "pacman",
            Self::Brew => "brew",
            Self::Script => "sh",
        }
    }

    /// Returns true if this is a distribution's primary package manager.
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Apt | Self::Pacman)
    }

    /// Whether this backend can honor an explicit version request.
    ///
    /// Every variant is classified here; there is no default arm, so a new
    /// backend cannot slip through unclassified.
    pub fn supports_versioning(&self) -> bool {
        match self {
            Self::Apt => true,
            Self::Script => true,
            Self::Brew => false,
            Self::Pacman => false,
        }
    }

    /// Get a human-readable name for this backend.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Apt => "APT",
            Self::Pacman => "Pacman",
            Self::Brew => "Homebrew",
            Self::Script => "Script",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
