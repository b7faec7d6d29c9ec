//! Host environment detection.

use crate::backend::Backend;

/// Package-manager backends confirmed usable on this host, in fallback
/// priority order: native managers first, Homebrew next, the script
/// backend always last.
#[derive(Debug, Clone)]
pub struct Environment {
    backends: Vec<Backend>,
}

impl Environment {
    /// Probe the host for available backends.
    ///
    /// A missing binary is a normal outcome, never an error. The script
    /// backend needs nothing beyond a shell and is appended unconditionally,
    /// so detection succeeds even on a host with no package manager at all.
    pub fn detect() -> Self {
        let mut backends = Vec::new();

        for backend in [Backend::Apt, Backend::Pacman] {
            if which::which(backend.probe_command()).is_ok() {
                backends.push(backend);
            }
        }

        if which::which(Backend::Brew.probe_command()).is_ok() {
            backends.push(Backend::Brew);
        }

        backends.push(Backend::Script);
        Self { backends }
    }

    /// Build an environment from an explicit backend list.
    pub fn from_backends(backends: Vec<Backend>) -> Self {
        Self { backends }
    }

    /// Available backends in priority order.
    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn contains(&self, backend: Backend) -> bool {
        self.backends.contains(&backend)
    }
}
