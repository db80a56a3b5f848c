//! Execution environment detection
//!
//! The prompt-enhancement backend is reached at a different host name from
//! inside a container than from the host machine. Detection runs once at
//! config-load time and produces a plain endpoint string; nothing else in
//! the pipeline probes the filesystem.

use std::path::Path;

const DOCKERENV_MARKER: &str = "/.dockerenv";
const CGROUP_PATH: &str = "/proc/1/cgroup";

const CONTAINER_ENHANCER_ENDPOINT: &str = "http://host.docker.internal:11434/api/generate";
const LOCAL_ENHANCER_ENDPOINT: &str = "http://localhost:11434/api/generate";

/// Where the process is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Containerized,
    Local,
}

impl Environment {
    /// Detect the current environment from host-level container markers
    pub fn detect() -> Self {
        Self::detect_from(Path::new(DOCKERENV_MARKER), Path::new(CGROUP_PATH))
    }

    fn detect_from(dockerenv: &Path, cgroup: &Path) -> Self {
        if dockerenv.exists() {
            return Environment::Containerized;
        }
        if let Ok(content) = std::fs::read_to_string(cgroup) {
            if content.contains("docker") || content.contains("containerd") {
                return Environment::Containerized;
            }
        }
        Environment::Local
    }

    /// Default text-generation endpoint for this environment
    pub fn default_enhancer_endpoint(&self) -> &'static str {
        match self {
            Environment::Containerized => CONTAINER_ENHANCER_ENDPOINT,
            Environment::Local => LOCAL_ENHANCER_ENDPOINT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atelier_env_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_dockerenv_marker_wins() {
        let dir = temp_dir();
        let marker = dir.join(".dockerenv");
        std::fs::File::create(&marker).unwrap();

        let env = Environment::detect_from(&marker, &dir.join("missing_cgroup"));
        assert_eq!(env, Environment::Containerized);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cgroup_containerd_marker() {
        let dir = temp_dir();
        let cgroup = dir.join("cgroup");
        let mut f = std::fs::File::create(&cgroup).unwrap();
        f.write_all(b"12:cpuset:/containerd/abc123\n").unwrap();

        let env = Environment::detect_from(&dir.join("missing_dockerenv"), &cgroup);
        assert_eq!(env, Environment::Containerized);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_markers_is_local() {
        let dir = temp_dir();
        let cgroup = dir.join("cgroup");
        let mut f = std::fs::File::create(&cgroup).unwrap();
        f.write_all(b"0::/init.scope\n").unwrap();

        let env = Environment::detect_from(&dir.join("missing_dockerenv"), &cgroup);
        assert_eq!(env, Environment::Local);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_endpoints_differ_by_environment() {
        assert_ne!(
            Environment::Containerized.default_enhancer_endpoint(),
            Environment::Local.default_enhancer_endpoint()
        );
        assert!(Environment::Local
            .default_enhancer_endpoint()
            .contains("localhost"));
    }
}
