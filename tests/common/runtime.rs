use anyhow::{bail, Result};
use std::{
    env,
    fs,
    os::unix::net::UnixStream,
    path::{Path, PathBuf},
    sync::OnceLock,
    thread,
    time::{Duration, Instant},
};

const SOCKET_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Ensure testcontainers can reach a Docker API socket.
///
/// Uses `DOCKER_HOST` when set, then the Docker socket, then a Podman socket
/// (exported through `DOCKER_HOST`).
///
/// # Errors
/// Returns an error if no reachable socket is found.
pub fn ensure_container_runtime() -> Result<()> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    match INIT.get_or_init(init_container_runtime) {
        Ok(()) => Ok(()),
        Err(message) => bail!("{message}"),
    }
}

fn init_container_runtime() -> Result<(), String> {
    if let Ok(docker_host) = env::var("DOCKER_HOST") {
        return validate_docker_host(&docker_host);
    }

    let docker_socket = Path::new("/var/run/docker.sock");
    if wait_for_socket(docker_socket, SOCKET_WAIT_TIMEOUT) {
        return Ok(());
    }

    if let Some(path) = find_podman_socket() {
        if wait_for_socket(&path, SOCKET_WAIT_TIMEOUT) {
            // set once, before any container starts
            env::set_var("DOCKER_HOST", format!("unix://{}", path.display()));
            return Ok(());
        }
        return Err(format!(
            "Podman socket found at `{}`, but it is not accepting connections. Start `podman.socket`.",
            path.display()
        ));
    }

    if docker_socket.exists() {
        return Err(format!(
            "Docker socket found at `{}`, but it is not accepting connections. Start the Docker daemon or set `DOCKER_HOST`.",
            docker_socket.display()
        ));
    }

    Err("No container runtime socket found. Start Docker or `podman.socket`, or set `DOCKER_HOST`.".to_string())
}

fn validate_docker_host(docker_host: &str) -> Result<(), String> {
    let path = docker_host.strip_prefix("unix://").unwrap_or(docker_host);
    if !path.starts_with('/') {
        // tcp:// and friends are left to testcontainers
        return Ok(());
    }
    if wait_for_socket(Path::new(path), SOCKET_WAIT_TIMEOUT) {
        return Ok(());
    }
    Err(format!(
        "`DOCKER_HOST` points to `{docker_host}`, but the socket is not accepting connections."
    ))
}

fn find_podman_socket() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(runtime_dir) = env::var("XDG_RUNTIME_DIR") {
        candidates.push(PathBuf::from(runtime_dir).join("podman/podman.sock"));
    }
    if let Some(uid) = read_uid() {
        candidates.push(PathBuf::from(format!("/run/user/{uid}/podman/podman.sock")));
    }
    candidates.push(PathBuf::from("/var/run/podman/podman.sock"));
    candidates.push(PathBuf::from("/run/podman/podman.sock"));

    candidates.into_iter().find(|path| path.exists())
}

fn wait_for_socket(path: &Path, timeout: Duration) -> bool {
    if !path.exists() {
        return false;
    }
    let start = Instant::now();
    while start.elapsed() < timeout {
        if UnixStream::connect(path).is_ok() {
            return true;
        }
        thread::sleep(Duration::from_millis(200));
    }
    false
}

fn read_uid() -> Option<u32> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find_map(|line| line.strip_prefix("Uid:"))?;
    line.split_whitespace().next()?.parse().ok()
}
