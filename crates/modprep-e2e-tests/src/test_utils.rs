use eyre::Result;
use modprep_lib::config::{Config, ExtraFile, NetworkConfig};
use modprep_lib::installer::{InstallerError, InstallerLauncher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MANIFEST_PATH: &str = "/modlist.txt";
pub const INSTALLER_PATH: &str = "/forge/forge-installer.jar";

pub fn create_test_config(server_uri: &str, root: &Path) -> Config {
    Config {
        manifest_url: format!("{server_uri}{MANIFEST_PATH}"),
        installer_url: format!("{server_uri}{INSTALLER_PATH}"),
        installer_cache_dir: root.join("forge-installer"),
        target_base_dir: root.join("minecraft"),
        extra_files: vec![
            ExtraFile {
                url: format!("{server_uri}/options.txt"),
                file_name: "options.txt".to_string(),
                label: "Minecraft options".to_string(),
            },
            ExtraFile {
                url: format!("{server_uri}/optionsof.txt"),
                file_name: "optionsof.txt".to_string(),
                label: "Optifine options".to_string(),
            },
        ],
        show_progress: false,
        network: NetworkConfig {
            connect_timeout_secs: 5,
            read_timeout_secs: 5,
            ..NetworkConfig::default()
        },
        ..Config::default()
    }
}

pub fn setup_test_environment() -> Result<TempDir> {
    Ok(tempfile::tempdir()?)
}

pub fn write_config_file(config: &Config, dir: &Path) -> Result<PathBuf> {
    let config_path = dir.join("modprep.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(config)?)?;
    Ok(config_path)
}

pub fn mark_runtime_installed(config: &Config) -> Result<()> {
    std::fs::create_dir_all(config.install_marker())?;
    Ok(())
}

/// Serves `body` for GET `rel` and expects exactly `calls` requests.
pub async fn mount_file(server: &MockServer, rel: &str, body: impl Into<Vec<u8>>, calls: u64) {
    Mock::given(method("GET"))
        .and(path(rel))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
        .expect(calls)
        .named(rel.to_string())
        .mount(server)
        .await;
}

pub async fn mount_manifest(server: &MockServer, rel_paths: &[&str]) {
    let body: String = rel_paths
        .iter()
        .map(|rel| format!("{}{}\n", server.uri(), rel))
        .collect();
    mount_file(server, MANIFEST_PATH, body, 1).await;
}

pub async fn mount_options_files(server: &MockServer, calls: u64) {
    mount_file(server, "/options.txt", "renderDistance:8\n", calls).await;
    mount_file(server, "/optionsof.txt", "ofFastRender:true\n", calls).await;
}

/// Paths of all GET requests the server saw, in arrival order.
pub async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.as_str() == "GET")
        .map(|request| request.url.path().to_string())
        .collect()
}

/// Serves every path on a raw socket that announces `announced` bytes, sends
/// `prefix` and then holds the connection open without finishing the body.
pub async fn serve_stalled_body(announced: u64, prefix: &'static [u8]) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Some(is_head) = read_request_head(&mut socket).await else {
                    return;
                };
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {announced}\r\nConnection: close\r\n\r\n"
                );
                if socket.write_all(head.as_bytes()).await.is_err() || is_head {
                    return;
                }
                if socket.write_all(prefix).await.is_ok() {
                    std::future::pending::<()>().await;
                }
            });
        }
    });

    Ok(format!("http://{addr}"))
}

/// Reads up to the end of the request headers; `Some(true)` for HEAD.
async fn read_request_head(socket: &mut TcpStream) -> Option<bool> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    Some(request.starts_with(b"HEAD"))
}

/// Stands in for the interactive installer: creates the version directory
/// on the `succeed_on`-th launch.
#[derive(Clone, Debug)]
pub struct ScriptedLauncher {
    launches: Arc<AtomicU32>,
    marker: PathBuf,
    succeed_on: u32,
}

impl ScriptedLauncher {
    pub fn new(marker: PathBuf, succeed_on: u32) -> Self {
        Self {
            launches: Arc::new(AtomicU32::new(0)),
            marker,
            succeed_on,
        }
    }

    pub fn launches(&self) -> u32 {
        self.launches.load(Ordering::SeqCst)
    }
}

impl InstallerLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<(), InstallerError> {
        let launch = self.launches.fetch_add(1, Ordering::SeqCst) + 1;
        if launch >= self.succeed_on {
            std::fs::create_dir_all(&self.marker).map_err(|source| InstallerError::Wait {
                program: "scripted-installer".to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("modprep_lib=debug,modprep_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
