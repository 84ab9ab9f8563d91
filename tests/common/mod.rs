use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/taskboard-api-rust");
        cmd.env("PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL and JWT_SECRET
        // from .env (loaded by the server)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/ping", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Database-backed tests are skipped when no store is configured; the smoke
/// tests in 10_health.rs still run.
pub fn db_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

static EMAIL_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Unique email per call so test runs never collide with rows from earlier runs.
pub fn unique_email(tag: &str) -> String {
    let n = EMAIL_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}@example.com", tag, std::process::id(), n)
}

pub const PASSWORD: &str = "Passw0rd";

/// Register a fresh user and return (email, bearer token).
pub async fn register_user(
    client: &reqwest::Client,
    base_url: &str,
    tag: &str,
) -> Result<(String, String)> {
    let email = unique_email(tag);
    let res = client
        .post(format!("{}/api/users", base_url))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "registration failed: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    let token = body["token"]
        .as_str()
        .context("registration response missing token")?
        .to_string();
    Ok((email, token))
}

/// Create a board for the given token and return its id.
pub async fn create_board(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    title: &str,
) -> Result<String> {
    let res = client
        .post(format!("{}/api/boards", base_url))
        .bearer_auth(token)
        .json(&json!({ "title": title }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "board creation failed: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    let id = body["id"]
        .as_str()
        .context("board response missing id")?
        .to_string();
    Ok(id)
}
