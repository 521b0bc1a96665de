#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // In-memory store with the development preset, so the default
        // manager account is bootstrapped on every run
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_project-hub-api"));
        cmd.args(["--store", "memory", "--port", &port.to_string()])
            .env("APP_ENV", "development")
            .env("BOOTSTRAP_ENABLED", "true")
            .env("BOOTSTRAP_ADMIN_USERNAME", ADMIN_USERNAME)
            .env("BOOTSTRAP_ADMIN_PASSWORD", ADMIN_PASSWORD)
            .env_remove("SECURITY_JWT_SECRET")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Log in and return the bearer token
pub async fn login(server: &TestServer, username: &str, password: &str) -> Result<String> {
    let res = Client::new()
        .post(server.url("/api/auth/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login as {} failed: {}", username, res.status());

    let body: Value = res.json().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("login response has no token")
}

pub async fn admin_token(server: &TestServer) -> Result<String> {
    login(server, ADMIN_USERNAME, ADMIN_PASSWORD).await
}

/// A username unique to this test run
pub fn unique_name(prefix: &str) -> String {
    format!("{}{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

pub struct Account {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Create an account through the API as the bootstrap manager and log in as it
pub async fn create_account(server: &TestServer, role: &str) -> Result<Account> {
    let admin = admin_token(server).await?;
    let username = unique_name("user");
    let password = "secret1";

    let res = Client::new()
        .post(server.url("/api/users"))
        .bearer_auth(&admin)
        .json(&json!({
            "username": username,
            "password": password,
            "email": format!("{}@example.com", username),
            "firstName": "Test",
            "lastName": username,
            "role": role,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create user failed: {}", res.status());

    let body: Value = res.json().await?;
    let id = body["data"]["id"].as_str().context("user response has no id")?.to_string();
    let token = login(server, &username, password).await?;

    Ok(Account { id, username, token })
}
