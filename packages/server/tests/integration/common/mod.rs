use std::net::SocketAddr;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde_json::Value;
use tempfile::TempDir;

use receipt_server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig};
use receipt_server::entity::receipt;
use receipt_server::state::AppState;
use receipt_server::store::ReceiptStore;

pub mod routes {
    pub const RECEIPTS: &str = "/receipts";
    pub const HEALTH: &str = "/health";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn receipt(id: &str) -> String {
        format!("/receipts/{id}")
    }
}

/// A freshly migrated SQLite database in its own temp directory.
pub struct TestDb {
    pub db: DatabaseConnection,
    pub config: DatabaseConfig,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("receipts.db").display());

        let mut config = DatabaseConfig::with_url(url);
        config.max_connections = 8;
        config.min_connections = 1;
        config.sqlx_logging = false;

        let db = receipt_server::database::init_db(&config)
            .await
            .expect("Failed to initialize test database");

        Self {
            db,
            config,
            _dir: dir,
        }
    }

    pub fn store(&self) -> ReceiptStore {
        ReceiptStore::new(self.db.clone())
    }

    pub async fn receipt_count(&self) -> u64 {
        receipt::Entity::find()
            .count(&self.db)
            .await
            .expect("Failed to count receipts")
    }
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: TestDb,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_upload_limit(128 * 1024 * 1024).await
    }

    pub async fn spawn_with_upload_limit(max_upload_bytes: u64) -> Self {
        let db = TestDb::new().await;

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig::default(),
                max_upload_bytes,
            },
            database: db.config.clone(),
        };

        let state = AppState {
            store: db.store(),
            config: app_config,
        };

        let app = receipt_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post_form(&self, form: Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(routes::RECEIPTS))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    /// Upload `bytes` as the `file` part.
    pub async fn upload(&self, file_name: &str, bytes: &[u8]) -> TestResponse {
        let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        self.post_form(Form::new().part("file", part)).await
    }

    /// Upload `bytes` as the `file` part with a declared content type.
    pub async fn upload_typed(&self, file_name: &str, bytes: &[u8], mime: &str) -> TestResponse {
        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Failed to set MIME type");
        self.post_form(Form::new().part("file", part)).await
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    /// The `receipt` object of an upload response.
    pub fn receipt(&self) -> &Value {
        &self.body["receipt"]
    }
}
