//! Test server management.
//!
//! Spawns in-process userd instances for integration testing.

use userd::db::Database;
use userd::events::UserEvents;
use userd::http;

/// A test server instance.
pub struct TestServer {
    base_url: String,
    /// Handle on the database behind the server, for direct state assertions.
    pub db: Database,
    /// Event stream publisher shared with the server.
    pub events: UserEvents,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn a new test server on an ephemeral port with an isolated
    /// in-memory database.
    pub async fn spawn() -> anyhow::Result<Self> {
        userd::metrics::init();

        let db = Database::new(":memory:").await?;
        let events = UserEvents::new();
        let app = http::router(db.clone(), events.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("test server error: {}", e);
            }
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            db,
            events,
            handle,
        })
    }

    /// Full URL for a request path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
