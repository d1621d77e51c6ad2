use async_trait::async_trait;
use quiz_store_api::run;
use quiz_store_api::store::{Item, Key, MemoryStore, QuizStore, StoreError, WriteOp};
use std::net::TcpListener;
use std::sync::Arc;

#[allow(dead_code)]
pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub api_client: reqwest::Client,
}

#[allow(dead_code)]
impl TestApp {
    pub fn quizzes_url(&self) -> String {
        format!("{}/quizzes", &self.address)
    }

    pub async fn put_quiz(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .put(&self.quizzes_url())
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_quizzes(&self, query: &[(&str, &str)]) -> reqwest::Response {
        self.api_client
            .get(&self.quizzes_url())
            .query(query)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let address = spawn_server(store.clone());

    TestApp {
        address,
        store,
        api_client: reqwest::Client::new(),
    }
}

/// Starts a server whose store fails every call; returns its address.
#[allow(dead_code)]
pub async fn spawn_failing_app() -> String {
    spawn_server(Arc::new(FailingStore))
}

fn spawn_server(store: Arc<dyn QuizStore>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(listener, store).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Backend("connection refused by quiz-table-internal".to_string())
}

#[async_trait]
impl QuizStore for FailingStore {
    async fn get(&self, _key: &Key) -> Result<Option<Item>, StoreError> {
        Err(unavailable())
    }

    async fn query_prefix(&self, _partition: &str, _prefix: &str) -> Result<Vec<Item>, StoreError> {
        Err(unavailable())
    }

    async fn query_index(&self, _index_partition: &str) -> Result<Vec<Item>, StoreError> {
        Err(unavailable())
    }

    async fn put(&self, _item: Item) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn batch_write(&self, _ops: Vec<WriteOp>) -> Result<(), StoreError> {
        Err(unavailable())
    }
}
