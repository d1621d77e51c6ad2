use std::env;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_SEED_DIR: &str = "seed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_address: String,
    /// DynamoDB table holding the quizzes. The in-memory store is used when unset.
    pub table: Option<String>,
    pub seed_dir: PathBuf,
    pub lambda: bool,
}

impl Settings {
    /// Reads settings from the process environment, after loading `.env` if
    /// one exists.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Settings {
            bind_address: non_empty("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            table: non_empty("TABLE"),
            seed_dir: non_empty("SEED_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_DIR)),
            lambda: lookup("AWS_LAMBDA_RUNTIME_API").is_some(),
        }
    }
}
