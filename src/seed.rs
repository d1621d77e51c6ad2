use std::path::Path;

use walkdir::WalkDir;

use crate::store::QuizStore;
use crate::sync::{self, QuizSnapshot};

/// Synchronizes every `*.json` quiz snapshot found under `dir`. Files that
/// cannot be read or parsed are logged and skipped. Returns the number of
/// quizzes loaded.
pub async fn load_dir(store: &dyn QuizStore, dir: &Path) -> usize {
    if !dir.exists() {
        log::info!("Seed directory {:?} not found, starting empty", dir);
        return 0;
    }

    log::info!("Loading quizzes from {:?}", dir);

    let mut paths: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
        .collect();
    paths.sort();

    let mut loaded = 0;
    for path in paths {
        let content = match std::fs::read(&path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to read file {:?}: {}", path, e);
                continue;
            }
        };

        let snapshot = match QuizSnapshot::parse(&content) {
            Ok(s) => s,
            Err(e) => {
                log::error!("Invalid quiz snapshot {:?}: {}", path, e);
                continue;
            }
        };

        match sync::synchronize(store, &snapshot).await {
            Ok(_) => loaded += 1,
            Err(e) => log::error!("Failed to store quiz from {:?}: {}", path, e),
        }
    }

    log::info!("Loaded {} quizzes", loaded);
    loaded
}
