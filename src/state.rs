use std::sync::Arc;

use crate::store::QuizStore;

pub struct AppState {
    pub store: Arc<dyn QuizStore>,
}
