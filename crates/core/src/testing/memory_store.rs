//! In-memory dataset store for testing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::dataset::{Dataset, DatasetError, DatasetStore};

#[derive(Debug, Default)]
struct StoreState {
    current: Dataset,
    saves: Vec<Dataset>,
    fail_load: bool,
    fail_saves_after: Option<usize>,
}

/// Dataset store that keeps everything in memory.
///
/// `load` returns the most recently saved dataset (or the initial one), so
/// consecutive runs against the same store behave like runs against the same
/// file in override mode. Every save is kept for assertions.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatasetStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryDatasetStore {
    pub fn new(initial: Dataset) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                current: initial,
                ..Default::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The dataset a load would return right now.
    pub fn current(&self) -> Dataset {
        self.state().current.clone()
    }

    /// Every dataset saved so far, oldest first.
    pub fn saves(&self) -> Vec<Dataset> {
        self.state().saves.clone()
    }

    pub fn save_count(&self) -> usize {
        self.state().saves.len()
    }

    /// Make the next loads fail.
    pub fn fail_load(&self, fail: bool) {
        self.state().fail_load = fail;
    }

    /// Let `count` saves succeed, then fail every later one.
    pub fn fail_saves_after(&self, count: usize) {
        self.state().fail_saves_after = Some(count);
    }
}

impl DatasetStore for MemoryDatasetStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<Dataset, DatasetError> {
        let state = self.state();
        if state.fail_load {
            return Err(DatasetError::load_failed("memory", "mock load failure"));
        }
        Ok(state.current.clone())
    }

    fn save(&self, dataset: &Dataset) -> Result<(), DatasetError> {
        let mut state = self.state();
        if let Some(limit) = state.fail_saves_after {
            if state.saves.len() >= limit {
                return Err(DatasetError::save_failed("memory", "mock save failure"));
            }
        }
        state.current = dataset.clone();
        state.saves.push(dataset.clone());
        Ok(())
    }
}
