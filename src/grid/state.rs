//! Grid load state

use crate::Row;

/// Phase of the fetch state machine
///
/// `Idle → Loading → (Loaded | Failed) → Loading → …`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last applied fetch succeeded
    Loaded,
    /// The last applied fetch failed; rows are from an earlier success
    Failed,
}

/// Rows and paging of one grid
///
/// `rows` and `total` only ever come from the most recently applied fetch.
/// Entering `Loading` never clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridState {
    pub phase: LoadPhase,
    pub rows: Vec<Row>,
    pub total: u64,
    pub current_page: u32,
    pub page_size: u32,
}

impl GridState {
    #[must_use]
    pub fn loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    /// Number of pages for the current total, at least 1
    #[must_use]
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.page_size)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = GridState::default();
        assert_eq!(state.phase, LoadPhase::Idle);
        assert!(!state.loading());
    }

    #[test]
    fn test_page_count() {
        let mut state = GridState {
            page_size: 20,
            ..GridState::default()
        };
        assert_eq!(state.page_count(), 1);
        state.total = 41;
        assert_eq!(state.page_count(), 3);
        state.total = 40;
        assert_eq!(state.page_count(), 2);
    }
}
