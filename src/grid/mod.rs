//! Remote grid controller
//!
//! `RemoteGridController` owns the query and the loaded rows of one grid view.
//! Every query mutation is applied synchronously and returns a [`FetchTicket`]
//! carrying the query snapshot to send to the data source. The caller runs the
//! fetch and hands the result back through [`RemoteGridController::complete`].
//!
//! # Workflow
//!
//! ```text
//! mutation (keyword / filter / sort / page) ──→ ticket #n, phase = Loading
//!                                                   │
//!                               DataSource::fetch(ticket.request)
//!                                                   │
//! complete(ticket, result) ──→ Loaded (rows, total) | Failed (rows kept)
//! ```
//!
//! Several tickets may be in flight at once and complete in any order. With
//! [`StalePolicy::LatestOnly`] only the newest ticket may change the state;
//! with [`StalePolicy::Overwrite`] the last response to arrive wins.
//!
//! Selected rows belong to the loaded page: applying a response drops the
//! selection of rows it no longer contains.
//!
//! ```
//! use assetgrid::grid::{MemorySource, RemoteGridController};
//! use assetgrid::query::Query;
//!
//! # futures::executor::block_on(async {
//! let source = MemorySource::default();
//! let mut grid = RemoteGridController::new(Query::default());
//! grid.fetch_page(&source).await.unwrap();
//! assert_eq!(grid.state().total, 0);
//! # });
//! ```

pub mod error;
pub mod selection;
pub mod source;
pub mod state;
pub mod viewport;

pub use error::FetchError;
pub use selection::{DeleteEndpoint, DeleteRequest, RowSelection};
pub use source::{DataSource, MemorySource, Page};
pub use state::{GridState, LoadPhase};
pub use viewport::{Density, FixedViewport, ViewportSource};

use crate::query::{FetchRequest, FilterModel, Query, Refetch, SortDirection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What to do with a response that is not the latest dispatched
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StalePolicy {
    /// Drop responses to superseded requests
    #[default]
    LatestOnly,
    /// Apply every response as it arrives
    Overwrite,
}

/// A dispatched fetch waiting for its response
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a ticket must be fetched and completed to update the grid"]
pub struct FetchTicket {
    seq: u64,
    request: FetchRequest,
}

impl FetchTicket {
    /// Dispatch sequence number, increasing per controller
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Query snapshot to send to the data source
    #[must_use]
    pub const fn request(&self) -> &FetchRequest {
        &self.request
    }
}

/// Result of completing a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the grid's rows
    Applied,
    /// The response belonged to a superseded request and was dropped
    Discarded,
}

/// Fetch state machine of one grid view
#[derive(Debug, Clone)]
pub struct RemoteGridController {
    filters: FilterModel,
    state: GridState,
    policy: StalePolicy,
    density: Density,
    max_height: Option<u32>,
    issued: u64,
    selection: RowSelection,
}

impl RemoteGridController {
    /// Create a controller around an initial query
    #[must_use]
    pub fn new(query: Query) -> Self {
        let state = GridState {
            current_page: query.page.index(),
            page_size: query.page.size(),
            ..GridState::default()
        };
        Self {
            filters: FilterModel::new(query),
            state,
            policy: StalePolicy::default(),
            density: Density::default(),
            max_height: None,
            issued: 0,
            selection: RowSelection::default(),
        }
    }

    /// Set how out-of-order responses are treated
    #[must_use]
    pub const fn with_policy(mut self, policy: StalePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the row density used for the height computation
    #[must_use]
    pub const fn with_density(mut self, density: Density) -> Self {
        self.density = density;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &GridState {
        &self.state
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        self.filters.query()
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterModel {
        &self.filters
    }

    #[must_use]
    pub const fn policy(&self) -> StalePolicy {
        self.policy
    }

    /// Sequence number of the latest dispatched ticket (0 before the first)
    #[must_use]
    pub const fn latest_seq(&self) -> u64 {
        self.issued
    }

    /// Maximum table height from the last viewport sample
    #[must_use]
    pub const fn max_height(&self) -> Option<u32> {
        self.max_height
    }

    #[must_use]
    pub const fn selection(&self) -> &RowSelection {
        &self.selection
    }

    /// Switch multiple selection on or off; switching off clears the selection
    pub fn set_multiple_selection(&mut self, enabled: bool) {
        self.selection.set_enabled(enabled);
    }

    /// Select a loaded row
    ///
    /// Returns `false` if multiple selection is off, the row is not on the
    /// loaded page or it is already selected.
    pub fn select(&mut self, row_id: &str) -> bool {
        self.state.rows.iter().any(|r| r.id == row_id) && self.selection.select(row_id)
    }

    pub fn deselect(&mut self, row_id: &str) -> bool {
        self.selection.deselect(row_id)
    }

    /// Select every loaded row, returning how many were newly selected
    pub fn select_all(&mut self) -> usize {
        let Self { state, selection, .. } = self;
        state.rows.iter().filter(|r| selection.select(&r.id)).count()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Bulk delete body for the selected rows, `None` when nothing is selected
    #[must_use]
    pub fn delete_request(&self, collection: &str, delete_assets: bool) -> Option<DeleteRequest> {
        if self.selection.is_empty() {
            return None;
        }
        Some(DeleteRequest::new(collection, self.selection.ids().to_vec(), delete_assets))
    }

    /// Delete the selected rows, then reload the current page
    ///
    /// Yields `None` without contacting the backend when nothing is selected.
    /// The selection is kept if the deletion fails.
    ///
    /// # Errors
    ///
    /// Returns the endpoint's error, or the data source's error if the reload fails.
    pub async fn delete_selected<E, S>(
        &mut self,
        endpoint: &E,
        source: &S,
        collection: &str,
        delete_assets: bool,
    ) -> Result<Option<FetchOutcome>, FetchError>
    where
        E: DeleteEndpoint + ?Sized,
        S: DataSource + ?Sized,
    {
        let Some(request) = self.delete_request(collection, delete_assets) else {
            return Ok(None);
        };
        if let Err(err) = endpoint.delete(&request).await {
            warn!(collection, rows = request.ids.len(), error = %err, "bulk delete failed");
            return Err(err);
        }
        info!(collection, rows = request.ids.len(), "deleted selected rows");
        self.selection.clear();
        self.fetch_page(source).await.map(Some)
    }

    /// Reload the current query
    pub fn refresh(&mut self) -> FetchTicket {
        self.dispatch()
    }

    /// Replace the keyword; the reload starts from page 1
    pub fn set_keyword(&mut self, keyword: impl Into<String>) -> FetchTicket {
        let refetch = self.filters.set_keyword(keyword);
        self.dispatch_for(refetch)
    }

    /// Replace the accepted values of a column
    pub fn apply_column_filter<I, S>(&mut self, field: &str, values: I) -> FetchTicket
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let refetch = self.filters.apply_column_filter(field, values);
        self.dispatch_for(refetch)
    }

    /// Set a single-valued column filter, blank clears it
    pub fn set_field_value(&mut self, field: &str, value: impl Into<String>) -> FetchTicket {
        let refetch = self.filters.set_field_value(field, value);
        self.dispatch_for(refetch)
    }

    /// Replace the sort order, `None` clears it
    pub fn apply_sort(&mut self, field: &str, direction: Option<SortDirection>) -> FetchTicket {
        let refetch = self.filters.apply_sort(field, direction);
        self.dispatch_for(refetch)
    }

    /// Remove a `field=value` filter chip; no fetch when nothing matched
    pub fn remove_filter_tag(&mut self, tag: &str) -> Option<FetchTicket> {
        if self.filters.remove_filter_tag(tag) {
            Some(self.dispatch())
        } else {
            None
        }
    }

    /// Drop every column filter; no fetch when there were none
    pub fn clear_filters(&mut self) -> Option<FetchTicket> {
        match self.filters.clear_filters() {
            Refetch::None => None,
            refetch => Some(self.dispatch_for(refetch)),
        }
    }

    /// Go to page `index` (clamped to 1)
    pub fn set_page(&mut self, index: u32) -> FetchTicket {
        let refetch = self.filters.set_page(index);
        self.dispatch_for(refetch)
    }

    /// Change the page size; the page index is kept as is
    pub fn set_page_size(&mut self, size: u32) -> FetchTicket {
        let refetch = self.filters.set_page_size(size);
        self.dispatch_for(refetch)
    }

    /// Recompute the maximum table height from the window height
    pub fn resize_viewport<V: ViewportSource + ?Sized>(&mut self, viewport: &V) -> u32 {
        let height = self.density.max_height(viewport.height());
        self.max_height = Some(height);
        height
    }

    fn dispatch_for(&mut self, refetch: Refetch) -> FetchTicket {
        if refetch == Refetch::FromFirstPage {
            debug_assert_eq!(self.filters.query().page.index(), 1);
        }
        self.dispatch()
    }

    fn dispatch(&mut self) -> FetchTicket {
        self.issued += 1;
        let query = self.filters.query();
        self.state.phase = LoadPhase::Loading;
        self.state.current_page = query.page.index();
        self.state.page_size = query.page.size();

        let request = FetchRequest::from(query);
        debug!(
            seq = self.issued,
            page = request.page_index,
            size = request.page_size,
            keyword = %request.keyword,
            "dispatching fetch"
        );
        FetchTicket {
            seq: self.issued,
            request,
        }
    }

    /// Apply the response of a dispatched ticket
    ///
    /// On success the rows and total are replaced. On failure the previous
    /// rows and total are kept, the phase becomes `Failed` and the error is
    /// returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when a failed response is applied.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page, FetchError>,
    ) -> Result<FetchOutcome, FetchError> {
        if self.policy == StalePolicy::LatestOnly && ticket.seq != self.issued {
            debug!(
                seq = ticket.seq,
                latest = self.issued,
                "discarding response to superseded fetch"
            );
            return Ok(FetchOutcome::Discarded);
        }

        match result {
            Ok(page) => {
                debug!(seq = ticket.seq, rows = page.list.len(), total = page.total, "fetch applied");
                self.state.rows = page.list;
                self.state.total = page.total;
                let rows = &self.state.rows;
                self.selection.retain(|id| rows.iter().any(|r| r.id == id));
                self.state.phase = LoadPhase::Loaded;
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                warn!(seq = ticket.seq, error = %err, "fetch failed, keeping previous rows");
                self.state.phase = LoadPhase::Failed;
                Err(err)
            }
        }
    }

    /// Run a ticket against a data source and apply the result
    ///
    /// # Errors
    ///
    /// Returns the data source's error if the fetch fails.
    pub async fn run<S: DataSource + ?Sized>(
        &mut self,
        ticket: FetchTicket,
        source: &S,
    ) -> Result<FetchOutcome, FetchError> {
        let result = source.fetch(ticket.request()).await;
        self.complete(ticket, result)
    }

    /// Reload the current page from a data source
    ///
    /// # Errors
    ///
    /// Returns the data source's error if the fetch fails.
    pub async fn fetch_page<S: DataSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<FetchOutcome, FetchError> {
        let ticket = self.refresh();
        self.run(ticket, source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingDeleter, ScriptedSource, page_of, sample_rows};

    fn status_404_query() -> Query {
        let mut model = FilterModel::default();
        model.apply_column_filter("status", ["404"]);
        model.query().clone()
    }

    #[test]
    fn test_new_controller_is_idle() {
        let grid = RemoteGridController::new(Query::with_page_size(50));
        assert_eq!(grid.state().phase, LoadPhase::Idle);
        assert_eq!(grid.state().page_size, 50);
        assert_eq!(grid.state().current_page, 1);
        assert_eq!(grid.latest_seq(), 0);
    }

    #[test]
    fn test_column_filter_merge_refetches_same_page() {
        let mut grid = RemoteGridController::new(status_404_query());
        let ticket = grid.apply_column_filter("status", ["404", "500"]);

        assert_eq!(
            grid.query().field_filters["status"].values(),
            ["404".to_string(), "500".to_string()]
        );
        assert_eq!(ticket.request().page_index, 1);
        assert!(grid.state().loading());
    }

    #[test]
    fn test_keyword_resets_to_first_page() {
        let mut grid = RemoteGridController::new(Query::default());
        let _ = grid.set_page(4);
        let ticket = grid.set_keyword("title=login");
        assert_eq!(ticket.request().page_index, 1);
        assert_eq!(grid.state().current_page, 1);
    }

    #[test]
    fn test_page_size_change_keeps_page() {
        let mut grid = RemoteGridController::new(Query::default());
        let _ = grid.set_page(3);
        let ticket = grid.set_page_size(50);
        assert_eq!(ticket.request().page_index, 3);
        assert_eq!(ticket.request().page_size, 50);
    }

    #[test]
    fn test_ticket_snapshots_query_at_dispatch() {
        let mut grid = RemoteGridController::new(Query::default());
        let first = grid.set_field_value("host", "a");
        let second = grid.set_field_value("host", "b");
        assert_eq!(first.request().field_filters["host"].values(), ["a".to_string()]);
        assert_eq!(second.request().field_filters["host"].values(), ["b".to_string()]);
        assert!(second.seq() > first.seq());
    }

    #[test]
    fn test_stale_while_revalidate() {
        let mut grid = RemoteGridController::new(Query::default());
        let ticket = grid.refresh();
        grid.complete(ticket, Ok(page_of(sample_rows(3), 3))).unwrap();

        let _pending = grid.set_page(2);
        assert!(grid.state().loading());
        assert_eq!(grid.state().rows.len(), 3);
    }

    #[test]
    fn test_failure_keeps_previous_rows() {
        let mut grid = RemoteGridController::new(Query::default());
        let ticket = grid.refresh();
        grid.complete(ticket, Ok(page_of(sample_rows(2), 7))).unwrap();

        let ticket = grid.set_page(2);
        let err = grid
            .complete(ticket, Err(FetchError::Transport("reset".into())))
            .unwrap_err();

        assert_eq!(err, FetchError::Transport("reset".into()));
        assert_eq!(grid.state().phase, LoadPhase::Failed);
        assert!(!grid.state().loading());
        assert_eq!(grid.state().rows.len(), 2);
        assert_eq!(grid.state().total, 7);
    }

    #[test]
    fn test_overwrite_policy_lets_late_page_win() {
        let mut grid =
            RemoteGridController::new(Query::default()).with_policy(StalePolicy::Overwrite);
        let page_one = grid.refresh();
        let page_three = grid.set_page(3);

        let rows_three = sample_rows(2);
        let rows_one = sample_rows(5);
        grid.complete(page_three, Ok(page_of(rows_three, 60))).unwrap();
        let outcome = grid.complete(page_one, Ok(page_of(rows_one.clone(), 100))).unwrap();

        assert_eq!(outcome, FetchOutcome::Applied);
        assert_eq!(grid.state().rows, rows_one);
        assert_eq!(grid.state().total, 100);
        assert!(!grid.state().loading());
    }

    #[test]
    fn test_latest_only_policy_discards_late_page() {
        let mut grid = RemoteGridController::new(Query::default());
        let page_one = grid.refresh();
        let page_three = grid.set_page(3);

        let rows_three = sample_rows(2);
        grid.complete(page_three, Ok(page_of(rows_three.clone(), 60))).unwrap();
        let outcome = grid.complete(page_one, Ok(page_of(sample_rows(5), 100))).unwrap();

        assert_eq!(outcome, FetchOutcome::Discarded);
        assert_eq!(grid.state().rows, rows_three);
        assert_eq!(grid.state().total, 60);
        assert_eq!(grid.state().current_page, 3);
    }

    #[test]
    fn test_latest_only_stays_loading_until_latest_arrives() {
        let mut grid = RemoteGridController::new(Query::default());
        let old = grid.refresh();
        let latest = grid.refresh();

        grid.complete(old, Err(FetchError::Transport("late".into()))).unwrap();
        assert!(grid.state().loading());

        grid.complete(latest, Ok(Page::default())).unwrap();
        assert_eq!(grid.state().phase, LoadPhase::Loaded);
    }

    #[test]
    fn test_remove_filter_tag_only_fetches_on_change() {
        let mut grid = RemoteGridController::new(status_404_query());
        assert!(grid.remove_filter_tag("status=200").is_none());
        let ticket = grid.remove_filter_tag("status=404").unwrap();
        assert!(ticket.request().field_filters.is_empty());
        assert!(grid.clear_filters().is_none());
    }

    #[test]
    fn test_resize_viewport() {
        let mut grid = RemoteGridController::new(Query::default());
        assert_eq!(grid.resize_viewport(&FixedViewport(800)), 560);

        let mut dense = RemoteGridController::new(Query::default()).with_density(Density::Dense);
        assert_eq!(dense.resize_viewport(&FixedViewport(800)), 600);
        assert_eq!(dense.max_height(), Some(600));
    }

    #[tokio::test]
    async fn test_fetch_page_from_memory_source() {
        let source = MemorySource::new(sample_rows(30));
        let mut grid = RemoteGridController::new(Query::with_page_size(10));

        let outcome = grid.fetch_page(&source).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Applied);
        assert_eq!(grid.state().total, 30);
        assert_eq!(grid.state().rows.len(), 10);
        assert_eq!(grid.state().page_count(), 3);

        let ticket = grid.set_page(3);
        grid.run(ticket, &source).await.unwrap();
        assert_eq!(grid.state().rows[0].id, "row-20");
    }

    #[tokio::test]
    async fn test_fetch_page_surfaces_source_error() {
        let source = ScriptedSource::failing(FetchError::Backend {
            code: 500,
            message: "mongo down".into(),
        });
        let mut grid = RemoteGridController::new(Query::default());

        let err = grid.fetch_page(&source).await.unwrap_err();
        assert!(matches!(err, FetchError::Backend { code: 500, .. }));
        assert_eq!(grid.state().phase, LoadPhase::Failed);
        assert_eq!(source.requests().len(), 1);
    }

    fn loaded(rows: usize) -> RemoteGridController {
        let mut grid = RemoteGridController::new(Query::default());
        let ticket = grid.refresh();
        grid.complete(ticket, Ok(page_of(sample_rows(rows), rows as u64))).unwrap();
        grid
    }

    #[test]
    fn test_selection_limited_to_loaded_rows() {
        let mut grid = loaded(3);
        assert!(!grid.select("row-1"));

        grid.set_multiple_selection(true);
        assert!(grid.select("row-1"));
        assert!(!grid.select("row-1"));
        assert!(!grid.select("row-9"));
        assert_eq!(grid.select_all(), 2);
        assert_eq!(
            grid.selection().ids(),
            ["row-1".to_string(), "row-0".to_string(), "row-2".to_string()]
        );

        assert!(grid.deselect("row-0"));
        assert_eq!(grid.selection().len(), 2);
        grid.set_multiple_selection(false);
        assert!(grid.selection().is_empty());
    }

    #[test]
    fn test_selection_follows_loaded_rows() {
        let mut grid = loaded(3);
        grid.set_multiple_selection(true);
        grid.select_all();

        let _pending = grid.set_page(2);
        assert_eq!(grid.selection().len(), 3);

        let ticket = grid.refresh();
        let rows = sample_rows(3).into_iter().skip(1).collect();
        grid.complete(ticket, Ok(page_of(rows, 2))).unwrap();
        assert_eq!(grid.selection().ids(), ["row-1".to_string(), "row-2".to_string()]);
    }

    #[test]
    fn test_delete_request_for_selection() {
        let mut grid = loaded(3);
        grid.set_multiple_selection(true);
        assert_eq!(grid.delete_request("asset", false), None);

        grid.select("row-2");
        grid.select("row-0");
        assert_eq!(
            grid.delete_request("asset", true),
            Some(DeleteRequest::new("asset", vec!["row-2".into(), "row-0".into()], true))
        );
    }

    #[tokio::test]
    async fn test_delete_selected_then_reload() {
        let mut grid = loaded(3);
        grid.set_multiple_selection(true);
        grid.select("row-0");
        grid.select("row-2");

        let remaining: Vec<_> = sample_rows(3).into_iter().filter(|r| r.id == "row-1").collect();
        let source = ScriptedSource::new(vec![Ok(page_of(remaining, 1))]);
        let deleter = RecordingDeleter::new();

        let outcome = grid.delete_selected(&deleter, &source, "asset", false).await.unwrap();
        assert_eq!(outcome, Some(FetchOutcome::Applied));
        assert_eq!(
            deleter.requests(),
            vec![DeleteRequest::new("asset", vec!["row-0".into(), "row-2".into()], false)]
        );
        assert!(grid.selection().is_empty());
        assert_eq!(grid.state().total, 1);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_without_selection_sends_nothing() {
        let mut grid = loaded(3);
        let source = ScriptedSource::default();
        let deleter = RecordingDeleter::new();

        assert_eq!(grid.delete_selected(&deleter, &source, "asset", false).await, Ok(None));
        assert!(deleter.requests().is_empty());
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_selection() {
        let mut grid = loaded(3);
        grid.set_multiple_selection(true);
        grid.select("row-1");

        let source = ScriptedSource::default();
        let deleter = RecordingDeleter::rejecting(FetchError::Backend {
            code: 404,
            message: "no documents deleted".into(),
        });

        let err = grid.delete_selected(&deleter, &source, "asset", true).await.unwrap_err();
        assert!(matches!(err, FetchError::Backend { code: 404, .. }));
        assert_eq!(grid.selection().ids(), ["row-1".to_string()]);
        assert_eq!(grid.state().rows.len(), 3);
        assert!(source.requests().is_empty());
    }
}
