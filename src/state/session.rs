//! Drives the reducer: performs its effects against the catalog store and
//! the scheduler, one action at a time.

use std::collections::HashSet;
use std::time::Duration;

use super::scheduler::Scheduler;
use super::{Action, DashboardState, Effect, ReportTicket, reduce};
use crate::cache::{FileCache, KeyValueCache, MemoryCache, NoCache};
use crate::catalog::{CatalogStore, HttpCatalog};
use crate::config::PricelensConfig;
use crate::diagnostics::DiagnosticLog;
use crate::report::{ChartSpec, ReportResult};

/// One dashboard session: state, catalog access, and the report delay.
pub struct Session {
    state: DashboardState,
    store: CatalogStore,
    scheduler: Box<dyn Scheduler>,
    report_delay: Duration,
    currency_symbol: String,
}

impl Session {
    pub fn new(
        store: CatalogStore,
        scheduler: Box<dyn Scheduler>,
        report_delay: Duration,
        lock_after_run: bool,
    ) -> Self {
        Self {
            state: DashboardState::new(lock_after_run),
            store,
            scheduler,
            report_delay,
            currency_symbol: "₹".to_string(),
        }
    }

    /// Build a session against the real catalog using the resolved config.
    pub fn from_config(config: &PricelensConfig, scheduler: Box<dyn Scheduler>) -> Self {
        let source = HttpCatalog::from_config(&config.catalog);
        let store = CatalogStore::new(
            Box::new(source),
            cache_from_config(config),
            DiagnosticLog::from_config(&config.logging),
        );
        let mut session = Self::new(
            store,
            scheduler,
            config.report.delay(),
            config.report.lock_after_run,
        );
        session.currency_symbol = config.report.currency_symbol.clone();
        session
    }

    /// Load the category list. Called once when the session starts.
    pub fn start(&mut self) {
        if let Some(categories) = self.store.load_categories() {
            self.dispatch(Action::CategoriesLoaded(categories));
        }
    }

    pub fn select_category(&mut self, category: &str) {
        self.dispatch(Action::SelectCategory(category.to_string()));
    }

    pub fn select_products(&mut self, titles: HashSet<String>) {
        self.dispatch(Action::SelectProducts(titles));
    }

    pub fn toggle_product(&mut self, title: &str) {
        self.dispatch(Action::ToggleProduct(title.to_string()));
    }

    pub fn clear_filters(&mut self) {
        self.dispatch(Action::ClearFilters);
    }

    /// Run a report: waits out the delay, then derives the series.
    ///
    /// Returns `None` when running is not allowed (no products loaded, or
    /// locked after the previous run).
    pub fn run_report(&mut self) -> Option<&ReportResult> {
        if !self.state.can_run_report() {
            return None;
        }
        self.dispatch(Action::RunReport);
        self.state.report.as_ref()
    }

    /// Start a report without waiting for it.
    ///
    /// The caller owns the timer: after [`Session::report_delay`] it should
    /// call [`Session::complete_report`] with the returned ticket. A ticket
    /// superseded or cancelled in the meantime completes as a no-op.
    pub fn request_report(&mut self) -> Option<ReportTicket> {
        match reduce(&mut self.state, Action::RunReport) {
            Effect::ScheduleReport(ticket) => Some(ticket),
            _ => None,
        }
    }

    pub fn complete_report(&mut self, ticket: ReportTicket) {
        self.dispatch(Action::ReportDue(ticket));
    }

    pub fn report_delay(&self) -> Duration {
        self.report_delay
    }

    /// Drop any pending report; the session is being closed.
    pub fn close(&mut self) {
        self.dispatch(Action::Unmount);
    }

    /// Apply one action and carry out whatever effects follow from it.
    pub fn dispatch(&mut self, action: Action) {
        let mut next = Some(action);
        while let Some(action) = next.take() {
            match reduce(&mut self.state, action) {
                Effect::None => {}
                Effect::FetchProducts(category) => {
                    if let Some(response) = self.store.load_products(&category) {
                        next = Some(Action::ProductsLoaded { category, response });
                    }
                }
                Effect::ScheduleReport(ticket) => {
                    self.scheduler.wait(self.report_delay);
                    next = Some(Action::ReportDue(ticket));
                }
            }
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Chart model for the current state.
    pub fn chart(&self) -> ChartSpec {
        ChartSpec::build(
            &self.state.category,
            &self.state.categories,
            self.state.report.as_ref(),
            &self.currency_symbol,
        )
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }
}

/// Pick the cache implementation described by `[cache]`.
pub fn cache_from_config(config: &PricelensConfig) -> Box<dyn KeyValueCache> {
    if !config.cache.enabled {
        return Box::new(NoCache);
    }
    if config.cache.persist
        && let Some(path) = crate::config::expand_home(&config.cache.path)
    {
        return Box::new(FileCache::open(path));
    }
    Box::new(MemoryCache::new())
}
