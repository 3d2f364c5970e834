//! Dashboard state container.
//!
//! All user-visible state lives in [`DashboardState`] and changes only via
//! [`reduce`], which applies one typed [`Action`] and returns the
//! [`Effect`] the driver must perform next (fetch products, schedule the
//! delayed report). The reducer does no I/O; [`session::Session`] wires it
//! to the catalog store and a [`scheduler::Scheduler`].

pub mod scheduler;
pub mod session;

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::{Product, ProductResponse};
use crate::report::{ReportResult, derive_report};

pub use scheduler::{ImmediateScheduler, Scheduler, ThreadScheduler};
pub use session::Session;

// ---------------------------------------------------------------------------
// Actions and effects
// ---------------------------------------------------------------------------

/// Identifies one pending report run. Only the most recently issued ticket
/// may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The category list arrived.
    CategoriesLoaded(Vec<String>),
    /// The user picked a category (empty string = none).
    SelectCategory(String),
    /// The product list for `category` arrived.
    ProductsLoaded {
        category: String,
        response: ProductResponse,
    },
    /// The user replaced the product subset.
    SelectProducts(HashSet<String>),
    /// The user ticked or unticked one product.
    ToggleProduct(String),
    /// Reset category, products, selection and report.
    ClearFilters,
    /// Start a report run; completes after the report delay.
    RunReport,
    /// The report delay for `ticket` has elapsed.
    ReportDue(ReportTicket),
    /// The dashboard is going away; drop anything pending.
    Unmount,
}

/// Work the driver must perform after a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    FetchProducts(String),
    ScheduleReport(ReportTicket),
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Inputs of a report run, captured when the run was requested.
#[derive(Debug, Clone)]
struct PendingRun {
    ticket: ReportTicket,
    products: Vec<Product>,
    titles: HashSet<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    pub categories: Vec<String>,
    /// Selected category; empty when none.
    pub category: String,
    /// Products of the selected category, replaced wholesale.
    pub products: Vec<Product>,
    /// Selected product titles. Only meaningful with a category selected.
    pub product_titles: HashSet<String>,
    pub report: Option<ReportResult>,
    /// A report run is waiting for its delay to elapse.
    pub loading: bool,
    /// Selection changed since the last completed report.
    pub filters_changed: bool,
    /// Whether a completed report locks "run" until the selection changes.
    pub lock_after_run: bool,
    #[serde(skip)]
    pending: Option<PendingRun>,
    #[serde(skip)]
    next_ticket: u64,
}

impl DashboardState {
    pub fn new(lock_after_run: bool) -> Self {
        Self {
            lock_after_run,
            filters_changed: true,
            ..Self::default()
        }
    }

    /// Whether "run report" is currently allowed.
    ///
    /// Running again while a report is pending is allowed and supersedes it.
    pub fn can_run_report(&self) -> bool {
        !self.products.is_empty() && (!self.lock_after_run || self.filters_changed)
    }

    pub fn pending_ticket(&self) -> Option<ReportTicket> {
        self.pending.as_ref().map(|run| run.ticket)
    }

    /// Selected titles in catalog order, for display.
    pub fn selected_titles(&self) -> Vec<&str> {
        self.products
            .iter()
            .map(|p| p.title.as_str())
            .filter(|title| self.product_titles.contains(*title))
            .collect()
    }

    /// Start a run over the current products and selection. Later edits to
    /// the selection do not affect it.
    fn issue_ticket(&mut self) -> ReportTicket {
        self.next_ticket += 1;
        let ticket = ReportTicket(self.next_ticket);
        self.pending = Some(PendingRun {
            ticket,
            products: self.products.clone(),
            titles: self.product_titles.clone(),
        });
        ticket
    }

    fn cancel_pending(&mut self) {
        self.pending = None;
        self.loading = false;
    }

    fn clear_selection(&mut self) {
        self.cancel_pending();
        self.category.clear();
        self.products.clear();
        self.product_titles.clear();
        self.report = None;
        self.filters_changed = true;
    }
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Apply `action` to `state`, returning the follow-up effect.
pub fn reduce(state: &mut DashboardState, action: Action) -> Effect {
    match action {
        Action::CategoriesLoaded(categories) => {
            state.categories = categories;
            Effect::None
        }
        Action::SelectCategory(category) => {
            state.clear_selection();
            if category.is_empty() {
                return Effect::None;
            }
            state.category = category.clone();
            Effect::FetchProducts(category)
        }
        Action::ProductsLoaded { category, response } => {
            // A response for a category the user already left is dropped.
            if category == state.category {
                state.products = response.products;
            }
            Effect::None
        }
        Action::SelectProducts(titles) => {
            if !state.category.is_empty() {
                state.product_titles = titles;
                state.filters_changed = true;
            }
            Effect::None
        }
        Action::ToggleProduct(title) => {
            if !state.category.is_empty() {
                if !state.product_titles.remove(&title) {
                    state.product_titles.insert(title);
                }
                state.filters_changed = true;
            }
            Effect::None
        }
        Action::ClearFilters => {
            state.clear_selection();
            Effect::None
        }
        Action::RunReport => {
            if !state.can_run_report() {
                return Effect::None;
            }
            state.loading = true;
            Effect::ScheduleReport(state.issue_ticket())
        }
        Action::ReportDue(ticket) => {
            if state.pending_ticket() != Some(ticket) {
                return Effect::None;
            }
            let Some(run) = state.pending.take() else {
                return Effect::None;
            };
            state.report = Some(derive_report(&run.products, &run.titles));
            state.loading = false;
            state.filters_changed = state.product_titles != run.titles;
            Effect::None
        }
        Action::Unmount => {
            state.cancel_pending();
            Effect::None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
