//! Admin dashboard sections. Each section reads from the shared
//! [`AdminStore`] and runs its mutations through [`SectionContext`]:
//! optional confirmation, one gateway call, a toast, then a scoped refetch.

use std::sync::Arc;

use thiserror::Error;

use crate::services::gateway::{AdminApi, GatewayError};
use crate::store::{AdminStore, ResourceKind};

pub mod classes;
pub mod fees;
pub mod filter;
pub mod live;
pub mod notify;
pub mod overview;
pub mod students;
pub mod teachers;

pub use classes::{ClassFilters, ClassesSection, ClassCounts};
pub use fees::{FeeSummary, FeesSection};
pub use filter::{matches_any, normalize_query, Debounced};
pub use live::{session_title, LiveSessionsSection};
pub use notify::{
    AssumeYes, Clipboard, ClipboardError, Confirmer, InFlight, InFlightGuard, Notice, NoticeLevel,
    Notifier,
};
pub use overview::{OverviewSection, RecentActivity};
pub use students::{StudentCounts, StudentsSection};
pub use teachers::TeachersSection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("action cancelled")]
    Cancelled,
    #[error("action already in progress")]
    Busy,
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: GatewayError,
    },
}

/// Handles shared by every section of one admin dashboard.
pub struct SectionContext<G: ?Sized> {
    pub store: Arc<AdminStore<G>>,
    pub notifier: Notifier,
    pub confirmer: Arc<dyn Confirmer>,
    pub in_flight: InFlight,
}

impl<G: ?Sized> Clone for SectionContext<G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: self.notifier.clone(),
            confirmer: Arc::clone(&self.confirmer),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<G: AdminApi + ?Sized> SectionContext<G> {
    pub fn new(store: Arc<AdminStore<G>>, confirmer: Arc<dyn Confirmer>) -> Self {
        Self { store, notifier: Notifier::default(), confirmer, in_flight: InFlight::default() }
    }

    pub fn gateway(&self) -> &G {
        self.store.gateway()
    }

    pub(crate) fn confirm(&self, prompt: &str) -> Result<(), ActionError> {
        if self.confirmer.confirm(prompt) {
            Ok(())
        } else {
            Err(ActionError::Cancelled)
        }
    }

    pub(crate) fn claim(&self, key: impl Into<String>) -> Result<InFlightGuard, ActionError> {
        self.in_flight.begin(key).ok_or(ActionError::Busy)
    }

    /// Toasts the outcome of a mutation and refetches `refresh` after a
    /// success. Failed mutations leave the store untouched.
    pub(crate) async fn finish<T>(
        &self,
        outcome: Result<T, GatewayError>,
        success: impl FnOnce(&T) -> String,
        failure: impl FnOnce(&GatewayError) -> String,
        refresh: &[ResourceKind],
    ) -> Result<T, ActionError> {
        match outcome {
            Ok(value) => {
                self.notifier.success(success(&value));
                self.store.refresh(refresh).await;
                Ok(value)
            }
            Err(err) => {
                let message = failure(&err);
                self.notifier.error(message.clone());
                Err(ActionError::Failed { message, source: err })
            }
        }
    }
}
