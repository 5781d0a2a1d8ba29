use super::SectionContext;
use crate::services::gateway::AdminApi;
use crate::store::{ResourceKind, StatCard};

pub const NO_RECENT_ACTIVITY: &str = "No recent activity";

const RECENT_TEACHERS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentActivity {
    pub title: String,
    pub detail: Option<String>,
}

pub struct OverviewSection<G: ?Sized> {
    ctx: SectionContext<G>,
}

impl<G: AdminApi + ?Sized> OverviewSection<G> {
    pub fn new(ctx: SectionContext<G>) -> Self {
        Self { ctx }
    }

    pub fn cards(&self) -> [StatCard; 4] {
        self.ctx.store.snapshot().stats.cards()
    }

    /// The first teachers in listing order.
    pub fn recent_activity(&self) -> Vec<RecentActivity> {
        self.ctx
            .store
            .snapshot()
            .teachers
            .iter()
            .take(RECENT_TEACHERS)
            .map(|teacher| RecentActivity {
                title: format!("Teacher: {}", teacher.name),
                detail: teacher.subject.clone(),
            })
            .collect()
    }

    /// Placeholder shown instead of an empty activity list.
    pub fn activity_placeholder(&self) -> Option<&'static str> {
        self.ctx.store.snapshot().teachers.is_empty().then_some(NO_RECENT_ACTIVITY)
    }

    pub fn is_loading(&self) -> bool {
        let state = self.ctx.store.snapshot();
        state.is_loading(ResourceKind::Teachers) || state.is_loading(ResourceKind::Students)
    }
}
