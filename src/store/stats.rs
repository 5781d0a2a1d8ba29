/// One overview card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: usize,
    pub change: &'static str,
}

/// Headline counts derived from the loaded collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_teachers: usize,
    pub total_students: usize,
    pub active_classes: usize,
    pub live_sessions: usize,
}

// Trend tracking is not implemented; every card reports no change.
const NO_CHANGE: &str = "+0";

impl Stats {
    pub fn cards(&self) -> [StatCard; 4] {
        [
            StatCard { title: "Total Teachers", value: self.total_teachers, change: NO_CHANGE },
            StatCard { title: "Total Students", value: self.total_students, change: NO_CHANGE },
            StatCard { title: "Active Classes", value: self.active_classes, change: NO_CHANGE },
            StatCard { title: "Live Sessions", value: self.live_sessions, change: NO_CHANGE },
        ]
    }
}
