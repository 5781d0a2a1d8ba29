use super::{ActionError, SectionContext};
use crate::schemas::session::VideoSession;
use crate::services::gateway::AdminApi;
use crate::store::ResourceKind;

const JOIN_KEY: &str = "join";

/// Card heading: the meeting id when there is one, else the session title.
pub fn session_title(session: &VideoSession) -> &str {
    session
        .meeting_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .or(session.title.as_deref())
        .unwrap_or(&session.id)
}

pub struct LiveSessionsSection<G: ?Sized> {
    ctx: SectionContext<G>,
    video_call_path: String,
}

impl<G: AdminApi + ?Sized> LiveSessionsSection<G> {
    pub fn new(ctx: SectionContext<G>, video_call_path: impl Into<String>) -> Self {
        Self { ctx, video_call_path: video_call_path.into().trim_end_matches('/').to_string() }
    }

    pub fn sessions(&self) -> Vec<VideoSession> {
        self.ctx.store.snapshot().live_sessions
    }

    pub fn is_joining(&self) -> bool {
        self.ctx.in_flight.contains(JOIN_KEY)
    }

    /// Joins a session and returns the link to open. Only one join runs at
    /// a time.
    pub async fn join(&self, session: &VideoSession) -> Result<String, ActionError> {
        let _guard = self.ctx.claim(JOIN_KEY)?;
        let meeting_id = session.meeting_key();

        match self.ctx.gateway().join_video_call(meeting_id).await {
            Ok(joined) => Ok(joined.join_url.unwrap_or_else(|| {
                let meeting_id = joined.meeting_id.as_deref().unwrap_or(meeting_id);
                format!("{}/{meeting_id}", self.video_call_path)
            })),
            Err(err) => {
                let message = format!("Failed to join session: {err}");
                self.ctx.notifier.error(message.clone());
                Err(ActionError::Failed { message, source: err })
            }
        }
    }

    pub async fn remove_participant(
        &self,
        session: &VideoSession,
        participant_id: &str,
    ) -> Result<(), ActionError> {
        let _guard = self.ctx.claim(format!("remove_{participant_id}"))?;

        let outcome =
            self.ctx.gateway().remove_from_video_call(session.meeting_key(), participant_id).await;
        self.ctx
            .finish(
                outcome,
                |_| "Participant removed".to_string(),
                |err| format!("Failed to remove participant: {err}"),
                &[ResourceKind::Live],
            )
            .await
    }

    pub async fn refresh(&self) {
        self.ctx.store.refresh(&[ResourceKind::Live]).await;
    }
}
