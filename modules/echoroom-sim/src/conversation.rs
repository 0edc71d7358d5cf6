//! Conversation reconciliation.
//!
//! The rendered comment list is owned here and only ever appended to. A
//! user's reply lands immediately; generated reactions land after it once
//! the sub-flow resolves. Each comment thread allows one pending sub-flow at
//! a time; other threads are unaffected.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ai_client::StructuredGenerator;
use echoroom_common::{Article, Comment, ReconcileError, Reply, SimulationResult};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::platform::PlatformFilter;
use crate::simulator::Simulator;

/// Position of a comment in the unfiltered list.
pub type CommentId = usize;

type AwaitingSet = Arc<Mutex<HashSet<CommentId>>>;

fn lock(awaiting: &AwaitingSet) -> MutexGuard<'_, HashSet<CommentId>> {
    awaiting.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Proof that a thread is awaiting a reaction. Consumed by `finish_reply`.
///
/// Dropping it unfinished (a cancelled caller, a panicked task) clears the
/// awaiting mark too; the user's reply stays.
#[derive(Debug)]
#[must_use = "dropping a pending reply abandons its reactions"]
pub struct PendingReply {
    comment: CommentId,
    awaiting: AwaitingSet,
}

impl PendingReply {
    pub fn comment(&self) -> CommentId {
        self.comment
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        lock(&self.awaiting).remove(&self.comment);
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    comments: Vec<Comment>,
    awaiting: AwaitingSet,
}

// Clones get their own awaiting set so snapshots never share marks.
impl Clone for Conversation {
    fn clone(&self) -> Self {
        Self {
            comments: self.comments.clone(),
            awaiting: Arc::new(Mutex::new(lock(&self.awaiting).clone())),
        }
    }
}

impl Conversation {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self {
            comments,
            awaiting: AwaitingSet::default(),
        }
    }

    pub fn from_result(result: &SimulationResult) -> Self {
        Self::new(result.comments.clone())
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.get(id)
    }

    pub fn is_awaiting(&self, id: CommentId) -> bool {
        lock(&self.awaiting).contains(&id)
    }

    /// Comments shown under `filter`, each with its identity.
    pub fn visible(&self, filter: PlatformFilter) -> Vec<(CommentId, &Comment)> {
        self.comments
            .iter()
            .enumerate()
            .filter(|(_, c)| filter.matches(c))
            .collect()
    }

    /// Map a position in the filtered view back to the comment identity.
    pub fn resolve_visible(&self, filter: PlatformFilter, index: usize) -> Option<CommentId> {
        self.comments
            .iter()
            .enumerate()
            .filter(|(_, c)| filter.matches(c))
            .nth(index)
            .map(|(id, _)| id)
    }

    /// Append the user's reply and mark the thread as awaiting a reaction.
    pub fn begin_reply(
        &mut self,
        id: CommentId,
        reply: Reply,
    ) -> Result<PendingReply, ReconcileError> {
        if reply.content.trim().is_empty() {
            return Err(ReconcileError::EmptyReply);
        }
        let comment = self
            .comments
            .get_mut(id)
            .ok_or(ReconcileError::UnknownComment(id))?;
        let mut awaiting = lock(&self.awaiting);
        if awaiting.contains(&id) {
            return Err(ReconcileError::ThreadBusy(id));
        }

        comment.replies.push(reply);
        awaiting.insert(id);
        debug!(comment = id, replies = comment.replies.len(), "User reply appended");
        Ok(PendingReply {
            comment: id,
            awaiting: Arc::clone(&self.awaiting),
        })
    }

    /// Append reactions after the user's reply and clear the awaiting mark,
    /// whether or not any reactions arrived.
    pub fn finish_reply(&mut self, pending: PendingReply, reactions: Vec<Reply>) -> usize {
        let id = pending.comment;
        let count = reactions.len();
        if let Some(comment) = self.comments.get_mut(id) {
            comment.replies.extend(reactions);
        }
        drop(pending);
        debug!(comment = id, appended = count, "Reply thread reconciled");
        count
    }

    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
    }
}

/// Shared handle over a conversation for concurrent reply threads.
#[derive(Debug, Default)]
pub struct ConversationSession {
    state: RwLock<Conversation>,
}

impl ConversationSession {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            state: RwLock::new(conversation),
        }
    }

    pub async fn snapshot(&self) -> Conversation {
        self.state.read().await.clone()
    }

    pub async fn is_awaiting(&self, id: CommentId) -> bool {
        self.state.read().await.is_awaiting(id)
    }

    /// Reply as the article's author and wait for the reactions.
    ///
    /// The user's reply is visible to other readers of the session before
    /// the sub-flow starts. Returns the reactions that were appended.
    pub async fn reply<G: StructuredGenerator>(
        &self,
        simulator: &Simulator<G>,
        article: &Article,
        id: CommentId,
        text: &str,
    ) -> Result<Vec<Reply>, ReconcileError> {
        let (pending, target) = self.begin(article, id, text).await?;
        let reactions = simulator.submit_reply(article, &target, text).await;
        self.finish(pending, reactions.clone()).await;
        Ok(reactions)
    }

    /// Like [`reply`](Self::reply), addressed by position in a filtered view.
    pub async fn reply_visible<G: StructuredGenerator>(
        &self,
        simulator: &Simulator<G>,
        article: &Article,
        filter: PlatformFilter,
        index: usize,
        text: &str,
    ) -> Result<Vec<Reply>, ReconcileError> {
        let id = self
            .state
            .read()
            .await
            .resolve_visible(filter, index)
            .ok_or(ReconcileError::UnknownComment(index))?;
        self.reply(simulator, article, id, text).await
    }

    /// Append the user's reply now and run the sub-flow as a background task.
    ///
    /// Rejections (busy thread, unknown comment, empty text) are returned
    /// before anything is spawned.
    pub async fn spawn_reply<G>(
        self: &Arc<Self>,
        simulator: Arc<Simulator<G>>,
        article: Article,
        id: CommentId,
        text: String,
    ) -> Result<JoinHandle<Vec<Reply>>, ReconcileError>
    where
        G: StructuredGenerator + 'static,
    {
        let (pending, target) = self.begin(&article, id, &text).await?;
        let session = Arc::clone(self);

        Ok(tokio::spawn(async move {
            let reactions = simulator.submit_reply(&article, &target, &text).await;
            session.finish(pending, reactions.clone()).await;
            reactions
        }))
    }

    async fn begin(
        &self,
        article: &Article,
        id: CommentId,
        text: &str,
    ) -> Result<(PendingReply, Comment), ReconcileError> {
        let mut state = self.state.write().await;
        let target = state
            .comment(id)
            .cloned()
            .ok_or(ReconcileError::UnknownComment(id))?;
        let pending = state.begin_reply(id, Reply::new(&article.author, text.trim()))?;
        info!(comment = id, platform = %target.platform, "Author replied, awaiting reaction");
        Ok((pending, target))
    }

    async fn finish(&self, pending: PendingReply, reactions: Vec<Reply>) {
        self.state.write().await.finish_reply(pending, reactions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformFamily;
    use crate::testing::{
        article, four_comments, replies_json, result_with, GatedGenerator, ScriptedGenerator,
    };
    use ai_client::{AiError, RetryPolicy};
    use echoroom_common::Config;
    use std::time::Duration;

    fn simulator<G: StructuredGenerator>(generator: G) -> Simulator<G> {
        Simulator::new(generator, &Config::offline("gpt-4o-mini"))
            .with_current_year(2026)
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
    }

    fn conversation() -> Conversation {
        Conversation::from_result(&result_with(four_comments()))
    }

    #[test]
    fn begin_appends_only_to_target_thread() {
        let mut conv = conversation();
        let before = conv.comments().to_vec();

        let pending = conv.begin_reply(2, Reply::new("author", "Thanks!")).unwrap();
        assert_eq!(pending.comment(), 2);

        assert_eq!(conv.comments()[2].replies, vec![Reply::new("author", "Thanks!")]);
        for id in [0, 1, 3] {
            assert_eq!(conv.comments()[id], before[id]);
        }
        assert!(conv.is_awaiting(2));
        assert!(!conv.is_awaiting(1));
    }

    #[test]
    fn busy_thread_rejects_second_reply() {
        let mut conv = conversation();
        let _pending = conv.begin_reply(2, Reply::new("author", "one")).unwrap();

        let err = conv.begin_reply(2, Reply::new("author", "two")).unwrap_err();
        assert_eq!(err, ReconcileError::ThreadBusy(2));
        assert_eq!(conv.comments()[2].replies.len(), 1);

        // other threads stay open
        assert!(conv.begin_reply(3, Reply::new("author", "three")).is_ok());
    }

    #[test]
    fn finish_appends_after_user_reply_and_clears_mark() {
        let mut conv = conversation();
        let pending = conv.begin_reply(2, Reply::new("author", "mine")).unwrap();

        let appended = conv.finish_reply(
            pending,
            vec![Reply::new("x", "first"), Reply::new("y", "second")],
        );

        assert_eq!(appended, 2);
        let contents: Vec<_> = conv.comments()[2]
            .replies
            .iter()
            .map(|r| r.content.as_str())
            .collect();
        assert_eq!(contents, vec!["mine", "first", "second"]);
        assert!(!conv.is_awaiting(2));
    }

    #[test]
    fn empty_reactions_still_clear_mark() {
        let mut conv = conversation();
        let pending = conv.begin_reply(2, Reply::new("author", "mine")).unwrap();
        conv.finish_reply(pending, Vec::new());

        assert_eq!(conv.comments()[2].replies, vec![Reply::new("author", "mine")]);
        assert!(!conv.is_awaiting(2));
        assert!(conv.begin_reply(2, Reply::new("author", "again")).is_ok());
    }

    #[test]
    fn rejects_unknown_comment_and_blank_text() {
        let mut conv = conversation();
        assert_eq!(
            conv.begin_reply(9, Reply::new("a", "hi")).unwrap_err(),
            ReconcileError::UnknownComment(9)
        );
        assert_eq!(
            conv.begin_reply(0, Reply::new("a", "   ")).unwrap_err(),
            ReconcileError::EmptyReply
        );
        assert!(!conv.is_awaiting(0));
    }

    #[test]
    fn filtered_index_resolves_to_identity() {
        let conv = conversation();
        let male = PlatformFilter::Family(PlatformFamily::MaleCommunity);

        assert_eq!(conv.resolve_visible(male, 0), Some(2));
        assert_eq!(conv.resolve_visible(male, 1), None);
        assert_eq!(conv.resolve_visible(PlatformFilter::All, 3), Some(3));
        assert_eq!(conv.visible(male).len(), 1);
    }

    #[tokio::test]
    async fn session_reply_appends_user_then_reactions() {
        let reactions = vec![Reply::new("anon_gall", "lol the author showed up")];
        let sim = simulator(ScriptedGenerator::new().then_text(replies_json(&reactions)));
        let session = ConversationSession::new(conversation());
        let a = article();

        let got = session.reply(&sim, &a, 2, "  Read the budget section.  ").await.unwrap();
        assert_eq!(got, reactions);

        let snapshot = session.snapshot().await;
        let replies = &snapshot.comments()[2].replies;
        assert_eq!(replies[0], Reply::new(&a.author, "Read the budget section."));
        assert_eq!(replies[1], reactions[0]);
        assert!(!snapshot.is_awaiting(2));
        for id in [0, 1, 3] {
            assert!(snapshot.comments()[id].replies.is_empty());
        }
    }

    #[tokio::test]
    async fn session_failure_keeps_only_user_reply() {
        let sim = simulator(ScriptedGenerator::new().then_error(AiError::api(500, "down")));
        let session = ConversationSession::new(conversation());
        let a = article();

        let got = session.reply(&sim, &a, 2, "hello").await.unwrap();
        assert!(got.is_empty());

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.comments()[2].replies, vec![Reply::new(&a.author, "hello")]);
        assert!(!snapshot.is_awaiting(2));
    }

    #[tokio::test]
    async fn reply_visible_targets_filtered_comment() {
        let sim = simulator(ScriptedGenerator::new().then_empty());
        let session = ConversationSession::new(conversation());
        let female = PlatformFilter::Family(PlatformFamily::FemaleCommunity);

        session
            .reply_visible(&sim, &article(), female, 0, "Yes, it is real")
            .await
            .unwrap();

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.comments()[1].replies.len(), 1);
        assert!(snapshot.comments()[0].replies.is_empty());
    }

    #[tokio::test]
    async fn spawned_reply_is_optimistic_and_exclusive_per_thread() {
        let reactions = vec![Reply::new("portal_user", "Nice reply")];
        let generator = GatedGenerator::new(
            ScriptedGenerator::new()
                .then_text(replies_json(&reactions))
                .then_empty(),
        );
        let gate = generator.gate();
        let generator = Arc::new(generator);
        let sim = Arc::new(simulator(Arc::clone(&generator)));
        let session = Arc::new(ConversationSession::new(conversation()));
        let a = article();

        let handle = session
            .spawn_reply(sim.clone(), a.clone(), 3, "Thanks".into())
            .await
            .unwrap();

        // user's reply is already rendered while the sub-flow is held
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.comments()[3].replies, vec![Reply::new(&a.author, "Thanks")]);
        assert!(session.is_awaiting(3).await);

        // same thread is blocked, another thread is not
        let busy = session
            .spawn_reply(sim.clone(), a.clone(), 3, "Again".into())
            .await
            .unwrap_err();
        assert_eq!(busy, ReconcileError::ThreadBusy(3));

        let other = session
            .spawn_reply(sim.clone(), a.clone(), 0, "Hi".into())
            .await
            .unwrap();

        gate.notify_one();
        assert_eq!(handle.await.unwrap(), reactions);
        gate.notify_one();
        assert!(other.await.unwrap().is_empty());

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.comments()[3].replies.len(), 2);
        assert_eq!(snapshot.comments()[3].replies[1], reactions[0]);
        assert_eq!(snapshot.comments()[0].replies.len(), 1);
        assert!(!snapshot.is_awaiting(3));
        assert!(!snapshot.is_awaiting(0));
        // the rejected reply never reached the model
        assert_eq!(generator.calls(), 2);
    }

    #[test]
    fn dropping_pending_reply_clears_mark() {
        let mut conv = conversation();
        let pending = conv.begin_reply(2, Reply::new("author", "mine")).unwrap();
        assert!(conv.is_awaiting(2));

        drop(pending);

        assert!(!conv.is_awaiting(2));
        assert_eq!(conv.comments()[2].replies, vec![Reply::new("author", "mine")]);
        assert!(conv.begin_reply(2, Reply::new("author", "again")).is_ok());
    }

    #[test]
    fn snapshot_marks_are_independent() {
        let mut conv = conversation();
        let pending = conv.begin_reply(1, Reply::new("author", "mine")).unwrap();
        let snapshot = conv.clone();

        conv.finish_reply(pending, Vec::new());

        assert!(!conv.is_awaiting(1));
        assert!(snapshot.is_awaiting(1));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_reply_releases_thread() {
        let generator = GatedGenerator::new(ScriptedGenerator::new().then_empty());
        let sim = simulator(generator);
        let session = ConversationSession::new(conversation());
        let a = article();

        let outcome =
            tokio::time::timeout(Duration::from_secs(5), session.reply(&sim, &a, 2, "hello")).await;
        assert!(outcome.is_err());

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.comments()[2].replies, vec![Reply::new(&a.author, "hello")]);
        assert!(!snapshot.is_awaiting(2));
        assert!(!session.is_awaiting(2).await);
    }

    #[tokio::test]
    async fn panicked_task_releases_thread() {
        let session = Arc::new(ConversationSession::new(conversation()));
        let pending = session
            .state
            .write()
            .await
            .begin_reply(3, Reply::new("author", "hi"))
            .unwrap();

        let task = tokio::spawn(async move {
            let _pending = pending;
            panic!("sub-flow crashed");
        });
        assert!(task.await.unwrap_err().is_panic());

        assert!(!session.is_awaiting(3).await);
    }
}
