//! Reply-reaction sub-flow: how a thread answers when the author replies.

use ai_client::{AiError, RetryPolicy, StructuredGenerator};
use echoroom_common::{Article, Comment, Reply};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decode::decode;
use crate::request::{RequestBuilder, SimulationContext};

/// Output shape of a reply-reaction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReplyReactions {
    pub replies: Vec<Reply>,
}

/// Generate reactions to the author's reply on one comment.
///
/// Never fails: every error is logged and degrades to no reactions, so the
/// author's own reply is never blocked by this call.
pub async fn react_to_reply<G: StructuredGenerator + ?Sized>(
    generator: &G,
    builder: &RequestBuilder,
    retry: &RetryPolicy,
    article: &Article,
    ctx: &SimulationContext,
    comment: &Comment,
    reply_text: &str,
) -> Vec<Reply> {
    let request = builder.reply_reaction(article, ctx, comment, reply_text);

    let outcome = retry
        .run(AiError::is_rate_limit, || generator.generate(&request))
        .await
        .and_then(|raw| decode::<ReplyReactions>(raw.as_deref()));

    match outcome {
        Ok(reactions) => {
            let replies: Vec<Reply> = reactions
                .replies
                .into_iter()
                .filter(|r| !r.content.trim().is_empty())
                .collect();
            info!(
                platform = %comment.platform,
                commenter = %comment.username,
                count = replies.len(),
                "Reply reactions generated"
            );
            replies
        }
        Err(e) => {
            warn!(
                error = %e,
                platform = %comment.platform,
                commenter = %comment.username,
                "Reply reaction failed, continuing without reactions"
            );
            Vec::new()
        }
    }
}
