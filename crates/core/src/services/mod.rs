//! Business logic services.

#![allow(missing_docs)]

pub mod conversation;
pub mod feed;
pub mod follow;
pub mod pagination;
pub mod post;
pub mod profile;

pub use conversation::{
    ConversationPage, ConversationService, ConversationSummary, SendMessageInput,
};
pub use feed::{FEED_LIMIT, FeedMode, FeedPost, FeedService, TRENDING_WINDOW_DAYS};
pub use follow::{FollowService, FollowSummary, RECOMMENDED_LIMIT, RecommendedUser};
pub use pagination::{PageInfo, PageRequest};
pub use post::{CommentView, CreateCommentInput, CreatePostInput, PostService};
pub use profile::{ProfileService, UpsertProfileInput};
