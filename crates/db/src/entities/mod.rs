//! Database entities.

pub mod comment;
pub mod follow;
pub mod message;
pub mod post;
pub mod post_like;
pub mod user_profile;

pub use comment::Entity as Comment;
pub use follow::Entity as Follow;
pub use message::Entity as Message;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use user_profile::Entity as UserProfile;
