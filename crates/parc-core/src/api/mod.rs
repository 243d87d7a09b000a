//! Platform API: payload model, authenticated JSON client, creator resolution.

mod client;
mod model;
mod user;

pub use client::{ApiClient, ApiError};
pub use model::{
    AudioBlock, Block, Creator, FileBlock, ImageBlock, LinkBlock, PageExtra, PlayerUrl,
    PostsPage, RawPost, TextBlock, VideoBlock,
};
pub use user::resolve_user;
