//! Request and response DTOs for the catnews HTTP API.

mod request;
mod response;

pub use request::{
    CreateArticleRequest, FeedIdQuery, LoginRequest, OAuthCallbackQuery, PageQuery,
    RegisterRequest, SubscribeRequest, UpdateFeedRequest,
};
pub use response::{ArticleResponse, FeedResponse, TokenResponse, UserResponse};
