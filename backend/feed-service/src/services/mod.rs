pub mod chain;
pub mod engagement;
pub mod feed;
pub mod visibility;

pub use feed::FeedService;
pub use visibility::{is_visible, FeedScope, ViewerContext};
