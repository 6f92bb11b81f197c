// Public handlers: no authentication, used by the marketing site itself.
pub mod apply;
pub mod content;
pub mod news;
pub mod storage;

pub use apply::apply_post;
pub use content::content_get;
pub use news::{news_get, news_list};
pub use storage::storage_get;
