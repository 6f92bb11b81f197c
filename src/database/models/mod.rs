pub mod application;
pub mod post;
pub mod profile;

pub use application::{ApplicationReceipt, NewApplication};
pub use post::{Post, PostInput, PostSummary};
pub use profile::{Profile, Role};
