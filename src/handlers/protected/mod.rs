// Protected handlers: any caller with a valid identity-provider JWT.
pub mod whoami;

pub use whoami::whoami_get;
