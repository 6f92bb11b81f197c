// Handlers are grouped by who may call them:
// public (no auth), protected (valid JWT), admin (JWT + admin role).
pub mod admin;
pub mod protected;
pub mod public;
