// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_REVOKED: &str = "session.revoked";
pub const SESSION_EXPIRED: &str = "session.expired";
pub const SESSION_ACTIVE: &str = "session.active";
pub const USER_REGISTERED: &str = "user.registered";
pub const USER_DELETED: &str = "user.deleted";
pub const LOGIN_SUCCEEDED: &str = "auth.login_succeeded";
pub const LOGIN_FAILED: &str = "auth.login_failed";
pub const FEEDBACK_CREATED: &str = "feedback.created";
pub const FEEDBACK_UPDATED: &str = "feedback.updated";
pub const FEEDBACK_DELETED: &str = "feedback.deleted";
