pub mod admin;
pub mod attendance;
pub mod notification;
pub mod report;
