pub mod attendance;
pub mod class;
pub mod notification;
pub mod role;
pub mod student;
pub mod user;
