pub mod admins;
pub mod auth;
pub mod employees;
pub mod navigation;
pub mod permissions;
pub mod roles;
