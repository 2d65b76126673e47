pub mod app_config;
pub mod companies;
pub mod comments;
pub mod db;
pub mod error;
pub mod experiences;
pub mod insights;
pub mod ip;
pub mod middleware;
pub mod moderation;
pub mod notifications;
pub mod orm;
pub mod permission;
pub mod rate_limit;
pub mod session;
pub mod user;
pub mod web;
