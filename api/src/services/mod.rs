pub mod cookies;
pub mod db;
pub mod error;
pub mod identity;
pub mod session;
