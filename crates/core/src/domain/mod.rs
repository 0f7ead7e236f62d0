pub mod car;
pub mod preferences;
pub mod session;
