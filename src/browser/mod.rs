pub mod driver;
pub mod protocol;
pub mod session;
