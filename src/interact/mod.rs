pub mod executor;
pub mod poller;
pub mod resolver;
