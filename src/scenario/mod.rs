pub mod catalog;
pub mod context;
pub mod favorites;
pub mod fixture;
pub mod locators;
pub mod login;
pub mod messaging;
pub mod products;
pub mod profile;
pub mod register;
pub mod report;
pub mod runner;
