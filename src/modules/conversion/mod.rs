pub mod events;
pub mod filters;
pub mod service;
