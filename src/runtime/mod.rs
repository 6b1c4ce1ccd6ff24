pub mod fetcher;
pub mod logging;
pub mod publications;
pub mod store;
