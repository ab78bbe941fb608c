mod content;
mod controller;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use content::Content;
pub use controller::{CacheErrorPolicy, CatalogController, PageTicket, DEFAULT_SECURE_BASE_URL};
pub use state::ViewState;
