pub mod config;
pub mod provider;
pub mod search;
pub mod state;

pub use provider::{HttpSearchProvider, SearchProvider};
pub use search::selection::{global_search_path, Key, KeyAction};
pub use search::SearchController;
pub use state::{Creator, CreatorPage, SearchState};
