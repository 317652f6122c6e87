pub mod filter_store;
pub mod notification;
pub mod orchestrator;
pub mod resolver;
pub mod session;
pub mod url_codec;

pub use filter_store::{DateRangeStore, FilterStore, FilterStores, FilterUpdate, GenreStore, RatingStore};
pub use notification::{Notification, NotificationCenter, Notifier, Severity};
pub use orchestrator::{FetchOrchestrator, FetchOutcome, FetchState, FetchStatus, FetchTicket, MoviesView};
pub use resolver::{resolve, sync_date_range};
pub use session::{BrowseSession, FiltersState};
pub use url_codec::{decode, encode, UrlField, UrlFilters, UrlState, UrlUpdate};
