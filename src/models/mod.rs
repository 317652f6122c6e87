pub mod filters;
pub mod movie;
pub mod search;
pub mod validation;

pub use filters::{FilterSnapshot, GenreSelection, RatingBound, YearBound};
pub use movie::{Movie, MovieGenre, MoviePoster, MovieRating, ResultPage};
pub use search::SearchQuery;
pub use validation::{is_year, CollectionValidator, RangeValidator, ValidationError, MAX_RATING, MIN_RATING};
