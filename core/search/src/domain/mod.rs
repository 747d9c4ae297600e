//! jobsearch 固有のドメイン型（型と不変条件）

pub mod bookmark;
pub mod error;
pub mod favorite;
pub mod filter_spec;
pub mod job;
pub mod normalize;
pub mod pagination;
pub mod predicate;
pub mod result_page;
pub mod summary;

pub use error::{FavoriteError, QueryStage, SearchError, StoreError};
pub use favorite::{FavoritedJob, ToggleOutcome, ToggleState};
pub use filter_spec::FilterSpec;
pub use job::{CompanyRef, JobRecord};
pub use normalize::{normalize, NormalizationFallback, Normalized, NO_PREFERENCE};
pub use pagination::Pagination;
pub use predicate::{build_predicate, Condition, JobField, Predicate};
pub use result_page::{ResultPage, SearchFailure, SearchOutcome};
pub use summary::{transform, JobSummary};
