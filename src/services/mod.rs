pub mod history;
pub mod profile;
pub mod providers;
pub mod recommendations;
pub mod scoring;
pub mod similarity;
pub mod top_tracks;

pub use history::{FetchedHistory, HistoryFetcher};
pub use profile::build_profile;
pub use recommendations::RecommendationAssembler;
pub use similarity::similarity;
