mod auth;
mod features;
pub mod projections;
mod report;

pub use auth::TokenManager;
pub use features::FeatureTable;
pub use report::ReportManager;
