pub mod auth;
pub mod profile_builder;
pub mod recommendations;

pub use profile_builder::ProfileBuilder;
pub use recommendations::{run_recommendation, DEFAULT_TOP_N};
