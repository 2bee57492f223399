pub mod catalog;
pub mod profile;
pub mod survey;
pub mod user;

pub use catalog::{Destination, DestinationTag, NewDestination, Tag};
pub use profile::{Profile, TagName, TagNameError};
pub use survey::{Answers, Recommendation, SurveyResult, SurveyStats, SurveySubmission};
pub use user::{
    AuthenticatedUser, Claims, LoginRequest, NewUser, RegisterRequest, TokenResponse, User,
    UserResponse,
};
