pub mod ratings;
pub mod review;
pub mod reviews;
pub mod tour;
pub mod tours;
pub mod user;
pub mod users;
pub mod validate;

/// Collection names owned by the domain layer.
pub mod collections {
    pub const TOURS: &str = "tours";
    pub const REVIEWS: &str = "reviews";
    pub const USERS: &str = "users";
}

pub use ratings::RatingsMaintainer;
pub use reviews::Reviews;
pub use tours::Tours;
pub use users::Users;

use chrono::Utc;

/// Current wall-clock time as unix milliseconds, the store's timestamp unit.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
