pub mod slug;
pub mod validation;

pub use slug::normalize_code;
pub use validation::ValidatedJson;
