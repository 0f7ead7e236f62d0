pub mod config;
pub mod domain;
pub mod errors;
pub mod intent;
pub mod parsing;

pub use domain::car::{
    ranges_overlap, AvailabilityWindow, CarDetails, CarRecord, PriceOperator,
};
pub use domain::preferences::{FallbackFilter, PreferenceSet};
pub use domain::session::{ConversationId, Session};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use intent::Intent;
