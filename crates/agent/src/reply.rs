use serde::{Deserialize, Serialize};

use rentdesk_core::domain::car::CarDetails;

/// What the assistant says back, plus the suggested car when a booking narrowed to one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_details: Option<CarDetails>,
}

impl Reply {
    pub fn text(message: impl Into<String>) -> Self {
        Self { message: message.into(), car_details: None }
    }

    pub fn with_car(message: impl Into<String>, car_details: CarDetails) -> Self {
        Self { message: message.into(), car_details: Some(car_details) }
    }
}
