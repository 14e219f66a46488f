//! Rota and rota membership models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// How long a single rotation lasts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RotaFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl RotaFrequency {
    pub const ALL: [RotaFrequency; 3] = [
        RotaFrequency::Daily,
        RotaFrequency::Weekly,
        RotaFrequency::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RotaFrequency::Daily => "Daily",
            RotaFrequency::Weekly => "Weekly",
            RotaFrequency::Monthly => "Monthly",
        }
    }
}

impl FromStr for RotaFrequency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, AppError> {
        match s {
            "Daily" => Ok(RotaFrequency::Daily),
            "Weekly" => Ok(RotaFrequency::Weekly),
            "Monthly" => Ok(RotaFrequency::Monthly),
            other => Err(AppError::BadRequest(format!(
                "Unknown rota frequency '{}'",
                other
            ))),
        }
    }
}

/// How the members of a rota are scheduled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RotaSchedule {
    #[default]
    #[serde(rename = "Created At")]
    CreatedOrder,
    #[serde(rename = "Randomly")]
    Random,
}

impl RotaSchedule {
    pub const ALL: [RotaSchedule; 2] = [RotaSchedule::CreatedOrder, RotaSchedule::Random];

    pub fn as_str(&self) -> &'static str {
        match self {
            RotaSchedule::CreatedOrder => "Created At",
            RotaSchedule::Random => "Randomly",
        }
    }
}

impl FromStr for RotaSchedule {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, AppError> {
        match s {
            "Created At" => Ok(RotaSchedule::CreatedOrder),
            "Randomly" => Ok(RotaSchedule::Random),
            other => Err(AppError::BadRequest(format!(
                "Unknown scheduling type '{}'",
                other
            ))),
        }
    }
}

/// Settings stored as JSON in the `metadata` column of a rota.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RotaMetadata {
    pub frequency: RotaFrequency,
    #[serde(rename = "scheduling_type")]
    pub scheduling: RotaSchedule,
}

/// A named on-call group scoped to one channel and team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rota {
    pub id: String,
    pub team_id: String,
    pub channel_id: String,
    pub name: String,
    pub metadata: RotaMetadata,
    pub created_at: String,
    pub updated_at: String,
}

/// Parameters for creating a rota (empty `rota_id`) or updating one in place.
#[derive(Debug, Clone, Default)]
pub struct SaveRotaParams {
    pub rota_id: String,
    pub team_id: String,
    pub channel_id: String,
    pub name: String,
    pub metadata: RotaMetadata,
}
