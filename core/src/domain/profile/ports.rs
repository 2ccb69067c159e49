use crate::domain::{common::entities::app_errors::CoreError, profile::entities::BabyProfile};

/// Durable client-side storage for the single toddler profile.
#[cfg_attr(test, mockall::automock)]
pub trait ProfileStore: Send + Sync {
    fn load(&self) -> Result<Option<BabyProfile>, CoreError>;

    fn save(&self, profile: &BabyProfile) -> Result<(), CoreError>;
}
