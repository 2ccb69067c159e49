use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GetHistoryParams {
    /// Only return results saved for this user
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl GetHistoryParams {
    /// An empty `userId` means no filter.
    pub fn user_filter(self) -> Option<String> {
        self.user_id.filter(|id| !id.is_empty())
    }
}
