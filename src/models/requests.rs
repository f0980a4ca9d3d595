use serde::{Deserialize, Serialize};
use validator::Validate;

/// Optional body for the recommend endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(range(min = 1, max = 10))]
    #[serde(default)]
    pub limit: Option<u16>,
}
