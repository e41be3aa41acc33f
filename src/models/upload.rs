use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Result of forwarding an uploaded image to the external asset host.
#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
pub struct UploadResponse {
    pub url: String,
    pub public_id: String,
}
