use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims of the bearer token issued by the identity provider.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    /// Customer id.
    pub sub: String,
    pub name: Option<String>,
    pub exp: usize,
}
