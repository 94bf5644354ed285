use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_names": "Claudia",
        "last_names": "Aguilar",
        "national_id": "10000006",
        "contract": "Planilla"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Claudia")]
    pub first_names: String,

    #[schema(example = "Aguilar")]
    pub last_names: String,

    /// National identity document number, unique per employee.
    #[schema(example = "10000006")]
    pub national_id: String,

    #[schema(example = "Planilla")]
    pub contract: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_names)
    }
}

pub fn full_name(first_names: &str, last_names: &str) -> String {
    format!("{} {}", first_names.trim(), last_names.trim())
}

/// Bulk-load input for the admin CLI.
#[derive(Debug, Deserialize)]
pub struct NewEmployee {
    pub first_names: String,
    pub last_names: String,
    pub national_id: String,
    #[serde(default = "default_contract")]
    pub contract: String,
}

fn default_contract() -> String {
    "Planilla".to_string()
}
