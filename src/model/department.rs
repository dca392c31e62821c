use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}
