// Device domain model
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub id: String,
    pub name: String,
}

impl Device {
    pub fn new(id: String) -> Self {
        let name = Self::format_name(&id);
        Self { id, name }
    }

    fn format_name(id: &str) -> String {
        // Convert "Chlorella_40L_001" to "Chlorella 40L 001"
        id.trim_matches('_').replace('_', " ")
    }
}
