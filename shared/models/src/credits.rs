use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credits {
    pub title: String,
    pub team: String,
    pub names: Vec<String>,
    pub note: String,
}

impl Default for Credits {
    fn default() -> Self {
        Self {
            title: "Credits".to_string(),
            team: "Code&Chil".to_string(),
            names: vec![
                "Hardik Sahu".to_string(),
                "Akshat Lad".to_string(),
                "Krrish Agrawal".to_string(),
                "Archit Sapra".to_string(),
            ],
            note: "Thank you for using this application.".to_string(),
        }
    }
}
