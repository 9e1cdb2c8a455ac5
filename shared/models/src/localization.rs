use serde::{Deserialize, Serialize};

/// Document classification driving the localization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Business,
    Legal,
    Technical,
    Scientific,
    Medical,
    Educational,
    General,
}

impl DocumentType {
    /// Classifiable types in tie-break order. `General` is the fallback, not a candidate.
    pub const CANDIDATES: [DocumentType; 6] = [
        DocumentType::Business,
        DocumentType::Legal,
        DocumentType::Technical,
        DocumentType::Scientific,
        DocumentType::Medical,
        DocumentType::Educational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Legal => "legal",
            Self::Technical => "technical",
            Self::Scientific => "scientific",
            Self::Medical => "medical",
            Self::Educational => "educational",
            Self::General => "general",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Business => "Business",
            Self::Legal => "Legal",
            Self::Technical => "Technical",
            Self::Scientific => "Scientific",
            Self::Medical => "Medical",
            Self::Educational => "Educational",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub name: String,
    pub label: String,
}

/// Target languages: (name, display label)
pub const LANGUAGES: &[(&str, &str)] = &[
    // Indian languages
    ("Hindi", "Hindi (हिंदी) - India"),
    ("Bengali", "Bengali (বাংলা) - India/Bangladesh"),
    ("Telugu", "Telugu (తెలుగు) - India"),
    ("Tamil", "Tamil (தமிழ்) - India/Sri Lanka"),
    ("Marathi", "Marathi (मराठी) - India"),
    ("Gujarati", "Gujarati (ગુજરાતી) - India"),
    ("Kannada", "Kannada (ಕನ್ನಡ) - India"),
    ("Malayalam", "Malayalam (മലയാളം) - India"),
    ("Punjabi", "Punjabi (ਪੰਜਾਬੀ) - India/Pakistan"),
    ("Urdu", "Urdu (اردو) - India/Pakistan"),
    ("Sanskrit", "Sanskrit (संस्कृतम्) - India"),
    ("Odia", "Odia (ଓଡ଼ିଆ) - India"),
    ("Assamese", "Assamese (অসমীয়া) - India"),
    ("Nepali", "Nepali (नेपाली) - Nepal/India"),
    // Major global languages
    ("English", "English - Global"),
    ("Spanish", "Spanish (Español) - Spain/Latin America"),
    ("French", "French (Français) - France/Global"),
    ("German", "German (Deutsch) - Germany/Austria/Switzerland"),
    ("Italian", "Italian (Italiano) - Italy"),
    ("Portuguese", "Portuguese (Português) - Brazil/Portugal"),
    ("Russian", "Russian (Русский) - Russia/CIS"),
    ("Chinese", "Chinese (中文) - China/Taiwan/Singapore"),
    ("Japanese", "Japanese (日本語) - Japan"),
    ("Korean", "Korean (한국어) - South Korea"),
    ("Arabic", "Arabic (العربية) - Middle East/North Africa"),
    ("Turkish", "Turkish (Türkçe) - Turkey"),
    ("Persian", "Persian (فارسی) - Iran/Afghanistan"),
    ("Hebrew", "Hebrew (עברית) - Israel"),
    ("Dutch", "Dutch (Nederlands) - Netherlands/Belgium"),
    ("Swedish", "Swedish (Svenska) - Sweden"),
    ("Norwegian", "Norwegian (Norsk) - Norway"),
    ("Danish", "Danish (Dansk) - Denmark"),
    ("Finnish", "Finnish (Suomi) - Finland"),
    ("Polish", "Polish (Polski) - Poland"),
    ("Czech", "Czech (Čeština) - Czech Republic"),
    ("Hungarian", "Hungarian (Magyar) - Hungary"),
    ("Romanian", "Romanian (Română) - Romania"),
    ("Greek", "Greek (Ελληνικά) - Greece"),
    // Southeast Asian languages
    ("Thai", "Thai (ไทย) - Thailand"),
    ("Vietnamese", "Vietnamese (Tiếng Việt) - Vietnam"),
    ("Indonesian", "Indonesian (Bahasa Indonesia) - Indonesia"),
    ("Malay", "Malay (Bahasa Melayu) - Malaysia/Singapore"),
    ("Filipino", "Filipino (Tagalog) - Philippines"),
    // African languages
    ("Swahili", "Swahili (Kiswahili) - East Africa"),
    ("Amharic", "Amharic (አማርኛ) - Ethiopia"),
    ("Yoruba", "Yoruba - Nigeria/West Africa"),
    ("Zulu", "Zulu - South Africa"),
    // Others
    ("Welsh", "Welsh (Cymraeg) - Wales"),
    ("Irish", "Irish (Gaeilge) - Ireland"),
    ("Catalan", "Catalan (Català) - Catalonia/Spain"),
    ("Basque", "Basque (Euskera) - Basque Country"),
    ("Estonian", "Estonian (Eesti) - Estonia"),
    ("Latvian", "Latvian (Latviešu) - Latvia"),
    ("Lithuanian", "Lithuanian (Lietuvių) - Lithuania"),
];

/// Cultural/regional contexts: (name, description)
pub const CULTURAL_CONTEXTS: &[(&str, &str)] = &[
    ("India - General", "Indian business practices, cultural norms, and regulatory environment"),
    ("India - North", "North Indian cultural context, Hindi business terminology"),
    ("India - South", "South Indian cultural context, regional business practices"),
    ("India - West", "Western Indian business hub context (Mumbai, Gujarat, Maharashtra)"),
    ("India - East", "Eastern Indian context (Bengal, Odisha business culture)"),
    ("USA - General", "American business culture, legal frameworks, market practices"),
    ("USA - Corporate", "Corporate America, Silicon Valley tech culture"),
    ("UK - General", "British business etiquette, regulatory environment"),
    ("Europe - EU", "European Union regulatory context, continental business practices"),
    ("China - Mainland", "Chinese business culture, regulatory environment"),
    ("Japan - Corporate", "Japanese business culture, formal protocols"),
    ("Southeast Asia", "ASEAN business context, multicultural considerations"),
    ("Middle East", "Middle Eastern business practices, cultural sensitivities"),
    ("Latin America", "Latin American business culture, regional variations"),
    ("Australia/NZ", "Australian/New Zealand business context"),
    ("Global/International", "International business context, cross-cultural neutral"),
    ("Academic/Research", "Academic and research institutional context"),
    ("Government/Public", "Government and public sector context"),
    ("Healthcare", "Healthcare industry specific context"),
    ("Financial Services", "Banking, finance, and investment context"),
    ("Technology", "Tech industry culture and practices"),
    ("Legal/Compliance", "Legal and regulatory compliance context"),
];

pub fn language_label(name: &str) -> Option<&'static str> {
    LANGUAGES.iter().find(|(n, _)| *n == name).map(|(_, label)| *label)
}

pub fn cultural_context_description(name: &str) -> Option<&'static str> {
    CULTURAL_CONTEXTS.iter().find(|(n, _)| *n == name).map(|(_, d)| *d)
}

pub fn catalogue(entries: &[(&str, &str)]) -> Vec<CatalogueEntry> {
    entries
        .iter()
        .map(|(name, label)| CatalogueEntry {
            name: name.to_string(),
            label: label.to_string(),
        })
        .collect()
}
