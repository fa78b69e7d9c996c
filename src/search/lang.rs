const SPANISH_INDICATORS: &[&str] = &[
    "¿", "á", "é", "í", "ó", "ú", "ñ", "ü", "que", "qué", "como", "cómo", "donde", "dónde",
    "cuando", "cuándo", "porque", "por qué", "para", "con", "sin", "sobre", "entre", "durante",
    "español", "españa", "mexico", "argentina",
];

/// Response language picked from the question text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    Es,
    #[default]
    En,
}

impl Lang {
    /// Substring match against a fixed indicator list. Any hit means Spanish.
    pub fn detect(text: &str) -> Lang {
        let lower = text.trim().to_lowercase();
        if SPANISH_INDICATORS.iter().any(|ind| lower.contains(ind)) {
            Lang::Es
        } else {
            Lang::En
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::Es => "es",
            Lang::En => "en",
        }
    }
}
