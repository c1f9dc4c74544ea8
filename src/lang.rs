//! Shared multilingual keyword tables.
//!
//! One table per language, reused by About-page link matching, founder
//! section matching, and caption language detection, so the three
//! heuristics cannot drift apart.

/// Keyword sets for one supported language.
pub struct LanguageProfile {
    /// ISO 639-1 code.
    pub code: &'static str,
    pub name: &'static str,
    /// Terms that mark a link or heading as an About/Team page.
    pub about_terms: &'static [&'static str],
    /// Terms that mark a section as founder/leadership related.
    pub founder_terms: &'static [&'static str],
    /// High-frequency words used to detect the language of post captions.
    pub indicator_words: &'static [&'static str],
}

pub const LANGUAGES: &[LanguageProfile] = &[
    LanguageProfile {
        code: "en",
        name: "English",
        about_terms: &["about", "about us", "our story", "team", "who we are", "company"],
        founder_terms: &["founder", "co-founder", "ceo", "owner", "founded by"],
        indicator_words: &["the", "and", "with", "for", "our", "your", "from", "this"],
    },
    LanguageProfile {
        code: "da",
        name: "Danish",
        about_terms: &["om os", "om", "vores historie", "holdet", "hvem vi er"],
        founder_terms: &["grundlægger", "stifter", "ejer", "direktør"],
        indicator_words: &["og", "det", "med", "til", "vores", "din", "ikke", "hos"],
    },
    LanguageProfile {
        code: "fr",
        name: "French",
        about_terms: &["à propos", "a propos", "qui sommes-nous", "notre histoire", "équipe"],
        founder_terms: &["fondateur", "fondatrice", "cofondateur", "dirigeant"],
        indicator_words: &["le", "la", "les", "et", "avec", "pour", "nous", "vous"],
    },
    LanguageProfile {
        code: "de",
        name: "German",
        about_terms: &["über uns", "ueber uns", "unternehmen", "unsere geschichte", "das team"],
        founder_terms: &["gründer", "gruender", "geschäftsführer", "inhaber"],
        indicator_words: &["und", "der", "die", "das", "mit", "für", "wir", "nicht"],
    },
    LanguageProfile {
        code: "es",
        name: "Spanish",
        about_terms: &["sobre nosotros", "quiénes somos", "quienes somos", "nuestra historia", "equipo"],
        founder_terms: &["fundador", "fundadora", "cofundador", "director"],
        indicator_words: &["el", "la", "los", "con", "para", "nuestro", "que", "una"],
    },
    LanguageProfile {
        code: "it",
        name: "Italian",
        about_terms: &["chi siamo", "la nostra storia", "il team", "azienda"],
        founder_terms: &["fondatore", "fondatrice", "cofondatore", "titolare"],
        indicator_words: &["il", "la", "di", "che", "con", "per", "nostro", "una"],
    },
    LanguageProfile {
        code: "pt",
        name: "Portuguese",
        about_terms: &["sobre nós", "sobre nos", "quem somos", "nossa história", "equipe", "equipa"],
        founder_terms: &["fundador", "fundadora", "cofundador", "diretor"],
        indicator_words: &["o", "a", "os", "com", "para", "nosso", "que", "uma"],
    },
    LanguageProfile {
        code: "nl",
        name: "Dutch",
        about_terms: &["over ons", "ons verhaal", "het team", "wie wij zijn"],
        founder_terms: &["oprichter", "medeoprichter", "eigenaar", "directeur"],
        indicator_words: &["de", "het", "en", "met", "voor", "onze", "een", "niet"],
    },
    LanguageProfile {
        code: "sv",
        name: "Swedish",
        about_terms: &["om oss", "vår historia", "teamet", "vilka vi är"],
        founder_terms: &["grundare", "medgrundare", "ägare", "vd"],
        indicator_words: &["och", "att", "det", "med", "för", "vår", "din", "inte"],
    },
    LanguageProfile {
        code: "no",
        name: "Norwegian",
        about_terms: &["om oss", "vår historie", "teamet", "hvem vi er"],
        founder_terms: &["grunnlegger", "medgrunnlegger", "eier", "daglig leder"],
        indicator_words: &["og", "det", "med", "til", "vår", "din", "ikke", "hos"],
    },
    LanguageProfile {
        code: "fi",
        name: "Finnish",
        about_terms: &["meistä", "tietoa meistä", "tarinamme", "tiimi"],
        founder_terms: &["perustaja", "toimitusjohtaja", "omistaja"],
        indicator_words: &["ja", "on", "että", "meidän", "sinun", "kanssa", "ei"],
    },
];

/// True when the text matches any About/Team term in any supported
/// language.
pub fn is_about_term(text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    LANGUAGES.iter().any(|lang| {
        lang.about_terms
            .iter()
            .any(|term| contains_term(&needle, term))
    })
}

/// True when the text mentions a founder/leadership role in any language.
pub fn mentions_founder(text: &str) -> bool {
    let needle = text.to_lowercase();
    LANGUAGES.iter().any(|lang| {
        lang.founder_terms
            .iter()
            .any(|term| contains_term(&needle, term))
    })
}

/// Short terms ("om", "ceo") must match a whole word — substring matching
/// would catch "Home" or "ocean". Longer terms may appear anywhere.
fn contains_term(needle: &str, term: &str) -> bool {
    if term.len() <= 3 {
        needle
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == term)
    } else {
        needle.contains(term)
    }
}

/// Detect the dominant language of a body of text by indicator-word
/// frequency. Ties and empty input resolve to English.
pub fn detect_language(text: &str) -> &'static LanguageProfile {
    let mut best: &LanguageProfile = &LANGUAGES[0];
    let mut best_score = 0usize;

    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();

    for lang in LANGUAGES {
        let score = words
            .iter()
            .filter(|w| lang.indicator_words.contains(&w.as_str()))
            .count();
        if score > best_score {
            best_score = score;
            best = lang;
        }
    }

    best
}
