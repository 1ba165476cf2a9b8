//! Keyword-based fast routing
//!
//! Scores the incoming message against each topic's lexicon and selects
//! every topic with a positive score — no LLM call, just substring scans,
//! so routing cost is negligible next to the agent work it schedules.
//! Matching is deliberately substring-based (not word-boundary): "semer"
//! inside "ressemer" still signals an agronomy question.

use tracing::debug;

use crate::types::Topic;

const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "meteo",
    "météo",
    "taw",
    "pluie",
    "rain",
    "temperature",
    "température",
    "vent",
    "wind",
    "forecast",
    "prévision",
    "irrigation",
    "arroser",
    "ndox",
    "nawet",
    "noor",
    "lolli",
    "sécheresse",
    "drought",
    "inondation",
    "flood",
    "chaleur",
    "heat",
    "humidité",
    "humidity",
    "soleil",
    "sun",
    "nuage",
    "cloud",
];

const AGRO_KEYWORDS: &[&str] = &[
    "plant",
    "planter",
    "semer",
    "sow",
    "crop",
    "culture",
    "récolte",
    "harvest",
    "maladie",
    "disease",
    "ravageur",
    "pest",
    "feuille",
    "leaf",
    "tache",
    "spot",
    "variété",
    "variety",
    "semence",
    "seed",
    "engrais",
    "fertilizer",
    "sol",
    "soil",
    "calendrier",
    "calendar",
    "gerte",
    "mil",
    "dugub",
    "riz",
    "malo",
    "mais",
    "maïs",
    "mbaxal",
    "niebe",
    "niébé",
    "tomate",
    "tamaate",
    "oignon",
    "soble",
    "mangue",
    "coton",
    "bey",
    "suuf",
    "diagnos",
    "traitement",
    "treatment",
    "rotation",
    "compost",
    "neem",
    "bio",
];

const MARKET_KEYWORDS: &[&str] = &[
    "prix",
    "price",
    "marché",
    "market",
    "vendre",
    "sell",
    "acheter",
    "buy",
    "fcfa",
    "cfa",
    "tendance",
    "trend",
    "cours",
    "njeg",
    "coût",
    "cost",
    "revenu",
    "revenue",
    "stockage",
    "storage",
    "transport",
    "bénéfice",
    "profit",
    "sandaga",
    "thiaroye",
];

fn lexicon(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Weather => WEATHER_KEYWORDS,
        Topic::Agro => AGRO_KEYWORDS,
        Topic::Market => MARKET_KEYWORDS,
    }
}

/// Fold the accented characters that occur in the lexicons so accent-stripped
/// SMS input still matches accented keywords written the other way around.
fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' => 'e',
            'à' => 'a',
            'ô' => 'o',
            other => other,
        })
        .collect()
}

/// Count how many of `topic`'s keywords occur in the message. A keyword
/// matching in both the raw and the accent-folded form still counts once.
pub fn topic_score(message: &str, topic: Topic) -> usize {
    let lower = message.to_lowercase();
    let folded = fold_accents(&lower);
    score(&lower, &folded, topic)
}

fn score(lower: &str, folded: &str, topic: Topic) -> usize {
    lexicon(topic)
        .iter()
        .filter(|kw| lower.contains(*kw) || folded.contains(*kw))
        .count()
}

/// Select every topic with a positive score, in fixed topic order so the
/// same message always yields the same decision. A message with no keyword
/// signal at all falls back to the agro agent alone — crop questions are the
/// most common intent when nothing else matches.
pub fn route(message: &str) -> Vec<Topic> {
    let lower = message.to_lowercase();
    let folded = fold_accents(&lower);

    let routed: Vec<Topic> = Topic::ALL
        .into_iter()
        .filter(|t| score(&lower, &folded, *t) > 0)
        .collect();

    if routed.is_empty() {
        debug!("No keyword signal, falling back to agro");
        return vec![Topic::Agro];
    }

    debug!("Routed to {:?} by keyword score", routed);
    routed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_is_deterministic() {
        let msg = "Quand planter le mil avant la pluie?";
        let first = route(msg);
        for _ in 0..5 {
            assert_eq!(route(msg), first);
        }
    }

    #[test]
    fn test_fallback_when_no_keywords() {
        assert_eq!(route("Bonjour, comment vas-tu ?"), vec![Topic::Agro]);
        assert_eq!(route(""), vec![Topic::Agro]);
    }

    #[test]
    fn test_fallback_only_when_all_scores_zero() {
        // One weather keyword is enough to suppress the fallback entirely.
        assert_eq!(route("pluie demain"), vec![Topic::Weather]);
    }

    #[test]
    fn test_keywords_can_overlap_topics() {
        // "soleil" carries the agro keyword "sol" as a substring, so a sunny
        // question legitimately wakes both agents.
        assert_eq!(route("il y a du soleil"), vec![Topic::Weather, Topic::Agro]);
    }

    #[test]
    fn test_multi_topic_triggering() {
        let routed = route("Quel prix pour planter du mil?");
        assert_eq!(routed, vec![Topic::Agro, Topic::Market]);
    }

    #[test]
    fn test_accent_folding_routes_identically() {
        assert_eq!(route("météo demain"), vec![Topic::Weather]);
        assert_eq!(route("meteo demain"), vec![Topic::Weather]);
        assert_eq!(route("température demain"), route("temperature demain"));
    }

    #[test]
    fn test_substring_matching_is_intentional() {
        // "semer" matches inside "ressemer"; no word boundaries.
        assert!(topic_score("faut-il ressemer ce champ", Topic::Agro) > 0);
    }

    #[test]
    fn test_keyword_counts_once_across_both_forms() {
        // "météo" matches the accented keyword directly and "meteo" via the
        // folded text; each keyword still contributes at most 1.
        let accented = topic_score("météo", Topic::Weather);
        assert_eq!(accented, 2); // keywords "meteo" and "météo"
        assert_eq!(topic_score("meteo", Topic::Weather), 1);
    }

    #[test]
    fn test_wolof_keywords_route() {
        assert_eq!(route("taw bi dina ñëw?"), vec![Topic::Weather]);
        assert_eq!(route("njeg dugub"), vec![Topic::Agro, Topic::Market]);
    }

    #[test]
    fn test_peanut_price_question_routes_to_market_only() {
        let routed = route("Quel est le prix de l'arachide à Kaolack?");
        assert_eq!(routed, vec![Topic::Market]);
    }

    #[test]
    fn test_sms_command_bodies_route() {
        // SMS bodies are routed as-is; the command word itself is the signal.
        assert_eq!(route("METEO kaolack"), vec![Topic::Weather]);
        assert_eq!(route("NJEG mangue"), vec![Topic::Agro, Topic::Market]);
        assert_eq!(route("NDIMBAL"), vec![Topic::Agro]);
    }
}
