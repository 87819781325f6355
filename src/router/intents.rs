// ABOUTME: Intent pattern tables — case-insensitive literal fragment disjunctions.
// ABOUTME: A prompt matches a category when any fragment occurs in its lowercased text.

/// Phrases that start the guessing duel.
const DUEL_FRAGMENTS: &[&str] = &[
    "duel boshla",
    "o'yin boshla",
    "duel o'ynaymiz",
    "kimligimni top",
];

/// Phrases asking for comparative analysis against world literature.
const PARALLEL_FRAGMENTS: &[&str] = &[
    "parallel",
    "o'xshashlik",
    "qiyos",
    "solishtir",
    "jahon adabiyoti",
    "farqi",
];

/// Phrases requesting illustrative imagery.
const IMAGE_GEN_FRAGMENTS: &[&str] = &[
    "chizib ber",
    "tasvirlab ber",
    "vizual",
    "rasmini yarat",
    "image",
    "draw",
];

/// Phrases about places, addresses, and distances.
const LOCATION_FRAGMENTS: &[&str] = &[
    "joylashuv", "manzil", "qayerda", "restoran", "kafe", "muzey", "xarita", "masofa",
];

/// Phrases about current events and time-sensitive facts.
const NEWS_FRAGMENTS: &[&str] = &[
    "yangilik", "bugun", "kecha", "oxirgi", "prezident", "narx", "ob-havo",
];

fn matches_any(prompt: &str, fragments: &[&str]) -> bool {
    let lowered = prompt.to_lowercase();
    fragments.iter().any(|f| lowered.contains(f))
}

pub fn is_duel_intent(prompt: &str) -> bool {
    matches_any(prompt, DUEL_FRAGMENTS)
}

pub fn is_parallel_intent(prompt: &str) -> bool {
    matches_any(prompt, PARALLEL_FRAGMENTS)
}

pub fn is_image_gen_intent(prompt: &str) -> bool {
    matches_any(prompt, IMAGE_GEN_FRAGMENTS)
}

pub fn is_location_query(prompt: &str) -> bool {
    matches_any(prompt, LOCATION_FRAGMENTS)
}

pub fn is_news_query(prompt: &str) -> bool {
    matches_any(prompt, NEWS_FRAGMENTS)
}
