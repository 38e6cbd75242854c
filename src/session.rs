//! Session ids
//!
//! Short readable ids such as `misty_brook_3fa1` that name a run and its
//! log file.

use rand::seq::IndexedRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "autumn", "hidden", "bitter", "misty", "silent", "empty", "dry", "dark", "summer", "icy",
    "delicate", "quiet", "white", "cool", "spring", "winter", "patient", "twilight", "dawn",
    "crimson", "wispy", "weathered", "blue", "billowing", "broken", "cold", "damp", "falling",
    "frosty", "green", "long", "late", "lingering",
];

const NOUNS: &[&str] = &[
    "waterfall", "river", "breeze", "moon", "rain", "wind", "sea", "morning", "snow", "lake",
    "sunset", "pine", "shadow", "leaf", "dawn", "glitter", "forest", "hill", "cloud", "meadow",
    "sun", "glade", "bird", "brook", "butterfly", "bush", "dew", "dust", "field", "fire",
    "flower", "firefly", "feather", "grass",
];

/// Generate a new `adjective_noun_hhhh` session id
pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("quiet");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("brook");
    let suffix: u16 = rng.random();

    format!("{}_{}_{:04x}", adjective, noun, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_shape() {
        for _ in 0..50 {
            let id = generate_session_id();
            let parts: Vec<&str> = id.split('_').collect();

            assert_eq!(parts.len(), 3, "unexpected id {}", id);
            assert!(ADJECTIVES.contains(&parts[0]));
            assert!(NOUNS.contains(&parts[1]));
            assert_eq!(parts[2].len(), 4);
            assert!(parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_session_ids_vary() {
        let ids: std::collections::HashSet<String> =
            (0..20).map(|_| generate_session_id()).collect();
        assert!(ids.len() > 1);
    }
}
