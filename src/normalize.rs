/// Tokens dropped from fuzzy keys: brand and product-category filler that
/// every listing carries and that says nothing about the model.
const NOISE_TOKENS: &[&str] = &["nvidia", "geforce", "graphics", "card", "video", "gpu"];

/// Key for exact variant lookup: trimmed, whitespace-collapsed, lowercased.
pub fn exact_key(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased alphanumeric tokens; every other character is a separator.
pub fn tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Token sequence padded with single spaces, so that whole-word containment
/// is a plain substring test: `" live gamer "` within `" avermedia live gamer 4k "`.
pub fn padded_tokens(s: &str) -> String {
    let joined = tokens(s).join(" ");
    format!(" {joined} ")
}

/// Key for fuzzy comparison: tokens without noise words, space-joined.
pub fn fuzzy_key(s: &str) -> String {
    tokens(s)
        .into_iter()
        .filter(|t| !NOISE_TOKENS.contains(&t.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Digit-bearing tokens that name a model (`3070`, `a6000`, `h100`), sorted
/// and deduplicated. Memory sizes such as `48gb`, `24g` or a bare `80` are
/// left out.
pub fn model_numbers(s: &str) -> Vec<String> {
    let mut numbers: Vec<String> = tokens(s)
        .into_iter()
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()) && !is_memory_size(t))
        .collect();
    numbers.sort();
    numbers.dedup();
    numbers
}

fn is_memory_size(token: &str) -> bool {
    let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let unit = &token[digits.len()..];
    !digits.is_empty()
        && digits.len() <= 3
        && digits.chars().all(|c| c.is_ascii_digit())
        && matches!(unit, "" | "g" | "gb" | "tb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_key() {
        assert_eq!(exact_key("  NVIDIA  GeForce\tRTX 4090 "), "nvidia geforce rtx 4090");
        assert_eq!(exact_key("   "), "");
    }

    #[test]
    fn test_tokens_split_on_punctuation() {
        assert_eq!(
            tokens("AMX NMX-WP-N1512 N1000"),
            vec!["amx", "nmx", "wp", "n1512", "n1000"]
        );
    }

    #[test]
    fn test_padded_tokens() {
        assert_eq!(padded_tokens("Live Gamer-A2"), " live gamer a2 ");
        assert_eq!(padded_tokens(""), "  ");
    }

    #[test]
    fn test_fuzzy_key_drops_noise() {
        assert_eq!(fuzzy_key("NVIDIA GeForce RTX 4090"), "rtx 4090");
        assert_eq!(fuzzy_key("RTX-A6000 (Graphics Card)"), "rtx a6000");
        assert_eq!(fuzzy_key("NVIDIA GPU"), "");
    }

    #[test]
    fn test_model_numbers_skip_memory_sizes() {
        assert_eq!(model_numbers("NVIDIA GeForce RTX 3070 Ti 8GB"), vec!["3070"]);
        assert_eq!(model_numbers("RTX A6000 48 GB"), vec!["a6000"]);
        assert_eq!(model_numbers("Tesla V100 SXM2 32G"), vec!["sxm2", "v100"]);
        assert_eq!(model_numbers("A100 80GB A100"), vec!["a100"]);
        assert!(model_numbers("Quadro graphics").is_empty());
    }
}
