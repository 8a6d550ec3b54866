use swipecast_protocol::item::{ContentItem, ContentKind};

pub const MAX_NAME_WORDS: usize = 3;
pub const MAX_SYMBOL_CHARS: usize = 6;
const MIN_MEANINGFUL_WORD_CHARS: usize = 4;

/// Filler words dropped from captions before name derivation. Short words
/// are already dropped by the length filter, so this only lists the longer
/// ones.
const STOPWORDS: &[&str] = &[
    "about", "after", "also", "been", "before", "being", "could", "from", "have", "into", "just",
    "like", "only", "some", "that", "their", "them", "then", "there", "these", "they", "this",
    "very", "were", "what", "when", "where", "which", "will", "with", "would", "your",
];

/// Name, symbol, and description derived from one item, ready for the coin
/// metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinProfile {
    pub name: String,
    pub symbol: String,
    pub description: String,
}

/// Derives the coin profile from the item's caption: name is the first
/// three meaningful words title-cased, symbol their initials. When the
/// caption is empty or nothing survives the filter, kind-based defaults
/// apply.
pub fn derive_coin_profile(item: &ContentItem) -> CoinProfile {
    let words = meaningful_words(&item.caption);
    if words.is_empty() {
        return fallback_profile(item.kind);
    }

    let name = words
        .iter()
        .take(MAX_NAME_WORDS)
        .map(|word| title_case(word))
        .collect::<Vec<_>>()
        .join(" ");
    let symbol: String = words
        .iter()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(MAX_SYMBOL_CHARS)
        .collect();

    CoinProfile {
        name,
        symbol,
        description: item.caption.clone(),
    }
}

fn meaningful_words(caption: &str) -> Vec<String> {
    caption
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().count() >= MIN_MEANINGFUL_WORD_CHARS)
        .filter(|word| !STOPWORDS.contains(&word.to_lowercase().as_str()))
        .map(str::to_owned)
        .collect()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn fallback_profile(kind: ContentKind) -> CoinProfile {
    let (name, symbol) = match kind {
        ContentKind::Post => ("Instagram Post", "POST"),
        ContentKind::Reel => ("Instagram Reel", "REEL"),
        ContentKind::Story => ("Instagram Story", "STORY"),
    };
    CoinProfile {
        name: name.to_owned(),
        symbol: symbol.to_owned(),
        description: format!("A coin minted from an Instagram {}.", kind.label()),
    }
}

#[cfg(test)]
mod tests {
    use swipecast_protocol::ids::ItemId;
    use swipecast_protocol::item::{ContentItem, ContentKind};

    use super::derive_coin_profile;

    fn item(kind: ContentKind, caption: &str) -> ContentItem {
        ContentItem {
            id: ItemId::new("item-1"),
            kind,
            code: None,
            thumbnail_url: Some("https://cdn.example/thumb.jpg".to_owned()),
            media_url: None,
            caption: caption.to_owned(),
            engagement: None,
            taken_at: Some(100),
        }
    }

    #[test]
    fn caption_drives_name_symbol_and_description() {
        let profile = derive_coin_profile(&item(ContentKind::Post, "Sunset over the old pier"));
        assert_eq!(profile.name, "Sunset Over Pier");
        assert_eq!(profile.symbol, "SOP");
        assert_eq!(profile.description, "Sunset over the old pier");
    }

    #[test]
    fn name_takes_at_most_three_words_and_symbol_at_most_six_initials() {
        let profile = derive_coin_profile(&item(
            ContentKind::Post,
            "golden hour colors across seven distant mountain ridges tonight",
        ));
        assert_eq!(profile.name, "Golden Hour Colors");
        assert_eq!(profile.symbol, "GHCASD");
    }

    #[test]
    fn punctuation_is_stripped_before_filtering() {
        let profile = derive_coin_profile(&item(ContentKind::Post, "Wow!!! \"Sunset\" #vibes..."));
        assert_eq!(profile.name, "Sunset Vibes");
        assert_eq!(profile.symbol, "SV");
    }

    #[test]
    fn shouting_captions_are_title_cased() {
        let profile = derive_coin_profile(&item(ContentKind::Post, "SUNSET OVER PIER"));
        assert_eq!(profile.name, "Sunset Over Pier");
    }

    #[test]
    fn empty_caption_falls_back_to_kind_defaults() {
        let profile = derive_coin_profile(&item(ContentKind::Reel, ""));
        assert_eq!(profile.name, "Instagram Reel");
        assert_eq!(profile.symbol, "REEL");
        assert_eq!(profile.description, "A coin minted from an Instagram reel.");
    }

    #[test]
    fn caption_with_only_filler_falls_back_too() {
        let profile = derive_coin_profile(&item(ContentKind::Story, "it is... so :)"));
        assert_eq!(profile.name, "Instagram Story");
        assert_eq!(profile.symbol, "STORY");
    }
}
