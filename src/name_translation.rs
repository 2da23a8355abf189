use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    // Display names used on the old blog -> account ids on the new one
    static ref AUTHOR_IDS: HashMap<&'static str, &'static str> = HashMap::from([
        ("社長", "norikazum"),
        ("kenzauros", "kenzauros"),
        ("きよしん", "kiyoshin"),
        ("じんない", "jinna-i"),
        ("こっしー", "kosshii"),
        ("ふっくん", "hiroki-Fukumoto"),
        ("k-so16", "k-so16"),
        ("じゅんじゅん", "junya-gera"),
        ("IwamotoKohei", "kohei-iwamoto-wa"),
        ("link", "linkohta"),
    ]);
}

/// Maps an author display name to its account id. Unknown names give an
/// empty string.
pub fn translate_name(display_name: &str) -> &'static str {
    AUTHOR_IDS.get(display_name).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        assert_eq!(translate_name("kenzauros"), "kenzauros");
        assert_eq!(translate_name("社長"), "norikazum");
        assert_eq!(translate_name("じんない"), "jinna-i");
        assert_eq!(translate_name("link"), "linkohta");
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(translate_name("somebody"), "");
        assert_eq!(translate_name(""), "");
        assert_eq!(translate_name("Kenzauros"), "");
    }
}
