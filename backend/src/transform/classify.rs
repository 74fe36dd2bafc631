//! Heuristic field derivation for imported products.
//!
//! Category and subcategory are ordered cascades of substring checks kept as
//! data tables: the first matching rule wins, so table order is priority.
//! Both ASCII (handle) and Turkish (title) spellings are checked.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Category, DietaryFlags, Subcategory};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9-]+").expect("valid slug regex"));
static HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid hyphen regex"));

/// One step of a classification cascade.
struct Rule<F, T> {
    matches: F,
    result: T,
}

type NameCheck = fn(&str, &str) -> bool;
type TextCheck = fn(&str) -> bool;

// =============================================================================
// Category
// =============================================================================

const CATEGORY_RULES: &[Rule<NameCheck, Category>] = &[
    Rule { matches: is_hazelnut_spread, result: Category::FindikEzmesi },
    Rule { matches: is_peanut_butter, result: Category::FistikEzmesi },
    Rule { matches: is_raw_nut, result: Category::Kuruyemis },
];

fn is_hazelnut_spread(handle: &str, title: &str) -> bool {
    handle.contains("findik-kremasi")
        || handle.contains("findik-ezmesi")
        || handle.contains("kakaolu-findik")
        || title.contains("fındık kreması")
        || title.contains("fındık ezmesi")
        || title.contains("kakaolu fındık")
        || title.contains("findik ezmesi")
}

fn is_peanut_butter(handle: &str, _title: &str) -> bool {
    handle.contains("fistik-ezmesi")
}

fn is_raw_nut(handle: &str, title: &str) -> bool {
    handle.starts_with("cig-")
        || handle.starts_with("çiğ-")
        || handle.starts_with("kavrulmus-")
        || handle.starts_with("kavrulmuş-")
        || handle.contains("yer-fistigi")
        || handle.contains("yer-fıstığı")
        || handle.contains("badem")
        || handle.contains("ceviz")
        || title.contains("kuruyemiş")
        || title.contains("kuruyemis")
        || (handle.contains("500g") && !handle.contains("ezmesi"))
}

/// Classify a product into one of the three catalog categories.
///
/// Falls back to [`Category::FistikEzmesi`] when nothing matches.
pub fn determine_category(handle: &str, title: &str) -> Category {
    let handle = handle.to_lowercase();
    let title = title.to_lowercase();

    CATEGORY_RULES
        .iter()
        .find(|rule| (rule.matches)(&handle, &title))
        .map(|rule| rule.result)
        .unwrap_or(Category::FistikEzmesi)
}

// =============================================================================
// Subcategory
// =============================================================================

const SUBCATEGORY_RULES: &[Rule<TextCheck, Subcategory>] = &[
    Rule { matches: is_sugar_free, result: Subcategory::Sekersiz },
    Rule { matches: is_with_dates, result: Subcategory::Hurmali },
    Rule { matches: is_with_honey, result: Subcategory::Balli },
    Rule { matches: is_classic, result: Subcategory::Klasik },
    Rule { matches: is_with_milk, result: Subcategory::Sutlu },
    Rule { matches: is_with_cocoa, result: Subcategory::Kakaolu },
    Rule { matches: is_raw, result: Subcategory::Cig },
    Rule { matches: is_roasted, result: Subcategory::Kavrulmus },
];

fn is_sugar_free(text: &str) -> bool {
    text.contains("şekersiz") || text.contains("sekersiz")
}

fn is_with_dates(text: &str) -> bool {
    text.contains("hurmalı") || text.contains("hurmali")
}

fn is_with_honey(text: &str) -> bool {
    text.contains("ballı") || text.contains("balli")
}

fn is_classic(text: &str) -> bool {
    text.contains("klasik")
}

fn is_with_milk(text: &str) -> bool {
    text.contains("sütlü") || text.contains("sutlu")
}

fn is_with_cocoa(text: &str) -> bool {
    text.contains("kakaolu")
}

fn is_raw(text: &str) -> bool {
    text.contains("çiğ") || text.starts_with("cig-") || text.contains("-cig-")
}

fn is_roasted(text: &str) -> bool {
    text.contains("kavrulmuş") || text.contains("kavrulmus")
}

/// Classify a product into a subcategory, defaulting to [`Subcategory::Klasik`].
pub fn determine_subcategory(handle: &str, title: &str) -> Subcategory {
    let text = format!("{} {}", handle, title).to_lowercase();

    SUBCATEGORY_RULES
        .iter()
        .find(|rule| (rule.matches)(&text))
        .map(|rule| rule.result)
        .unwrap_or(Subcategory::Klasik)
}

// =============================================================================
// Dietary flags and tags
// =============================================================================

/// Parse the free-text dietary preferences column.
pub fn parse_dietary_preferences(text: &str) -> DietaryFlags {
    let text = text.to_lowercase();
    DietaryFlags {
        vegan: text.contains("vegan"),
        gluten_free: text.contains("gluten-free") || text.contains("glutensiz"),
        sugar_free: text.contains("no-artificial-sweeteners") || text.contains("sekersiz"),
        high_protein: text.contains("high-protein"),
    }
}

const DIETARY_TAGS: &[(&[&str], &str)] = &[
    (&["vegan"], "vegan"),
    (&["gluten-free", "glutensiz"], "glutensiz"),
    (&["keto"], "keto"),
    (&["high-protein", "yüksek protein"], "yüksek protein"),
    (&["halal", "helal"], "helal"),
    (&["dairy-free", "süt içermez"], "süt içermez"),
];

const ALWAYS_TAGS: &[&str] = &["doğal", "katkısız"];

/// Build the tag list for a product, deduplicated in first-occurrence order.
pub fn generate_tags(title: &str, dietary: &str, category: Category) -> Vec<String> {
    let dietary = dietary.to_lowercase();
    let title = title.to_lowercase();
    let mut tags: Vec<&str> = Vec::new();

    for (needles, tag) in DIETARY_TAGS {
        if needles.iter().any(|n| dietary.contains(n)) {
            tags.push(*tag);
        }
    }

    match category {
        Category::Kuruyemis => {
            tags.push("kuruyemiş");
            if title.contains("çiğ") {
                tags.push("çiğ");
            }
            if title.contains("kavrulmuş") {
                tags.push("kavrulmuş");
            }
        }
        Category::FistikEzmesi => tags.push("fıstık ezmesi"),
        Category::FindikEzmesi => tags.push("fındık ezmesi"),
    }

    tags.extend_from_slice(ALWAYS_TAGS);

    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.iter().any(|t| t == tag) {
            unique.push(tag.to_string());
        }
    }
    unique
}

// =============================================================================
// Text helpers
// =============================================================================

/// Turn a handle into a URL slug.
///
/// Turkish letters are transliterated before lowercasing so that `İ` never
/// becomes a dotted `i̇`. Distinct handles may collide; nothing detects it.
pub fn generate_slug(handle: &str) -> String {
    let transliterated: String = handle
        .chars()
        .map(|c| match c {
            'İ' | 'ı' => 'i',
            'Ğ' | 'ğ' => 'g',
            'Ü' | 'ü' => 'u',
            'Ş' | 'ş' => 's',
            'Ö' | 'ö' => 'o',
            'Ç' | 'ç' => 'c',
            c => c,
        })
        .collect();

    let lowered = transliterated.to_lowercase();
    let dashed = NON_SLUG.replace_all(&lowered, "-");
    let collapsed = HYPHENS.replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}

/// Strip tags and a fixed set of entities from an HTML fragment.
///
/// Not an HTML parser: entities outside the fixed list pass through.
pub fn strip_html(html: &str) -> String {
    let text = HTML_TAG.replace_all(html, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Keep the first `limit` characters and append "..." when the text is longer.
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let head: String = text.chars().take(limit).collect();
    format!("{}...", head)
}

/// Keep at most `limit` characters.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazelnut_checked_before_peanut() {
        assert_eq!(determine_category("findik-ezmesi-kakaolu", ""), Category::FindikEzmesi);
        assert_eq!(determine_category("kakaolu-findik-kremasi", "Kakaolu Fındık Kreması"), Category::FindikEzmesi);
        assert_eq!(determine_category("ozel-urun", "Fındık Ezmesi 300g"), Category::FindikEzmesi);
    }

    #[test]
    fn test_peanut_butter_before_raw_nut() {
        // "badem" would match the raw nut rule, peanut butter runs first
        assert_eq!(determine_category("bademli-fistik-ezmesi", ""), Category::FistikEzmesi);
    }

    #[test]
    fn test_raw_nut_patterns() {
        assert_eq!(determine_category("cig-badem", "Çiğ Badem"), Category::Kuruyemis);
        assert_eq!(determine_category("kavrulmus-findik", ""), Category::Kuruyemis);
        assert_eq!(determine_category("yer-fistigi-1kg", ""), Category::Kuruyemis);
        assert_eq!(determine_category("ceviz-ici", ""), Category::Kuruyemis);
        assert_eq!(determine_category("karisik", "Karışık Kuruyemiş"), Category::Kuruyemis);
        assert_eq!(determine_category("antep-500g", ""), Category::Kuruyemis);
    }

    #[test]
    fn test_raw_nut_turkish_handles() {
        assert_eq!(determine_category("çiğ-kaju", "Çiğ Kaju"), Category::Kuruyemis);
        assert_eq!(determine_category("kavrulmuş-fındık", "Kavrulmuş Fındık"), Category::Kuruyemis);
        assert_eq!(determine_category("yer-fıstığı-1kg", "Yer Fıstığı"), Category::Kuruyemis);
        assert_eq!(determine_category("Kavrulmuş-Fındık", ""), Category::Kuruyemis);
    }

    #[test]
    fn test_500g_spread_is_not_raw_nut() {
        assert_eq!(determine_category("ezmesi-500g", ""), Category::FistikEzmesi);
    }

    #[test]
    fn test_category_fallback() {
        assert_eq!(determine_category("protein-bar", "Protein Bar"), Category::FistikEzmesi);
    }

    #[test]
    fn test_subcategory_cascade_order() {
        assert_eq!(determine_subcategory("sekersiz-fistik-ezmesi", ""), Subcategory::Sekersiz);
        // şekersiz outranks kakaolu
        assert_eq!(determine_subcategory("kakaolu-ezme", "Şekersiz Kakaolu Ezme"), Subcategory::Sekersiz);
        assert_eq!(determine_subcategory("hurmali-ezme", ""), Subcategory::Hurmali);
        assert_eq!(determine_subcategory("x", "Ballı Fıstık Ezmesi"), Subcategory::Balli);
        assert_eq!(determine_subcategory("sutlu-findik", ""), Subcategory::Sutlu);
        assert_eq!(determine_subcategory("kakaolu-findik-kremasi", ""), Subcategory::Kakaolu);
        assert_eq!(determine_subcategory("cig-badem", ""), Subcategory::Cig);
        assert_eq!(determine_subcategory("x", "Çiğ Kaju"), Subcategory::Cig);
        assert_eq!(determine_subcategory("kavrulmus-findik", ""), Subcategory::Kavrulmus);
        assert_eq!(determine_subcategory("fistik-ezmesi", "Fıstık Ezmesi"), Subcategory::Klasik);
    }

    #[test]
    fn test_dietary_flags_independent() {
        let flags = parse_dietary_preferences("Vegan, Gluten-Free, No-Artificial-Sweeteners, High-Protein");
        assert!(flags.vegan && flags.gluten_free && flags.sugar_free && flags.high_protein);

        let flags = parse_dietary_preferences("glutensiz; sekersiz");
        assert!(!flags.vegan);
        assert!(flags.gluten_free);
        assert!(flags.sugar_free);
        assert!(!flags.high_protein);

        // Turkish-letter spellings are not markers
        let flags = parse_dietary_preferences("şekersiz, yüksek protein");
        assert!(!flags.sugar_free);
        assert!(!flags.high_protein);

        assert_eq!(parse_dietary_preferences(""), DietaryFlags::default());
    }

    #[test]
    fn test_generate_tags() {
        let tags = generate_tags("Çiğ Badem", "vegan, glutensiz, gluten-free, helal", Category::Kuruyemis);
        assert_eq!(
            tags,
            vec!["vegan", "glutensiz", "helal", "kuruyemiş", "çiğ", "doğal", "katkısız"]
        );

        let tags = generate_tags("Fıstık Ezmesi", "", Category::FistikEzmesi);
        assert_eq!(tags, vec!["fıstık ezmesi", "doğal", "katkısız"]);

        let tags = generate_tags("", "keto, high-protein, dairy-free", Category::FindikEzmesi);
        assert_eq!(
            tags,
            vec!["keto", "yüksek protein", "süt içermez", "fındık ezmesi", "doğal", "katkısız"]
        );
    }

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Şekersiz Fıstık Ezmesi!!"), "sekersiz-fistik-ezmesi");
        assert_eq!(generate_slug("İÇ Ceviz"), "ic-ceviz");
        assert_eq!(generate_slug("--Çiğ   Badem 500g--"), "cig-badem-500g");
        assert_eq!(generate_slug("a - b"), "a-b");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Merhaba&nbsp;<b>dünya</b></p>"), "Merhaba dünya");
        assert_eq!(strip_html("Tom &amp; Jerry &lt;3 &quot;x&quot; &#39;y&#39;"), "Tom & Jerry <3 \"x\" 'y'");
        assert_eq!(strip_html("<p>a</p><p>b</p>"), "ab");
        assert_eq!(strip_html("Fıs<b>tık</b> ezmesi"), "Fıstık ezmesi");
        assert_eq!(strip_html("<p>Çiğ</p>\n<p>badem</p>"), "Çiğ badem");
        // Unknown entities pass through
        assert_eq!(strip_html("&copy; 2024"), "&copy; 2024");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_with_ellipsis("şşşş", 4), "şşşş");
        assert_eq!(truncate_with_ellipsis("şşşşş", 4), "şşşş...");
        assert_eq!(truncate_chars("çğü", 2), "çğ");
    }
}
