//! Keyword auto-linking for HTML content.
//!
//! Each active rule links the first occurrence of its keyword, longest
//! keyword first, so "Fıstık Ezmesi" is linked before "Fıstık" is tried.
//!
//! The "not inside a tag" guard mirrors the lookaround pattern
//! `(?<!<[^>]*)keyword(?![^<]*>)`. It is a heuristic, not an HTML parser:
//! text inside an anchor inserted by an earlier rule is still eligible, so a
//! shorter keyword contained in a longer one can end up as a nested anchor.

use regex::{Regex, RegexBuilder};

use crate::models::KeywordRule;

/// CSS class put on every inserted anchor.
pub const AUTO_LINK_CLASS: &str = "seo-auto-link";

/// Link the first safe occurrence of every active keyword.
///
/// # Example
/// ```ignore
/// use ezme::{auto_link_content, KeywordRule};
///
/// let html = auto_link_content("Taze badem", &[KeywordRule::new("Badem", "/badem")]);
/// assert_eq!(html, r#"Taze <a href="/badem" class="seo-auto-link" title="badem">badem</a>"#);
/// ```
pub fn auto_link_content(content: &str, rules: &[KeywordRule]) -> String {
    auto_link_content_with_class(content, rules, AUTO_LINK_CLASS)
}

/// Same as [`auto_link_content`] with a custom anchor class.
pub fn auto_link_content_with_class(content: &str, rules: &[KeywordRule], class: &str) -> String {
    let mut active: Vec<&KeywordRule> = rules
        .iter()
        .filter(|r| r.active && !r.keyword.trim().is_empty())
        .collect();
    // Stable: equal lengths keep input order
    active.sort_by(|a, b| b.keyword.chars().count().cmp(&a.keyword.chars().count()));

    let mut html = content.to_string();
    for rule in active {
        let Ok(pattern) = RegexBuilder::new(&regex::escape(&rule.keyword))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };
        if let Some(linked) = link_first(&html, &pattern, &rule.url, class) {
            html = linked;
        }
    }
    html
}

fn link_first(html: &str, pattern: &Regex, url: &str, class: &str) -> Option<String> {
    let mut start = 0;
    while let Some(m) = pattern.find_at(html, start) {
        if is_outside_tag(html, m.start(), m.end()) {
            let matched = m.as_str();
            return Some(format!(
                r#"{}<a href="{}" class="{}" title="{}">{}</a>{}"#,
                &html[..m.start()],
                url,
                class,
                matched,
                matched,
                &html[m.end()..]
            ));
        }
        // Retry one character later, like a regex engine after a failed lookaround
        start = m.start() + html[m.start()..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// True unless the nearest bracket before the match is `<` or the nearest
/// bracket after it is `>`.
fn is_outside_tag(html: &str, start: usize, end: usize) -> bool {
    let bytes = html.as_bytes();
    let opened_before = html[..start]
        .rfind(['<', '>'])
        .is_some_and(|i| bytes[i] == b'<');
    let closed_after = html[end..]
        .find(['<', '>'])
        .is_some_and(|i| bytes[end + i] == b'>');
    !opened_before && !closed_after
}

/// Keyword table shipped with the storefront.
pub fn default_keyword_rules() -> Vec<KeywordRule> {
    [
        ("kw-sekersiz-fistik-ezmesi", "Şekersiz Fıstık Ezmesi", "/urun/sekersiz-fistik-ezmesi"),
        ("kw-fistik-ezmesi", "Fıstık Ezmesi", "/kategori/fistik-ezmesi"),
        ("kw-findik-ezmesi", "Fındık Ezmesi", "/kategori/findik-ezmesi"),
        ("kw-kakaolu-findik-kremasi", "Kakaolu Fındık Kreması", "/urun/kakaolu-findik-kremasi"),
        ("kw-kuruyemis", "Kuruyemiş", "/kategori/kuruyemis"),
        ("kw-cig-badem", "Çiğ Badem", "/urun/cig-badem"),
        ("kw-kavrulmus-findik", "Kavrulmuş Fındık", "/urun/kavrulmus-findik"),
        ("kw-hurmali", "Hurmalı", "/kategori/fistik-ezmesi?alt=hurmali"),
        ("kw-vegan", "Vegan", "/blog/vegan-beslenme"),
        ("kw-protein", "Protein", "/blog/bitkisel-protein-kaynaklari"),
    ]
    .into_iter()
    .map(|(id, keyword, url)| KeywordRule {
        id: id.to_string(),
        keyword: keyword.to_string(),
        url: url.to_string(),
        active: true,
    })
    .collect()
}
