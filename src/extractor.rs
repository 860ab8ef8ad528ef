//! Heuristic article extraction from arbitrary news HTML.
//!
//! News sites share no markup standard, so every field is found by walking an
//! ordered list of selectors and taking the first one that yields something.
//! The body goes through three tiers, each only consulted when the previous
//! one came up short:
//!
//! 1. **Container**: the first known article container whose text (minus
//!    navigation, ads and other chrome) is long enough.
//! 2. **Paragraphs**: every substantial `<p>` in the page, joined in order.
//! 3. **Body**: the whole `<body>` text minus chrome, as a last resort.
//!
//! All returned strings are passed through [`normalize_text`].

use crate::utils::{char_len, normalize_text};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;

/// Container text must be longer than this to be accepted as the body.
pub const CONTAINER_MIN_CHARS: usize = 300;
/// Joined paragraph text shorter than this falls through to the body tier.
pub const PARAGRAPHS_MIN_CHARS: usize = 200;
/// A paragraph must be longer than this (trimmed) to count as prose.
pub const PARAGRAPH_MIN_CHARS: usize = 50;

/// Article containers, most specific first.
const CONTAINER_SELECTORS: &[&str] = &[
    "article",
    r#"[class*="article-body"]"#,
    r#"[class*="story-body"]"#,
    r#"[class*="post-content"]"#,
    r#"[class*="entry-content"]"#,
    r#"[class*="article-content"]"#,
    r#"[class*="content-body"]"#,
    r#"[data-testid*="article-body"]"#,
    r#"[class*="article"]"#,
    r#"[class*="content"]"#,
    r#"[class*="story"]"#,
    r#"[class*="post"]"#,
    "main",
    r#"[role="main"]"#,
];

/// Page chrome that never belongs to an article body.
const NOISE_SELECTOR: &str = "nav, footer, header, .nav, .footer, .header, .sidebar, .menu, \
     .advertisement, .ad, .social-share, .related-articles, .comments, script, style, noscript";

/// How a metadata probe reads its matches.
#[derive(Debug, Clone, Copy)]
enum Pick {
    /// Text of the first match.
    First,
    /// Concatenated text of every match.
    All,
    /// Attribute of the first match.
    Attr(&'static str),
}

const TITLE_PROBES: &[(&str, Pick)] = &[
    ("h1", Pick::First),
    ("title", Pick::First),
    (r#"[class*="title"]"#, Pick::First),
    (r#"[class*="headline"]"#, Pick::First),
    (r#"[data-testid*="headline"]"#, Pick::All),
    (".headline", Pick::First),
];

const DATE_PROBES: &[(&str, Pick)] = &[
    ("time", Pick::Attr("datetime")),
    (r#"[class*="date"]"#, Pick::First),
    (r#"[class*="published"]"#, Pick::First),
    (r#"[data-testid*="date"]"#, Pick::All),
];

const AUTHOR_PROBES: &[(&str, Pick)] = &[
    (r#"[class*="author"]"#, Pick::First),
    (r#"[rel="author"]"#, Pick::All),
    (r#"[data-testid*="author"]"#, Pick::All),
    (".byline", Pick::All),
];

fn compile(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

fn compile_probes(probes: &[(&str, Pick)]) -> Vec<(Selector, Pick)> {
    probes.iter().map(|(s, pick)| (compile(s), *pick)).collect()
}

static CONTAINERS: Lazy<Vec<Selector>> =
    Lazy::new(|| CONTAINER_SELECTORS.iter().map(|s| compile(s)).collect());
static NOISE: Lazy<Selector> = Lazy::new(|| compile(NOISE_SELECTOR));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| compile("p"));
static BODY: Lazy<Selector> = Lazy::new(|| compile("body"));
static TITLE: Lazy<Vec<(Selector, Pick)>> = Lazy::new(|| compile_probes(TITLE_PROBES));
static DATE: Lazy<Vec<(Selector, Pick)>> = Lazy::new(|| compile_probes(DATE_PROBES));
static AUTHOR: Lazy<Vec<(Selector, Pick)>> = Lazy::new(|| compile_probes(AUTHOR_PROBES));

/// Which tier produced the body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Container,
    Paragraphs,
    Body,
}

/// Fields pulled out of one page. Any of them may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub content: String,
    pub publish_date: String,
    pub author: String,
    pub tier: Tier,
}

/// Parse `html` and run [`extract`] on it.
pub fn extract_from_html(html: &str) -> Extracted {
    extract(&Html::parse_document(html))
}

/// Locate title, body, publish date and author in a parsed page.
pub fn extract(document: &Html) -> Extracted {
    let (content, tier) = extract_body(document);
    Extracted {
        title: first_match(document, &TITLE),
        content,
        publish_date: first_match(document, &DATE),
        author: first_match(document, &AUTHOR),
        tier,
    }
}

fn extract_body(document: &Html) -> (String, Tier) {
    for selector in CONTAINERS.iter() {
        if let Some(text) = container_text(document, selector) {
            if char_len(&text) > CONTAINER_MIN_CHARS {
                return (text, Tier::Container);
            }
        }
    }

    let paragraphs = paragraph_text(document);
    if char_len(&paragraphs) >= PARAGRAPHS_MIN_CHARS {
        return (paragraphs, Tier::Paragraphs);
    }

    (body_text(document), Tier::Body)
}

/// Text of every outermost match of `selector` outside page chrome, or
/// `None` if nothing matched.
fn container_text(document: &Html, selector: &Selector) -> Option<String> {
    let matches: Vec<ElementRef<'_>> = document
        .select(selector)
        .filter(|el| !inside_noise(el))
        .collect();
    if matches.is_empty() {
        return None;
    }

    // Loose selectors like [class*="article"] hit wrappers and their children
    let ids: HashSet<_> = matches.iter().map(|el| el.id()).collect();
    let mut raw = String::new();
    for el in matches
        .iter()
        .filter(|el| !el.ancestors().any(|a| ids.contains(&a.id())))
    {
        push_visible_text(*el, &mut raw);
    }
    Some(normalize_text(&raw))
}

fn paragraph_text(document: &Html) -> String {
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH)
        .filter(|p| !inside_noise(p))
        .map(visible_text)
        .filter(|text| char_len(text.trim()) > PARAGRAPH_MIN_CHARS)
        .collect();
    normalize_text(&paragraphs.join(" "))
}

fn body_text(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());
    normalize_text(&visible_text(root))
}

fn inside_noise(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| NOISE.matches(&ancestor))
}

fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible_text(element, &mut out);
    out
}

/// Append the text under `element`, skipping descendant chrome subtrees.
/// The element itself is never skipped.
fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if !NOISE.matches(&child) {
                        push_visible_text(child, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn first_match(document: &Html, probes: &[(Selector, Pick)]) -> String {
    probes
        .iter()
        .map(|(selector, pick)| probe(document, selector, *pick))
        .find(|text| !text.trim().is_empty())
        .map(|text| normalize_text(&text))
        .unwrap_or_default()
}

fn probe(document: &Html, selector: &Selector, pick: Pick) -> String {
    match pick {
        Pick::First => document
            .select(selector)
            .next()
            .map(|el| el.text().collect())
            .unwrap_or_default(),
        Pick::All => document.select(selector).flat_map(|el| el.text()).collect(),
        Pick::Attr(name) => document
            .select(selector)
            .next()
            .and_then(|el| el.value().attr(name))
            .unwrap_or_default()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_A: &str = "The city council voted on Tuesday to approve a new transit plan that expands bus service across the northern districts.";
    const LONG_B: &str = "Officials said the expansion would be funded through a combination of state grants and a modest increase in parking fees.";
    const LONG_C: &str = "Residents who spoke at the meeting were largely supportive, though several raised concerns about construction noise downtown.";

    #[test]
    fn test_article_container_wins_and_strips_chrome() {
        let html = format!(
            r#"<html><head><title>Transit plan | City Paper</title></head><body>
            <nav>Home Sports Weather</nav>
            <article>
              <header><h1>Council approves transit plan</h1></header>
              <p>{LONG_A}</p>
              <div class="ad">Buy one get one free</div>
              <p>{LONG_B}</p>
              <div class="social-share">Share on social</div>
              <p>{LONG_C}</p>
              <footer>Copyright City Paper</footer>
            </article>
            <div class="comments"><p>{LONG_A} (quoted by a commenter at length)</p></div>
            </body></html>"#
        );

        let extracted = extract_from_html(&html);
        assert_eq!(extracted.tier, Tier::Container);
        assert_eq!(extracted.content, format!("{LONG_A} {LONG_B} {LONG_C}"));
        assert!(!extracted.content.contains("Buy one"));
        assert!(!extracted.content.contains("Share on"));
        assert!(!extracted.content.contains("Copyright"));
        assert_eq!(extracted.title, "Council approves transit plan");
    }

    #[test]
    fn test_paragraph_tier_joins_long_paragraphs_in_order() {
        let html = format!(
            r#"<html><body>
            <div><p>{LONG_A}</p></div>
            <p>Too short to count.</p>
            <div><div><p>
                {LONG_B}
            </p></div></div>
            <footer><p>{LONG_C} This one sits in the footer.</p></footer>
            <p>{LONG_C}</p>
            </body></html>"#
        );

        let extracted = extract_from_html(&html);
        assert_eq!(extracted.tier, Tier::Paragraphs);
        assert_eq!(extracted.content, format!("{LONG_A} {LONG_B} {LONG_C}"));
    }

    #[test]
    fn test_short_container_falls_through_to_paragraphs() {
        let html = format!(
            r#"<html><body>
            <article><p>Short teaser only.</p></article>
            <section><p>{LONG_A}</p><p>{LONG_B}</p></section>
            </body></html>"#
        );

        let extracted = extract_from_html(&html);
        assert_eq!(extracted.tier, Tier::Paragraphs);
        assert_eq!(extracted.content, format!("{LONG_A} {LONG_B}"));
    }

    #[test]
    fn test_body_tier_is_last_resort() {
        let html = r#"<html><body>
            <nav>Home News</nav>
            <div>Short line one.</div>
            <div>Another short line.</div>
            <script>var tracking = true;</script>
            <style>body { color: red; }</style>
            </body></html>"#;

        let extracted = extract_from_html(html);
        assert_eq!(extracted.tier, Tier::Body);
        assert_eq!(extracted.content, "Short line one. Another short line.");
    }

    #[test]
    fn test_nested_container_matches_are_not_duplicated() {
        let html = format!(
            r#"<html><body>
            <div class="article-body">
              <div class="article-body-inner"><p>{LONG_A}</p><p>{LONG_B}</p><p>{LONG_C}</p></div>
            </div>
            </body></html>"#
        );

        let extracted = extract_from_html(&html);
        assert_eq!(extracted.tier, Tier::Container);
        assert_eq!(extracted.content, format!("{LONG_A}{LONG_B}{LONG_C}"));
    }

    #[test]
    fn test_container_inside_chrome_is_ignored() {
        let html = format!(
            r#"<html><body>
            <footer><div class="story-body">{LONG_A} {LONG_B} {LONG_C}</div></footer>
            <main><p>{LONG_C}</p><p>{LONG_B}</p><p>{LONG_A}</p></main>
            </body></html>"#
        );

        let extracted = extract_from_html(&html);
        assert_eq!(extracted.tier, Tier::Container);
        assert!(extracted.content.starts_with(LONG_C));
    }

    #[test]
    fn test_title_cascade() {
        let with_h1 = extract_from_html("<html><head><title>Tab</title></head><body><h1>  Main\n headline </h1></body></html>");
        assert_eq!(with_h1.title, "Main headline");

        let blank_h1 = extract_from_html("<html><head><title>Tab title</title></head><body><h1>   </h1></body></html>");
        assert_eq!(blank_h1.title, "Tab title");

        let class_only = extract_from_html(r#"<html><body><div class="story-headline">From class</div></body></html>"#);
        assert_eq!(class_only.title, "From class");

        let none = extract_from_html("<html><body><p>nothing here</p></body></html>");
        assert_eq!(none.title, "");
    }

    #[test]
    fn test_publish_date_prefers_time_datetime() {
        let doc = extract_from_html(
            r#"<html><body><span class="date">May 6</span><time datetime="2025-05-06T14:30:00Z">Tuesday</time></body></html>"#,
        );
        assert_eq!(doc.publish_date, "2025-05-06T14:30:00Z");

        let fallback = extract_from_html(
            r#"<html><body><time>Tuesday</time><span class="publish-date"> May 6, 2025 </span></body></html>"#,
        );
        assert_eq!(fallback.publish_date, "May 6, 2025");

        let testid = extract_from_html(r#"<html><body><div data-testid="story-date">Yesterday</div></body></html>"#);
        assert_eq!(testid.publish_date, "Yesterday");
    }

    #[test]
    fn test_author_cascade() {
        let by_class = extract_from_html(r#"<html><body><span class="author-name">Jane Roe</span><a rel="author">Other</a></body></html>"#);
        assert_eq!(by_class.author, "Jane Roe");

        let by_rel = extract_from_html(r#"<html><body><a rel="author">John Doe</a></body></html>"#);
        assert_eq!(by_rel.author, "John Doe");

        let by_byline = extract_from_html(r#"<html><body><p class="byline">By Sam Smith</p></body></html>"#);
        assert_eq!(by_byline.author, "By Sam Smith");
    }

    #[test]
    fn test_output_is_normalized() {
        let html = format!("<html><body><article>\n\n{LONG_A}\n\t\t{LONG_B}\n   {LONG_C}\n</article></body></html>");
        let extracted = extract_from_html(&html);
        assert_eq!(normalize_text(&extracted.content), extracted.content);
        assert!(!extracted.content.contains('\n'));
    }
}
