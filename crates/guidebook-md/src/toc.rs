//! Heading extraction for tables of contents.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// A heading found in a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// Heading level (1-6)
    pub level: u8,
    /// Visible heading text
    pub title: String,
    /// Explicit `{#id}` attribute, if any
    pub id: Option<String>,
}

/// Extract every heading of a Markdown page in document order.
///
/// Inline HTML (such as `<a name>` anchors) does not contribute to the title.
pub fn extract_headings(markdown: &str) -> Vec<Heading> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES;

    let mut headings = Vec::new();
    let mut current: Option<Heading> = None;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some(Heading {
                    level: level as u8,
                    title: String::new(),
                    id: id.map(|id| id.to_string()),
                });
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.title.push_str(&text);
                }
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some(mut heading) = current.take() {
                    heading.title = heading.title.trim().to_string();
                    headings.push(heading);
                }
            }

            _ => {}
        }
    }

    headings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_headings_with_ids() {
        let md = r#"# Philosophy {#S-philosophy}

Intro.

### <a name="Rp-direct"></a>P.1: Express ideas directly in `code`

```cpp
# not a heading
```
"#;

        let headings = extract_headings(md);

        assert_eq!(
            headings,
            vec![
                Heading {
                    level: 1,
                    title: "Philosophy".to_string(),
                    id: Some("S-philosophy".to_string()),
                },
                Heading {
                    level: 3,
                    title: "P.1: Express ideas directly in code".to_string(),
                    id: None,
                },
            ]
        );
    }

    #[test]
    fn handles_documents_without_headings() {
        assert!(extract_headings("just text").is_empty());
    }
}
