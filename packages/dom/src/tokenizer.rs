//! HTML tokenizer using logos
//!
//! Only the subset of HTML that markup compilers emit is recognized: tags,
//! text, comments (including conditional comments) and directives.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken<'src> {
    #[regex(r"<!--([^-]|-[^-])*-->", |lex| lex.slice())]
    Comment(&'src str),

    #[regex(r"<![^->][^>]*>", |lex| lex.slice())]
    #[regex(r"<\?[^>]*>", |lex| lex.slice())]
    Directive(&'src str),

    #[regex(r#"<[a-zA-Z][^\s/>]*([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"</[a-zA-Z][^\s>]*\s*>", |lex| lex.slice())]
    CloseTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    // A `<` that does not start a tag is plain text
    #[token("<")]
    Lt,
}

/// Tokens inside an opening tag, after the tag name
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum AttrToken<'src> {
    #[regex(r#"[^\s"'>/=][^\s"'>=]*"#, |lex| lex.slice())]
    Name(&'src str),

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    DoubleQuoted(&'src str),

    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    SingleQuoted(&'src str),

    #[token("/")]
    Slash,
}

/// An opening tag split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag<'src> {
    pub name: &'src str,
    pub attributes: Vec<(&'src str, &'src str)>,
    pub self_closing: bool,
}

/// Split `<name a="b" c>` into name, attributes and the self-closing flag
pub fn parse_open_tag(raw: &str) -> OpenTag<'_> {
    let inner = raw
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(raw);
    let trimmed = inner.trim_end();
    let self_closing = trimmed.ends_with('/');
    let inner = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let name_end = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = &inner[..name_end];

    let mut attributes = Vec::new();
    let mut pending: Option<&str> = None;
    let mut expect_value = false;

    for token in AttrToken::lexer(&inner[name_end..]).flatten() {
        match token {
            AttrToken::Name(text) if expect_value => {
                if let Some(attr) = pending.take() {
                    attributes.push((attr, text));
                }
                expect_value = false;
            }
            AttrToken::Name(text) => {
                if let Some(attr) = pending.replace(text) {
                    attributes.push((attr, ""));
                }
            }
            AttrToken::Eq => expect_value = pending.is_some(),
            AttrToken::DoubleQuoted(value) | AttrToken::SingleQuoted(value) => {
                if expect_value {
                    if let Some(attr) = pending.take() {
                        attributes.push((attr, value));
                    }
                }
                expect_value = false;
            }
            AttrToken::Slash => {}
        }
    }
    if let Some(attr) = pending {
        attributes.push((attr, ""));
    }

    OpenTag {
        name,
        attributes,
        self_closing,
    }
}

/// Name of a closing tag such as `</td >`
pub fn close_tag_name(raw: &str) -> &str {
    raw.trim_start_matches("</").trim_end_matches('>').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<HtmlToken<'_>> {
        HtmlToken::lexer(source).filter_map(|r| r.ok()).collect()
    }

    #[test]
    fn test_lex_tags_and_text() {
        let toks = tokens(r#"<p class="a">Hi</p>"#);
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[0], HtmlToken::OpenTag(r#"<p class="a">"#));
        assert_eq!(toks[1], HtmlToken::Text("Hi"));
        assert_eq!(toks[2], HtmlToken::CloseTag("</p>"));
    }

    #[test]
    fn test_lex_conditional_comment() {
        let source = r#"<!--[if mso | IE]><table role="presentation"><tr><td><![endif]--><div></div>"#;
        let toks = tokens(source);
        assert!(matches!(toks[0], HtmlToken::Comment(_)));
        assert_eq!(toks[1], HtmlToken::OpenTag("<div>"));
    }

    #[test]
    fn test_lex_quoted_gt_inside_attribute() {
        let toks = tokens(r#"<a title="x > y">z</a>"#);
        assert_eq!(toks[0], HtmlToken::OpenTag(r#"<a title="x > y">"#));
    }

    #[test]
    fn test_parse_open_tag_attributes() {
        let tag = parse_open_tag(r#"<img src="a.png" width=20 alt='x' hidden/>"#);
        assert_eq!(tag.name, "img");
        assert!(tag.self_closing);
        assert_eq!(
            tag.attributes,
            vec![("src", "a.png"), ("width", "20"), ("alt", "x"), ("hidden", "")]
        );
    }

    #[test]
    fn test_parse_open_tag_unquoted_url() {
        let tag = parse_open_tag("<a href=http://example.com/x>");
        assert_eq!(tag.attributes, vec![("href", "http://example.com/x")]);
        assert!(!tag.self_closing);
    }

    #[test]
    fn test_close_tag_name() {
        assert_eq!(close_tag_name("</td >"), "td");
    }
}
