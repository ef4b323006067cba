//! Shared fixtures: a deterministic stand-in for the MJML compiler

#![allow(dead_code)]

use mailframe_bridge::{CompilerError, CompilerOutput, KindTemplate};
use mailframe_editor::{Canvas, Kind, TypeRegistry};

const COLUMN_START: &str = "<mjml><mj-body><mj-column>";
const BODY_START: &str = "<mjml><mj-body>";

/// Compiles the single-node documents the bridge produces into HTML shaped
/// like real MJML output. Any attribute value `INVALID` is rejected.
pub fn fake_mjml(markup: &str) -> Result<CompilerOutput, CompilerError> {
    if markup.contains("INVALID") {
        return Err(CompilerError::Rejected(
            "Attribute border-color has invalid value: INVALID".to_string(),
        ));
    }

    // `<mj-column></mj-column>` compiled on its own also starts like the
    // column skeleton
    let column_rest = markup
        .strip_prefix(COLUMN_START)
        .filter(|rest| !rest.starts_with("</"));
    let (in_column, rest) = match column_rest {
        Some(rest) => (true, rest),
        None => (
            false,
            markup
                .strip_prefix(BODY_START)
                .ok_or_else(|| CompilerError::Rejected("missing mj-body".to_string()))?,
        ),
    };
    let anchor = &rest[..rest.find('>').map(|i| i + 1).unwrap_or(rest.len())];
    let tag: String = anchor[1..]
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '>')
        .collect();

    let body = if in_column {
        let element = match tag.as_str() {
            "mj-divider" => format!(
                r#"<p style="border-top:solid 4px {};font-size:1px;margin:0px auto;width:100%;"></p>"#,
                attribute(anchor, "border-color").unwrap_or("#000000")
            ),
            "mj-social" => r#"<table align="center"><tbody><tr><td><a href="https://www.facebook.com/sharer/sharer.php?u=[[SHORT_PERMALINK]]"><img height="20" src="facebook.png" width="20"/></a></td></tr></tbody></table>"#.to_string(),
            other => format!(r#"<div class="{}"></div>"#, other),
        };
        format!(
            r#"<div class="mj-column-per-100"><table><tbody><tr><td style="padding:10px 25px;">{}</td></tr></tbody></table></div>"#,
            element
        )
    } else {
        format!(
            r#"<!--[if mso]><table><![endif]--><div class="outer"><table class="{}"><tbody><tr><td class="slot"></td></tr></tbody></table></div>"#,
            tag
        )
    };

    Ok(CompilerOutput::html(format!(
        r#"<!doctype html><html><head><title></title></head><body style="word-spacing:normal;">{}</body></html>"#,
        body
    )))
}

fn attribute<'a>(anchor: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {}=\"", name);
    let start = anchor.find(&needle)? + needle.len();
    let len = anchor[start..].find('"')?;
    Some(&anchor[start..start + len])
}

/// Body-level kind whose children go into the compiled table cell
pub fn wrapper_kind() -> Kind {
    Kind {
        template: KindTemplate {
            children_selector: Some("td".to_string()),
            ..KindTemplate::default()
        },
        ..Kind::new("mj-wrapper")
    }
}

pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::with_builtin_kinds();
    registry.add_type(wrapper_kind());
    registry
}

pub fn canvas() -> Canvas {
    init_tracing();
    Canvas::new(registry(), fake_mjml)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
