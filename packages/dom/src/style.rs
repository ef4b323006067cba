use indexmap::IndexMap;
use std::fmt;

/// Inline `style` declaration of an element, kept in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle(IndexMap<String, String>);

impl InlineStyle {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Parse a declaration list such as `pointer-events: all; width: 100%`
    ///
    /// A `;` inside parentheses or quotes belongs to the value, as in
    /// `url(data:image/png;base64,...)`.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        for declaration in declarations(text) {
            if let Some((prop, value)) = declaration.split_once(':') {
                let prop = prop.trim();
                let value = value.trim();
                if !prop.is_empty() {
                    style.set(prop, value);
                }
            }
        }
        style
    }

    pub fn set(&mut self, prop: impl Into<String>, value: impl Into<String>) {
        self.0.insert(prop.into().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.0.get(prop).map(String::as_str)
    }

    pub fn remove(&mut self, prop: &str) -> Option<String> {
        self.0.shift_remove(prop)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn declarations(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&text[start..]);
    out
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (prop, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {};", prop, value)?;
        }
        Ok(())
    }
}
