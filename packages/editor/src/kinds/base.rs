use crate::kind::Kind;

pub const CORE_KIND: &str = "core";

/// Fallback kind for any markup tag without a dedicated kind
///
/// Compiles inside a bare body skeleton, mounts the first child of the
/// compiled body and receives children directly in the view element.
pub fn core() -> Kind {
    Kind {
        tag: None,
        ..Kind::new(CORE_KIND)
    }
}
