use super::COLUMN_ONLY;
use crate::kind::{attr_map, Kind, KindDefaults};
use mailframe_bridge::KindTemplate;
use mailframe_model::{KindMeta, Predicate};

pub fn divider() -> Kind {
    Kind {
        view_tag: "tr".to_string(),
        view_style: "pointer-events: all; display: table; width: 100%; user-select: none;"
            .to_string(),
        defaults: KindDefaults {
            style: attr_map(&[
                ("width", "100%"),
                ("border-width", "4px"),
                ("border-style", "solid"),
                ("border-color", "#000000"),
                ("padding-top", "10px"),
                ("padding-bottom", "10px"),
                ("padding-right", "25px"),
                ("padding-left", "25px"),
            ]),
            meta: KindMeta {
                custom_name: Some("Divider".to_string()),
                draggable: Predicate::Selector(COLUMN_ONLY.to_string()),
                droppable: Predicate::Flag(false),
                stylable: [
                    "padding",
                    "padding-top",
                    "padding-left",
                    "padding-right",
                    "padding-bottom",
                    "width",
                    "container-background-color",
                    "border-detached",
                    "border-width",
                    "border-style",
                    "border-color",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                traits: Vec::new(),
            },
            ..Default::default()
        },
        template: KindTemplate::column_row("p"),
        ..Kind::new("mj-divider")
    }
}
