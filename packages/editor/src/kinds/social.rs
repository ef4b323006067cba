use super::COLUMN_ONLY;
use crate::kind::{attr_map, Kind, KindDefaults};
use mailframe_bridge::KindTemplate;
use mailframe_model::{KindMeta, Predicate, TraitDescriptor};

const NETWORKS: &[(&str, &str)] = &[
    ("facebook", "Share"),
    ("twitter", "Tweet"),
    ("google", "+1"),
    ("instagram", "Share"),
    ("linkedin", "Share"),
    ("pinterest", "Pin it"),
];

const SHARE_LINK: &str = "[[SHORT_PERMALINK]]";

/// Social icon block: icons are driven by attributes, never by child nodes
pub fn social() -> Kind {
    let mut traits = vec![TraitDescriptor::named("display")];
    for (network, label) in NETWORKS {
        traits.push(TraitDescriptor::named(format!("{}-content", network)).with_value(*label));
        traits.push(TraitDescriptor::named(format!("{}-href", network)).with_value(SHARE_LINK));
    }
    traits.push(TraitDescriptor::select(
        "mode",
        "Mode",
        &[("horizontal", "Horizontal"), ("vertical", "Vertical")],
    ));

    let mut stylable: Vec<String> = [
        "text-decoration",
        "align",
        "font-family",
        "font-size",
        "line-height",
        "padding",
        "padding-top",
        "padding-left",
        "padding-right",
        "padding-bottom",
        "border-radius",
        "border-top-left-radius",
        "border-top-right-radius",
        "border-bottom-left-radius",
        "border-bottom-right-radius",
        "container-background-color",
        "color",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    stylable.extend(NETWORKS.iter().map(|(n, _)| format!("{}-icon-color", n)));

    Kind {
        view_tag: "tr".to_string(),
        view_style: "pointer-events: all; display: table; width: 100%".to_string(),
        defaults: KindDefaults {
            style: attr_map(&[
                ("align", "center"),
                ("icon-size", "20px"),
                ("font-size", "13px"),
                ("line-height", "22px"),
                ("facebook-icon-color", "#3b5998"),
                ("twitter-icon-color", "#55acee"),
                ("google-icon-color", "#dc4e41"),
                ("instagram-icon-color", "#3f729b"),
                ("linkedin-icon-color", "#0077b5"),
                ("pinterest-icon-color", "#bd081c"),
                ("display", "facebook twitter google"),
            ]),
            void: true,
            meta: KindMeta {
                custom_name: Some("Social".to_string()),
                draggable: Predicate::Selector(COLUMN_ONLY.to_string()),
                droppable: Predicate::Flag(false),
                stylable,
                traits,
            },
            ..Default::default()
        },
        template: KindTemplate::column_row("img"),
        ..Kind::new("mj-social")
    }
}
