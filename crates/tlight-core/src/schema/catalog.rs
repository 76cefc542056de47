// ── Effect catalog ──
//
// Built-in schemas for every `EffectType`. Each schema is the common
// properties followed by the type's own tree.

use std::sync::LazyLock;

use strum::IntoEnumIterator;

use super::PropertyDescriptor;
use crate::model::EffectType;

/// Display metadata of one effect type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub effect_type: EffectType,
    pub display_name: &'static str,
    pub description: &'static str,
}

/// Every available effect type, in catalog order.
pub fn catalog() -> Vec<CatalogEntry> {
    EffectType::iter().map(entry).collect()
}

pub fn entry(effect_type: EffectType) -> CatalogEntry {
    match effect_type {
        EffectType::Sacn => CatalogEntry {
            effect_type,
            display_name: "Empty Epsilon",
            description: "sACN client for integrating the TLight to 3rd party systems, \
                          such as Empty Epsilon.",
        },
        EffectType::SmoothColors => CatalogEntry {
            effect_type,
            display_name: "Smooth Colors",
            description: "Smoothly changing color effect.",
        },
    }
}

/// Full property schema of `effect_type`.
pub fn schema_for(effect_type: EffectType) -> &'static [PropertyDescriptor] {
    static SACN: LazyLock<Vec<PropertyDescriptor>> = LazyLock::new(|| with_common(sacn()));
    static SMOOTH_COLORS: LazyLock<Vec<PropertyDescriptor>> =
        LazyLock::new(|| with_common(smooth_colors()));

    match effect_type {
        EffectType::Sacn => &SACN,
        EffectType::SmoothColors => &SMOOTH_COLORS,
    }
}

fn with_common(mut specific: Vec<PropertyDescriptor>) -> Vec<PropertyDescriptor> {
    let mut all = vec![
        PropertyDescriptor::int(
            "lightCount",
            "Number of lights/channels this effect should create",
        )
        .required(),
        PropertyDescriptor::boolean("colors", "Color support").required(),
    ];
    all.append(&mut specific);
    all
}

fn sacn() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::object(
            "pluginOpts",
            "",
            vec![
                PropertyDescriptor::int(
                    "startChannel",
                    "sACN channel from which onwards to start listening",
                )
                .required(),
            ],
        )
        .required(),
    ]
}

fn smooth_colors() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::object(
            "pluginOpts",
            "",
            vec![
                PropertyDescriptor::int(
                    "startChannel",
                    "From what channel/light id onwards to send color data. \
                     To be used with DMX lights.",
                ),
                PropertyDescriptor::object(
                    "effectOpts",
                    "Effect specific options",
                    vec![
                        PropertyDescriptor::int_range(
                            "duration",
                            "The time it takes to go from start color to end in seconds",
                            1,
                            255,
                            5,
                        )
                        .required(),
                        PropertyDescriptor::color(
                            "startColor",
                            "Start color of the effect. Give this when colors are supported.",
                        ),
                        PropertyDescriptor::color(
                            "endColor",
                            "End color of the effect. Give this when colors are supported.",
                        ),
                        PropertyDescriptor::array("startBrightness", "Start brightness"),
                        PropertyDescriptor::array("endBrightness", "End brightness"),
                    ],
                )
                .required(),
            ],
        )
        .required(),
    ]
}
