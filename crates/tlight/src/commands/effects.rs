//! Effect command handlers.
//!
//! Everything except `apply` works on the local state file only.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;
use tabled::Tabled;
use tlight_core::schema::catalog;
use tlight_core::{
    CardPreference, ColorEditMode, ConfiguredEffect, Controller, EffectId, EffectType, FormNode,
};

use crate::cli::{ColorEditArg, EffectsArgs, EffectsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EffectView {
    #[serde(flatten)]
    effect: ConfiguredEffect,
    /// Names of the nodes currently running this effect.
    used_by: Vec<String>,
}

impl EffectView {
    fn all(controller: &Controller) -> Vec<Self> {
        let snap = controller.snapshot();
        snap.effects
            .configured_effects
            .iter()
            .map(|effect| Self {
                used_by: snap
                    .effects
                    .effects_in_use_per_node
                    .values()
                    .filter(|a| a.effect_id.as_ref() == Some(&effect.id))
                    .map(|a| a.node_name.clone())
                    .collect(),
                effect: effect.clone(),
            })
            .collect()
    }

    fn one(controller: &Controller, id: &EffectId) -> Result<Self, CliError> {
        Self::all(controller)
            .into_iter()
            .find(|v| &v.effect.id == id)
            .ok_or_else(|| CliError::NotFound {
                resource_type: "effect".into(),
                identifier: id.to_string(),
                list_command: "effects list".into(),
            })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TypeView {
    effect_type: EffectType,
    display_name: &'static str,
    description: &'static str,
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EffectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    effect_type: String,
    #[tabled(rename = "Running on")]
    used_by: String,
}

impl From<&EffectView> for EffectRow {
    fn from(v: &EffectView) -> Self {
        Self {
            id: v.effect.id.to_string(),
            name: v.effect.name.clone(),
            effect_type: util::or_dash(v.effect.effect_type),
            used_by: if v.used_by.is_empty() {
                "-".into()
            } else {
                v.used_by.join(", ")
            },
        }
    }
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    effect_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn detail(v: &EffectView) -> String {
    let mut lines = vec![
        format!("ID:         {}", v.effect.id),
        format!("Name:       {}", v.effect.name),
        format!("Type:       {}", util::or_dash(v.effect.effect_type)),
        format!(
            "Running on: {}",
            if v.used_by.is_empty() {
                "-".into()
            } else {
                v.used_by.join(", ")
            }
        ),
        "Properties:".into(),
    ];
    let props = serde_json::to_string_pretty(&v.effect.effect_properties).unwrap_or_default();
    lines.extend(props.lines().map(|l| format!("  {l}")));
    lines.join("\n")
}

// ── Form rendering ──────────────────────────────────────────────────

fn render_form(nodes: &[FormNode], color: bool) -> String {
    let mut out = String::new();
    for node in nodes {
        write_form_node(&mut out, node, 0, color);
    }
    out.trim_end().to_owned()
}

fn write_form_node(out: &mut String, node: &FormNode, depth: usize, color: bool) {
    let indent = "  ".repeat(depth);
    let _ = match node {
        FormNode::IntSlider {
            path,
            label,
            min,
            max,
            value,
            ..
        } => writeln!(
            out,
            "{indent}{label}: {value} [{min}..{max}]  {}",
            output::muted(path, color)
        ),
        FormNode::Color {
            path,
            label,
            mode,
            red,
            green,
            blue,
            ..
        } => {
            let editor = match mode {
                ColorEditMode::Picker => "picker",
                ColorEditMode::Sliders => "sliders",
            };
            let rgb = [red, green, blue].map(|c| u8::try_from(*c).unwrap_or(u8::MAX));
            writeln!(
                out,
                "{indent}{label}: {} ({editor})  {}",
                output::swatch(Some((rgb[0], rgb[1], rgb[2])), color),
                output::muted(path, color)
            )
        }
        FormNode::Group {
            label, children, ..
        } => {
            let _ = writeln!(out, "{indent}{label}:");
            for child in children {
                write_form_node(out, child, depth + 1, color);
            }
            Ok(())
        }
        FormNode::Unsupported { path, label, kind } => writeln!(
            out,
            "{indent}{label}: ({kind}, not editable)  {}",
            output::muted(path, color)
        ),
        FormNode::SchemaError { label, message, .. } => {
            writeln!(out, "{indent}{label}: schema error: {message}")
        }
    };
}

// ── Parsing ─────────────────────────────────────────────────────────

fn parse_effect_type(raw: &str) -> Result<Option<EffectType>, CliError> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    EffectType::from_str(raw)
        .map(Some)
        .map_err(|_| CliError::Validation {
            field: "type".into(),
            reason: format!("expected sACN, SmoothColors or none, got '{raw}'"),
        })
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    controller: &Controller,
    args: EffectsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        EffectsCommand::List => {
            let views = EffectView::all(controller);
            let out = output::render_list(
                &global.output,
                &views,
                |v| EffectRow::from(v),
                |v| v.effect.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EffectsCommand::Types => {
            let types: Vec<TypeView> = catalog()
                .into_iter()
                .map(|entry| TypeView {
                    effect_type: entry.effect_type,
                    display_name: entry.display_name,
                    description: entry.description,
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &types,
                |t| TypeRow {
                    effect_type: t.effect_type.to_string(),
                    name: t.display_name.into(),
                    description: t.description.into(),
                },
                |t| t.effect_type.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EffectsCommand::New { name, effect_type } => {
            let effect_type = effect_type.as_deref().map(parse_effect_type).transpose()?;
            let id = controller.create_effect();
            if let Some(name) = name {
                controller.set_effect_name(&id, name)?;
            }
            if let Some(effect_type) = effect_type {
                controller.set_effect_type(&id, effect_type)?;
            }
            save(controller)?;

            output::print_status("Effect created", global.quiet);
            show(controller, &id, global)
        }

        EffectsCommand::Show { effect } => {
            let id = util::resolve_effect(controller, &effect)?;
            show(controller, &id, global)
        }

        EffectsCommand::Rename { effect, name } => {
            let id = util::resolve_effect(controller, &effect)?;
            controller.set_effect_name(&id, name)?;
            save(controller)?;
            output::print_status("Effect renamed", global.quiet);
            Ok(())
        }

        EffectsCommand::SetType {
            effect,
            effect_type,
        } => {
            let id = util::resolve_effect(controller, &effect)?;
            let effect_type = parse_effect_type(&effect_type)?;
            controller.set_effect_type(&id, effect_type)?;
            save(controller)?;
            output::print_status("Effect type changed", global.quiet);
            show(controller, &id, global)
        }

        EffectsCommand::Set {
            effect,
            path,
            value,
        } => {
            let id = util::resolve_effect(controller, &effect)?;
            controller.set_effect_property(&id, &path, util::parse_value(&value))?;
            save(controller)?;
            output::print_status(&format!("Set {path}"), global.quiet);
            Ok(())
        }

        EffectsCommand::Color { effect, path, rgb } => {
            let id = util::resolve_effect(controller, &effect)?;
            controller.set_effect_color(&id, &path, rgb)?;
            save(controller)?;
            output::print_status(&format!("Set {path}"), global.quiet);
            Ok(())
        }

        EffectsCommand::Form { effect } => {
            let id = util::resolve_effect(controller, &effect)?;
            let form = controller.effect_form(&id)?;
            let out = output::render_single(
                &global.output,
                &form,
                |f| render_form(f, color),
                |f| {
                    f.iter()
                        .map(|n| n.path().to_owned())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EffectsCommand::ColorMode { effect, mode } => {
            let id = util::resolve_effect(controller, &effect)?;
            let picker = matches!(mode, ColorEditArg::Picker);
            controller.set_card_preference(id.as_str(), CardPreference::UseColorPicker(picker));
            save(controller)?;
            output::print_status("Color editor updated", global.quiet);
            Ok(())
        }

        EffectsCommand::Delete { effect } => {
            let id = util::resolve_effect(controller, &effect)?;
            controller.delete_effect(&id)?;
            save(controller)?;
            output::print_status("Effect deleted", global.quiet);
            Ok(())
        }

        EffectsCommand::Apply { node, effect } => {
            let node = util::resolve_node(controller, &node)?;
            let id = util::resolve_effect(controller, &effect)?;
            controller
                .select_effect(&node.id, &id, Some(node.supports_color()))
                .await?;
            save(controller)?;
            output::print_status(
                &format!("Effect running on '{}'", node.name),
                global.quiet,
            );
            Ok(())
        }
    }
}

fn show(controller: &Controller, id: &EffectId, global: &GlobalOpts) -> Result<(), CliError> {
    let view = EffectView::one(controller, id)?;
    let out = output::render_single(&global.output, &view, detail, |v| {
        v.effect.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn save(controller: &Controller) -> Result<(), CliError> {
    controller.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn effect_type_names() {
        assert_eq!(parse_effect_type("sACN").unwrap(), Some(EffectType::Sacn));
        assert_eq!(
            parse_effect_type("SmoothColors").unwrap(),
            Some(EffectType::SmoothColors)
        );
        assert_eq!(parse_effect_type("none").unwrap(), None);
        assert!(parse_effect_type("strobe").is_err());
    }

    #[test]
    fn form_renders_nested_groups() {
        let form = vec![FormNode::Group {
            path: "effect.pluginOpts".into(),
            label: "pluginOpts".into(),
            description: String::new(),
            children: vec![
                FormNode::IntSlider {
                    path: "effect.pluginOpts.duration".into(),
                    label: "duration".into(),
                    description: String::new(),
                    min: 1,
                    max: 255,
                    value: 5,
                },
                FormNode::Color {
                    path: "effect.pluginOpts.startColor".into(),
                    label: "startColor".into(),
                    description: String::new(),
                    mode: ColorEditMode::Sliders,
                    red: 255,
                    green: 0,
                    blue: 10,
                },
            ],
        }];

        let text = render_form(&form, false);
        assert_eq!(
            text,
            "pluginOpts:\n  \
             duration: 5 [1..255]  effect.pluginOpts.duration\n  \
             startColor: 255,0,10 (sliders)  effect.pluginOpts.startColor"
        );
    }
}
