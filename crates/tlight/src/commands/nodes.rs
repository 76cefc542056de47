//! Node command handlers.

use std::str::FromStr;

use serde::Serialize;
use tabled::Tabled;
use tlight_core::{Controller, EffectAssignment, Mode, Node, NodeValue};

use crate::cli::{GlobalOpts, NodesArgs, NodesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

/// A node together with its displayed values and assignment.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeView {
    #[serde(flatten)]
    node: Node,
    values: Option<NodeValue>,
    effect: Option<EffectAssignment>,
    effect_name: Option<String>,
}

impl NodeView {
    fn load(controller: &Controller, node: Node) -> Self {
        let values = controller.node_display_value(&node.id);
        let effect = controller.store().assignment(&node.id);
        let effect_name = effect
            .as_ref()
            .and_then(|a| a.effect_id.as_ref())
            .and_then(|id| controller.store().effect(id))
            .map(|e| e.name);
        Self {
            node,
            values,
            effect,
            effect_name,
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    node_type: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Lights")]
    lights: String,
    #[tabled(rename = "Effect")]
    effect: String,
}

impl NodeRow {
    fn new(view: &NodeView, color: bool) -> Self {
        let values = view.values.as_ref();
        Self {
            id: view.node.id.to_string(),
            name: view.node.name.clone(),
            node_type: view.node.node_type.clone(),
            mode: util::or_dash(values.and_then(|v| v.mode)),
            brightness: util::or_dash(values.and_then(|v| v.brightness)),
            color: if view.node.supports_color() {
                output::swatch(values.and_then(|v| util::rgb(v.red, v.green, v.blue)), color)
            } else {
                output::muted("n/a", color)
            },
            lights: view.node.lights.len().to_string(),
            effect: view.effect_name.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

fn detail(view: &NodeView, color: bool) -> String {
    let node = &view.node;
    let values = view.values.as_ref();
    let mut lines = vec![
        format!("ID:         {}", node.id),
        format!("Name:       {}", node.name),
        format!("Type:       {}", node.node_type),
        format!("Mode:       {}", util::or_dash(values.and_then(|v| v.mode))),
        format!(
            "Brightness: {}",
            util::or_dash(values.and_then(|v| v.brightness))
        ),
        format!(
            "Color:      {}",
            output::swatch(values.and_then(|v| util::rgb(v.red, v.green, v.blue)), color)
        ),
        format!(
            "Features:   {} lights, addressable={}, color={}",
            node.features.count, node.features.addressable, node.features.color
        ),
        format!(
            "Effect:     {}",
            view.effect_name.as_deref().unwrap_or("-")
        ),
    ];
    if !node.lights.is_empty() {
        lines.push("Lights:".into());
        for light in &node.lights {
            lines.push(format!(
                "  {:<4} {:<10} brightness={} color={}",
                light.id,
                light.light_type,
                util::or_dash(light.brightness),
                output::swatch(util::rgb(light.red, light.green, light.blue), color)
            ));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: NodesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        NodesCommand::List => {
            let views: Vec<NodeView> = controller
                .snapshot()
                .nodes
                .values()
                .cloned()
                .map(|n| NodeView::load(controller, n))
                .collect();
            let out = output::render_list(
                &global.output,
                &views,
                |v| NodeRow::new(v, color),
                |v| v.node.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NodesCommand::Get { node } => {
            let node = util::resolve_node(controller, &node)?;
            let view = NodeView::load(controller, node);
            let out = output::render_single(
                &global.output,
                &view,
                |v| detail(v, color),
                |v| v.node.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NodesCommand::Set { node, mode, values } => {
            let node = util::resolve_node(controller, &node)?;
            let mut patch = util::values_patch(&values);
            if let Some(raw) = mode {
                let mode = Mode::from_str(&raw).map_err(|_| CliError::Validation {
                    field: "mode".into(),
                    reason: format!(
                        "expected SINGLE, EXTERNAL, INDIVIDUAL or ANIMATION, got '{raw}'"
                    ),
                })?;
                patch = patch.mode(mode);
            }
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "values".into(),
                    reason: "nothing to set; pass --mode, --brightness or a color".into(),
                });
            }

            controller.set_node_values(&node.id, patch).await?;
            output::print_status(&format!("Node '{}' updated", node.name), global.quiet);

            let view = NodeView::load(controller, node);
            let out = output::render_single(
                &global.output,
                &view,
                |v| detail(v, color),
                |v| v.node.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
