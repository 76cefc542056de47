//! Light command handlers.

use serde::Serialize;
use tabled::Tabled;
use tlight_core::{Controller, LightKey, LightValue, Node};

use crate::cli::{GlobalOpts, LightsArgs, LightsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LightView {
    key: LightKey,
    light_id: String,
    light_type: String,
    values: Option<LightValue>,
}

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Light")]
    light_id: String,
    #[tabled(rename = "Type")]
    light_type: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Color")]
    color: String,
}

fn views(controller: &Controller, node: &Node) -> Vec<LightView> {
    node.lights
        .iter()
        .map(|light| {
            let key = node.light_key(light);
            LightView {
                values: controller.light_display_value(&node.id, &key),
                key,
                light_id: light.id.clone(),
                light_type: light.light_type.clone(),
            }
        })
        .collect()
}

fn row(view: &LightView, color: bool) -> LightRow {
    let values = view.values.as_ref();
    LightRow {
        key: view.key.to_string(),
        light_id: view.light_id.clone(),
        light_type: view.light_type.clone(),
        brightness: util::or_dash(values.and_then(|v| v.brightness)),
        color: output::swatch(values.and_then(|v| util::rgb(v.red, v.green, v.blue)), color),
    }
}

pub async fn handle(
    controller: &Controller,
    args: LightsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        LightsCommand::List { node } => {
            let node = util::resolve_node(controller, &node)?;
            let lights = views(controller, &node);
            let out = output::render_list(
                &global.output,
                &lights,
                |v| row(v, color),
                |v| v.key.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LightsCommand::Set {
            node,
            light,
            values,
        } => {
            let node = util::resolve_node(controller, &node)?;
            let Some(target) = node.lights.iter().find(|l| l.id == light) else {
                return Err(CliError::NotFound {
                    resource_type: "light".into(),
                    identifier: light,
                    list_command: format!("lights list {}", node.id),
                });
            };
            let key = node.light_key(target);

            let patch = util::values_patch(&values);
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "values".into(),
                    reason: "nothing to set; pass --brightness or a color".into(),
                });
            }

            controller.set_light_values(&node.id, &key, patch).await?;
            output::print_status(&format!("Light '{key}' updated"), global.quiet);

            let updated: Vec<LightView> = views(controller, &node)
                .into_iter()
                .filter(|v| v.key == key)
                .collect();
            let out = output::render_list(
                &global.output,
                &updated,
                |v| row(v, color),
                |v| v.key.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
