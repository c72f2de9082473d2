// --- CLIENT TOOL REGISTRY ---
// Named callbacks the agent can invoke remotely mid-turn. The session
// reader thread dispatches by name and ships the JSON result back.

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Instant;

type ToolFn = Box<dyn Fn(Value) -> Result<Value> + Send + Sync>;

pub struct ToolRegistry {
    tools: HashMap<String, ToolFn>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        name: &str,
        tool: impl Fn(Value) -> Result<Value> + Send + Sync + 'static,
    ) {
        self.tools.insert(name.to_string(), Box::new(tool));
    }

    pub fn invoke(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow!("unknown client tool: {}", name))?;
        tool(args)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The demo's device-capability tools, mirroring what the agent is
/// configured to call.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register("log_message", |args| {
        if let Some(message) = args.get("message").and_then(Value::as_str) {
            crate::log_info!("[Agent] {}", message);
        }
        Ok(Value::Null)
    });

    registry.register("get_battery_level", |_args| {
        Ok(json!(read_battery_level()))
    });

    registry.register("change_brightness", |args| {
        let level = args
            .get("brightness")
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow!("change_brightness needs a numeric 'brightness'"))?;
        let level = (level as f32).clamp(0.2, 1.0);
        {
            let mut app = crate::APP.lock().unwrap();
            app.brightness = level;
            app.config.brightness = level;
        }
        request_repaint();
        Ok(json!({ "brightness": level }))
    });

    registry.register("flash_screen", |_args| {
        crate::APP.lock().unwrap().flash_at = Some(Instant::now());
        request_repaint();
        Ok(Value::Null)
    });

    registry
}

fn request_repaint() {
    if let Some(ctx) = crate::gui::GUI_CONTEXT.lock().unwrap().as_ref() {
        ctx.request_repaint();
    }
}

/// Battery percentage, or -1 when no battery interface is readable.
fn read_battery_level() -> f64 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(entries) = std::fs::read_dir("/sys/class/power_supply") {
            for entry in entries.flatten() {
                let capacity = entry.path().join("capacity");
                if let Ok(text) = std::fs::read_to_string(capacity) {
                    if let Ok(percent) = text.trim().parse::<f64>() {
                        return percent;
                    }
                }
            }
        }
    }
    -1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_name_round_trips_json() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", |args| Ok(json!({ "got": args })));

        let result = registry.invoke("echo", json!({ "x": 1 })).unwrap();
        assert_eq!(result["got"]["x"], 1);
    }

    #[test]
    fn unknown_tool_is_an_error() {
        let registry = ToolRegistry::new();
        let err = registry.invoke("nope", Value::Null).unwrap_err();
        assert!(err.to_string().contains("unknown client tool"));
    }

    #[test]
    fn default_registry_exposes_the_demo_tools() {
        let registry = default_registry();
        for name in [
            "log_message",
            "get_battery_level",
            "change_brightness",
            "flash_screen",
        ] {
            assert!(registry.contains(name), "missing tool {}", name);
        }
    }

    #[test]
    fn battery_level_reports_minus_one_without_a_battery() {
        let level = read_battery_level();
        assert!(level == -1.0 || (0.0..=100.0).contains(&level));
    }

    #[test]
    fn change_brightness_rejects_missing_argument() {
        let registry = default_registry();
        assert!(registry.invoke("change_brightness", json!({})).is_err());
    }

    #[test]
    fn change_brightness_clamps_and_reports() {
        let registry = default_registry();
        let result = registry
            .invoke("change_brightness", json!({ "brightness": 5.0 }))
            .unwrap();
        assert_eq!(result["brightness"], 1.0);
        let result = registry
            .invoke("change_brightness", json!({ "brightness": 0.0 }))
            .unwrap();
        assert!((result["brightness"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }
}
