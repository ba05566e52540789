#[cfg(test)]
mod tests {
    use droid_core::*;
    use serde_json::json;

    // ── Error tests ────────────────────────────────────────────

    #[test]
    fn test_device_not_found_lists_every_serial() {
        let err = DroidError::DeviceNotFound {
            requested: "pixel-9".into(),
            available: vec!["emulator-5554".into(), "R58M123".into()],
        };
        let s = err.to_string();
        assert!(s.contains("Device pixel-9 not found"));
        assert!(s.contains("Available devices"));
        assert!(s.contains("emulator-5554"));
        assert!(s.contains("R58M123"));
    }

    #[test]
    fn test_ambiguous_device_lists_every_serial() {
        let err = DroidError::AmbiguousDevice {
            available: vec!["device123".into(), "device456".into()],
        };
        let s = err.to_string();
        assert!(s.contains("Multiple devices connected"));
        assert!(s.contains("device123"));
        assert!(s.contains("device456"));
    }

    #[test]
    fn test_no_device_message() {
        assert!(DroidError::NoDevice.to_string().contains("No devices connected"));
    }

    #[test]
    fn test_selection_classification() {
        assert!(DroidError::NoDevice.is_selection());
        assert!(DroidError::Environment("adb missing".into()).is_selection());
        assert!(DroidError::AmbiguousDevice { available: vec![] }.is_selection());
        assert!(!DroidError::operation("shell", "boom").is_selection());
        assert!(!DroidError::Config("bad".into()).is_selection());
    }

    #[test]
    fn test_operation_display() {
        let err = DroidError::operation("pull", "remote object does not exist");
        assert_eq!(err.to_string(), "pull failed: remote object does not exist");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: DroidError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }

    // ── Tool tests ─────────────────────────────────────────────

    #[test]
    fn test_tool_serializes_input_schema_camel_case() {
        let tool = Tool {
            name: "get_packages".into(),
            description: "list packages".into(),
            input_schema: json!({ "type": "object", "properties": {} }),
        };
        let v = serde_json::to_value(&tool).unwrap();
        assert_eq!(v["name"], "get_packages");
        assert_eq!(v["inputSchema"]["type"], "object");
    }

    #[test]
    fn test_tool_call_defaults_arguments() {
        let call: ToolCall = serde_json::from_value(json!({ "tool_name": "get_uilayout" })).unwrap();
        assert_eq!(call.tool_name, "get_uilayout");
        assert!(call.arguments.is_null());
    }

    #[test]
    fn test_tool_result_constructors() {
        let r = ToolResult::list("get_package_action_intents", vec!["android.intent.action.MAIN".into()]);
        assert_eq!(
            r.output,
            ToolOutput::List { items: vec!["android.intent.action.MAIN".into()] }
        );
        let r = ToolResult::image("get_screenshot", "compressed_screenshot.png");
        assert!(matches!(r.output, ToolOutput::Image { ref path } if path.ends_with("compressed_screenshot.png")));
    }
}
