//! Human-readable error descriptions and structured JSON error formatting.

use washer_core::error::{BuildError, WasherError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingPanel => {
                "What happened: No input panel was provided to the controller.\nLikely causes: The panel failed to initialize or was not wired into the builder.\nHow to fix: Pass a panel via with_panel(...) before build().".to_string()
            }
            BuildError::MissingOutputs => {
                "What happened: No output stage was provided to the controller.\nLikely causes: Buzzer, indicator or display failed to initialize or was not wired into the builder.\nHow to fix: Pass an output stage via with_outputs(...) before build().".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Zero intervals or counts, or out-of-range thresholds in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/washer_config.toml for a sample."
            ),
        };
    }

    if let Some(we) = err.downcast_ref::<WasherError>() {
        return match we {
            WasherError::Config(msg) => format!(
                "What happened: Configuration rejected: {msg}.\nLikely causes: A typo in a key, a value out of range, or a missing file.\nHow to fix: Fix the named key in the TOML (or pass --config) and rerun."
            ),
            WasherError::Scenario(msg) => format!(
                "What happened: Scenario script rejected: {msg}.\nLikely causes: Wrong headers, an unknown input name, a value outside [0, 1], or rows out of time order.\nHow to fix: Use headers 'at_ms,input,value', inputs power|start|rpm|temperature|duration|load|light|water_temp, and sort rows by at_ms."
            ),
            WasherError::Sensor(msg) => format!(
                "What happened: Sensor read failed: {msg}.\nLikely causes: A disconnected channel or a faulty converter.\nHow to fix: Check the wiring and rerun `washer self-check`."
            ),
            WasherError::Output(msg) => format!(
                "What happened: Output failed: {msg}.\nLikely causes: Buzzer, indicator or display not responding.\nHow to fix: Check the output stage and rerun `washer self-check`."
            ),
        };
    }

    if err.downcast_ref::<toml::de::Error>().is_some() {
        return format!(
            "What happened: Config file is not valid TOML for this controller.\nLikely causes: A syntax error, an unknown power_off_while_running policy, or a value of the wrong type.\nHow to fix: Correct the file and rerun. Parser said ({err}): {}",
            err.root_cause()
        );
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: configuration 2, scenario 3, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<toml::de::Error>().is_some()
    {
        return 2;
    }
    match err.downcast_ref::<WasherError>() {
        Some(WasherError::Config(_)) => 2,
        Some(WasherError::Scenario(_)) => 3,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<toml::de::Error>().is_some()
    {
        return "Config";
    }
    match err.downcast_ref::<WasherError>() {
        Some(WasherError::Config(_)) => "Config",
        Some(WasherError::Scenario(_)) => "Scenario",
        Some(WasherError::Sensor(_)) => "Sensor",
        Some(WasherError::Output(_)) => "Output",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
