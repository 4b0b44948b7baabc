//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use echowalk_core::error::{BuildError, EngineError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSynthesizer => {
                "What happened: No speech synthesizer was provided to the engine.\nLikely causes: The voice backend failed to start or was not wired into the builder.\nHow to fix: Ensure the synthesizer is created successfully and passed via with_synthesizer(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid engine configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, run `echowalk check-config`, then rerun."
            ),
        };
    }

    if let Some(ee) = err.downcast_ref::<EngineError>() {
        if matches!(ee, EngineError::Disconnected) {
            return "What happened: The engine thread stopped while the replay was still sending to it.\nLikely causes: A panic on the engine thread or an early shutdown.\nHow to fix: Re-run with --log-level=debug and check the log for the first error.".to_string();
        }
        return format!(
            "What happened: {ee}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    // String-based heuristics for errors coming from config or scenario loading
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass an existing TOML file with --config (see etc/echowalk.toml). Original: {msg}"
        );
    }

    if lower.contains("parse config") {
        return format!(
            "What happened: The config file is not valid TOML for this tool.\nLikely causes: A typo, a wrong value type, or an unknown table.\nHow to fix: Compare with etc/echowalk.toml. Original: {msg}"
        );
    }

    if lower.contains("scenario csv must have headers") {
        return "Invalid headers in scenario CSV. Expected 't_ms,kind,anchor_id,min_x,min_y,min_z,max_x,max_y,max_z,tx,ty,tz,surface'.".to_string();
    }

    if lower.contains("scenario csv") || lower.contains("csv row") || lower.contains("csv headers") {
        return format!(
            "What happened: The scenario file could not be loaded.\nLikely causes: Missing file, an unknown event kind, or a half-filled bounding box.\nHow to fix: Fix the reported row and rerun. Original: {msg}"
        );
    }

    if lower.contains("must be") || lower.contains("unreasonably large") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range or inconsistent values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 for engine build errors, 1 for everything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use echowalk_core::error::BuildError;
    if err.downcast_ref::<BuildError>().is_some() {
        return 3;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use echowalk_core::error::{BuildError, EngineError};
    use serde_json::json;

    let reason = if let Some(be) = err.downcast_ref::<BuildError>() {
        match be {
            BuildError::MissingSynthesizer => "MissingSynthesizer",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        }
    } else if let Some(ee) = err.downcast_ref::<EngineError>() {
        match ee {
            EngineError::Synthesis(_) => "Synthesis",
            EngineError::Config(_) => "Config",
            EngineError::State(_) => "State",
            EngineError::Disconnected => "Disconnected",
        }
    } else {
        "Error"
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use echowalk_core::error::BuildError;

    #[test]
    fn build_errors_get_their_own_exit_code() {
        let e = eyre::Report::new(BuildError::InvalidConfig("decay must be in [0.0, 1.0)"));
        assert_eq!(exit_code_for_error(&e), 3);
        assert!(humanize(&e).contains("decay"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "InvalidConfig");
    }

    #[test]
    fn header_errors_name_the_expected_columns() {
        let e = eyre::eyre!("scenario CSV must have headers t_ms,kind,...");
        assert!(humanize(&e).contains("anchor_id"));
        assert_eq!(exit_code_for_error(&e), 1);
    }
}
