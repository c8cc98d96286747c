//! Source templates written into the project

use chrono::{DateTime, Local};

/// File whose brief existence forces the editor to reimport
pub const REFRESH_TRIGGER_FILE: &str = "kiro_refresh_trigger.cs";

/// Reduce a requested script name to a valid class identifier
///
/// Keeps ASCII letters, digits and underscores. Returns `None` if nothing is
/// left or the result starts with a digit.
#[must_use]
pub fn sanitize_class_name(raw: &str) -> Option<String> {
    let name: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    match name.chars().next() {
        Some(first) if !first.is_ascii_digit() => Some(name),
        _ => None,
    }
}

/// Empty `MonoBehaviour` with `Start` and `Update`
#[must_use]
pub fn mono_behaviour(class_name: &str) -> String {
    format!(
        "using UnityEngine;

public class {class_name} : MonoBehaviour
{{
    void Start()
    {{

    }}

    void Update()
    {{

    }}
}}"
    )
}

/// Throwaway script that makes the editor notice a change
///
/// The class name embeds the timestamp so consecutive triggers never collide.
#[must_use]
pub fn refresh_trigger(reason: &str, now: DateTime<Local>) -> String {
    let reason = reason.replace(['\r', '\n'], " ");
    format!(
        "// REFRESH TRIGGER - {now}
// This file forces the editor to refresh - it will be auto-deleted
// Reason: {reason}
using UnityEngine;
public class RefreshTrigger_{stamp} : MonoBehaviour {{ }}
",
        now = now.format("%Y-%m-%d %H:%M:%S%.6f"),
        stamp = now.timestamp()
    )
}
