//! Extraction of action intents from `dumpsys package` output.

const RESOLVER_TABLE_MARKER: &str = "Activity Resolver Table:";
const NON_DATA_MARKER: &str = "\n  Non-Data Actions:";

/// Collect the `Non-Data Actions` entries of the activity resolver table.
///
/// Returns an empty list when either marker is missing. The section ends at
/// the first blank line after the marker, or at end of text.
pub fn parse_action_intents(dumpsys: &str) -> Vec<String> {
    let Some(table_start) = dumpsys.find(RESOLVER_TABLE_MARKER) else {
        return Vec::new();
    };
    let resolver_section = &dumpsys[table_start..];

    let Some(non_data_start) = resolver_section.find(NON_DATA_MARKER) else {
        return Vec::new();
    };
    let rest = &resolver_section[non_data_start..];
    let non_data_section = match rest.find("\n\n") {
        Some(end) => &rest[..end],
        None => rest,
    };

    non_data_section
        .split('\n')
        .map(str::trim)
        .filter(|line| line.starts_with("android.") || line.starts_with("com."))
        .map(str::to_string)
        .collect()
}
