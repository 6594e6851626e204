use dialog_core::Platform;

/// Host platform name → analytics platform name.
const PLATFORM_NAMES: &[(&str, &str)] = &[("facebook", "messenger")];

/// Analytics name for `platform`. Platforms without an entry pass through.
pub fn analytics_platform(platform: &Platform) -> String {
    let name = platform.as_str();
    PLATFORM_NAMES
        .iter()
        .find(|(host, _)| *host == name)
        .map(|(_, analytics)| analytics.to_string())
        .unwrap_or_else(|| name.to_string())
}
