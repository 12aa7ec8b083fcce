use intake_config::{
    ConfigLoader, ConfigMap, ENVIRONMENT_VAR, Environment, EnvironmentOverrides, Settings,
    WarningSeverity, defaults_for_environment, resolved_defaults,
};
use intake_core::{IntakeError, Result};

pub(super) fn cmd_env(loader: &ConfigLoader) -> Result<()> {
    let env = loader.environment();
    let source = match std::env::var(ENVIRONMENT_VAR) {
        Ok(raw) if !raw.trim().is_empty() => format!("{ENVIRONMENT_VAR}={raw}"),
        _ => format!("{ENVIRONMENT_VAR} unset (default)"),
    };
    println!("{env}");
    println!("   source: {source}");
    println!("   config file: {}", loader.path().display());
    Ok(())
}

pub(super) fn cmd_config(settings: &Settings, json: bool) -> Result<()> {
    let redacted = settings.redacted();
    if json {
        println!("{}", serde_json::to_string_pretty(&redacted)?);
    } else {
        println!(
            "{}",
            toml::to_string_pretty(&redacted).map_err(|e| IntakeError::Config(e.to_string()))?
        );
    }
    Ok(())
}

pub(super) fn cmd_defaults(
    loader: &ConfigLoader,
    env: Option<&str>,
    resolved: bool,
    json: bool,
) -> Result<()> {
    let env = env.map(Environment::from_name).unwrap_or(loader.environment());
    let map = if resolved {
        resolved_defaults(env)
    } else {
        defaults_for_environment(env)
    };
    print_map(&map, json)
}

pub(super) fn cmd_overrides(loader: &ConfigLoader, env: Option<&str>, json: bool) -> Result<()> {
    let env = env.map(Environment::from_name).unwrap_or(loader.environment());
    print_map(&EnvironmentOverrides::for_environment(env).to_map(), json)
}

pub(super) fn cmd_doctor(settings: &Settings) -> Result<()> {
    println!("🩺 Intake Doctor — Configuration Audit ({})", settings.environment);
    println!();

    let findings = settings.audit();

    let mut failed = Vec::new();
    let mut warn_count = 0;
    let mut info_count = 0;
    for w in &findings {
        println!("  {w}");
        match w.severity {
            WarningSeverity::Error => failed.push(w.field.as_str()),
            WarningSeverity::Warning => warn_count += 1,
            WarningSeverity::Info => info_count += 1,
        }
    }

    if findings.is_empty() {
        println!("  ✅ no issues found");
    }
    println!();
    println!(
        "  ❌ {} errors, ⚠️  {warn_count} warnings, 💡 {info_count} suggestions",
        failed.len()
    );

    if !failed.is_empty() {
        return Err(IntakeError::Config(format!(
            "configuration has errors in {}",
            failed.join(", ")
        )));
    }
    Ok(())
}

fn print_map(map: &ConfigMap, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(map)?);
        return Ok(());
    }
    let width = map.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in map {
        println!("{key:<width$} = {value}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_fails_on_out_of_range_timeout() {
        let mut settings = Settings::defaults(Environment::Development).unwrap();
        settings.openai_timeout = 500;
        let err = cmd_doctor(&settings).unwrap_err();
        assert!(err.to_string().contains("OPENAI_TIMEOUT"));
    }

    #[test]
    fn test_doctor_passes_with_only_warnings() {
        let settings = Settings::defaults(Environment::Production).unwrap();
        assert!(cmd_doctor(&settings).is_ok());
    }
}
