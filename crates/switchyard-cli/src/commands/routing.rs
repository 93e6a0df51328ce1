use console::style;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use switchyard_config::SwitchyardConfig;
use switchyard_core::{Capability, Result};
use switchyard_llm::{ModelCatalog, ModelRegistry, RouteResult, Router, RouterOptions};

/// Registry from built-in defaults, the model cache, then models declared in config.
pub(super) fn build_registry(config: &SwitchyardConfig) -> ModelRegistry {
    let mut registry = ModelRegistry::load(
        &config.catalog.resolved_cache_path(),
        config.catalog.include_defaults,
    );
    for spec in &config.catalog.models {
        registry.register(spec.clone());
    }
    debug!(
        count = registry.count(),
        declared = config.catalog.models.len(),
        "catalog ready"
    );
    registry
}

pub(super) fn router_options(config: &SwitchyardConfig) -> RouterOptions {
    RouterOptions {
        prefer_free_providers: config.router.prefer_free_providers,
        available_providers: config
            .router
            .available_providers
            .as_ref()
            .map(|providers| providers.iter().cloned().collect::<HashSet<_>>()),
        outcomes_path: Some(config.router.resolved_outcomes_path()),
    }
}

pub(super) fn build_router(config: &SwitchyardConfig, registry: ModelRegistry) -> Router {
    Router::new(
        Arc::new(registry),
        config.router.tables.clone(),
        router_options(config),
    )
}

pub(super) fn cmd_route(
    config: &SwitchyardConfig,
    task: &str,
    capability: Option<Capability>,
    json: bool,
) -> Result<()> {
    let router = build_router(config, build_registry(config));
    let route = router.route(task, capability)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&route)?);
    } else {
        print_route(&route);
    }
    Ok(())
}

fn print_route(route: &RouteResult) {
    println!(
        "{} {}  {}",
        style("→").cyan().bold(),
        style(route.model_id()).green().bold(),
        style(format!("({}, score {})", route.tier, route.score)).dim()
    );
    println!("  {:<10} {}", style("type").dim(), route.task_type);
    println!("  {:<10} {}", style("signature").dim(), route.signature);
    println!("  {:<10} {:.1}", style("rating").dim(), route.composite_score);
    println!("  {:<10} {}", style("reasoning").dim(), route.reasoning);
    if route.alternatives.is_empty() {
        println!("  {:<10} {}", style("fallbacks").dim(), style("none").yellow());
    } else {
        println!(
            "  {:<10} {}",
            style("fallbacks").dim(),
            route.alternatives.join(", ")
        );
    }
}

pub(super) fn cmd_record(
    config: &SwitchyardConfig,
    model: &str,
    task: &str,
    success: bool,
    latency_ms: u64,
    error: Option<&str>,
) -> Result<()> {
    let registry = build_registry(config);
    // Record under the canonical id so aliases and full ids share stats
    let model_id = registry
        .get(model)
        .map(|m| m.id)
        .unwrap_or_else(|| model.to_string());

    let router = build_router(config, registry);
    router.record_outcome(&model_id, task, success, latency_ms, error);

    let mark = if success {
        style("✓ success").green().bold()
    } else {
        style("✗ failure").red().bold()
    };
    println!(
        "{mark} recorded for {} (success rate now {:.0}%)",
        style(&model_id).cyan(),
        router.get_success_rate(&model_id) * 100.0
    );
    Ok(())
}

pub(super) fn cmd_stats(config: &SwitchyardConfig, json: bool) -> Result<()> {
    let router = build_router(config, build_registry(config));
    let stats = router.get_stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    if stats.is_empty() {
        println!("{}", style("No outcomes recorded yet.").dim());
        return Ok(());
    }

    println!(
        "{}",
        style(format!(
            "{:<44} {:>6} {:>9} {:>10}",
            "MODEL", "TASKS", "SUCCESS", "LATENCY"
        ))
        .bold()
    );
    for (model, s) in &stats {
        let rate = format!("{:.0}%", s.success_rate * 100.0);
        let rate = if s.success_rate < 0.5 {
            style(rate).red()
        } else {
            style(rate).green()
        };
        println!(
            "{:<44} {:>6} {:>9} {:>8}ms",
            model, s.total, rate, s.avg_latency_ms
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::{ModelSpec, Tier};

    fn config_in(dir: &std::path::Path) -> SwitchyardConfig {
        let mut config = SwitchyardConfig::default();
        config.catalog.cache_path = Some(dir.join("models.json"));
        config.router.outcomes_path = Some(dir.join("outcomes.json"));
        config
    }

    #[test]
    fn test_router_options_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.router.prefer_free_providers = false;
        config.router.available_providers =
            Some(vec!["cliproxy".into(), "openrouter".into(), "cliproxy".into()]);

        let options = router_options(&config);
        assert!(!options.prefer_free_providers);
        assert_eq!(options.available_providers.unwrap().len(), 2);
        assert_eq!(options.outcomes_path, Some(dir.path().join("outcomes.json")));
    }

    #[test]
    fn test_registry_includes_declared_models() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.catalog.models.push(
            ModelSpec::new("openrouter/qwen/qwen3-coder", "", Tier::Cheap)
                .with_capabilities([Capability::Chat, Capability::Code]),
        );

        let registry = build_registry(&config);
        let declared = registry
            .all()
            .iter()
            .find(|m| m.id == "openrouter/qwen/qwen3-coder")
            .unwrap();
        assert_eq!(declared.provider, "openrouter");
        assert!(registry.all().iter().any(|m| m.id == "cliproxy/gemini-2.5-flash"));
    }

    #[test]
    fn test_registry_without_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.catalog.include_defaults = false;
        assert_eq!(build_registry(&config).count(), 0);
    }

    #[test]
    fn test_record_persists_under_canonical_id() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        cmd_record(&config, "cliproxy-flash", "translate a greeting", false, 900, Some("HTTP 429"))
            .unwrap();

        let router = build_router(&config, build_registry(&config));
        let stats = router.get_stats();
        assert_eq!(stats["cliproxy/gemini-2.5-flash"].total, 1);
        assert_eq!(router.get_success_rate("cliproxy/gemini-2.5-flash"), 0.0);
    }
}
