use console::style;

use switchyard_config::SwitchyardConfig;
use switchyard_core::{ModelSpec, Result, Tier};

use super::routing::build_registry;

pub(super) fn cmd_models(config: &SwitchyardConfig, tier: Option<Tier>, json: bool) -> Result<()> {
    let registry = build_registry(config);
    let models = select(registry.all(), tier);

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }
    if models.is_empty() {
        println!("{}", style("No models registered.").dim());
        return Ok(());
    }

    for t in Tier::ALL {
        let in_tier: Vec<&ModelSpec> = models.iter().copied().filter(|m| m.tier == t).collect();
        if in_tier.is_empty() {
            continue;
        }
        println!("{}", style(format!("{t} ({})", in_tier.len())).bold().cyan());
        for m in in_tier {
            let caps: Vec<&str> = m.capabilities.iter().map(|c| c.as_str()).collect();
            println!(
                "  {:<44} {:>7} {:>7}  speed {}  prio {:>3}  {}",
                style(&m.id).green(),
                cost(m.cost_per_1m_input),
                cost(m.cost_per_1m_output),
                m.speed,
                m.priority,
                style(caps.join(",")).dim()
            );
        }
    }
    println!();
    println!("{}", style("Costs are USD per 1M input / output tokens.").dim());
    Ok(())
}

fn select(models: &[ModelSpec], tier: Option<Tier>) -> Vec<&ModelSpec> {
    models
        .iter()
        .filter(|m| tier.is_none_or(|t| m.tier == t))
        .collect()
}

fn cost(usd: f64) -> String {
    if usd == 0.0 {
        "free".into()
    } else {
        format!("${usd:.2}")
    }
}
