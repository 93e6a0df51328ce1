#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use switchyard_core::{Capability, ModelSpec, RoutingTables, SwitchyardError, TaskType, Tier};
    use switchyard_llm::{ModelRegistry, Router, RouterOptions, task_signature};

    /// Two models per cost tier plus one research model.
    fn fixture_catalog() -> ModelRegistry {
        let mut registry = ModelRegistry::new_empty();
        for spec in [
            ModelSpec::new("cliproxy/gemini-2.5-flash", "cliproxy", Tier::Free)
                .with_speed(5)
                .with_capabilities([Capability::Chat, Capability::Code, Capability::Vision]),
            ModelSpec::new("cliproxy/claude-sonnet-4-5", "cliproxy", Tier::Free)
                .with_capabilities([Capability::Chat, Capability::Code, Capability::Reasoning]),
            ModelSpec::new("openrouter/deepseek/deepseek-chat", "openrouter", Tier::Cheap)
                .with_cost(0.14, 0.28)
                .with_capabilities([Capability::Chat, Capability::Code]),
            ModelSpec::new("openrouter/google/gemini-2.0-flash", "openrouter", Tier::Cheap)
                .with_cost(0.1, 0.4)
                .with_capabilities([Capability::Chat, Capability::Vision]),
            ModelSpec::new("anthropic/claude-sonnet-4", "anthropic", Tier::Standard)
                .with_cost(3.0, 15.0)
                .with_capabilities([Capability::Chat, Capability::Code, Capability::Reasoning]),
            ModelSpec::new("openai/gpt-4.1", "openai", Tier::Standard)
                .with_cost(2.0, 8.0)
                .with_capabilities([Capability::Chat, Capability::Code]),
            ModelSpec::new("anthropic/claude-opus-4", "anthropic", Tier::Premium)
                .with_cost(15.0, 75.0)
                .with_capabilities([Capability::Chat, Capability::Code, Capability::Reasoning]),
            ModelSpec::new("openrouter/perplexity/sonar-pro", "openrouter", Tier::Research)
                .with_cost(3.0, 15.0)
                .with_capabilities([Capability::Chat, Capability::Search]),
        ] {
            registry.register(spec);
        }
        registry
    }

    fn router_over(registry: ModelRegistry, options: RouterOptions) -> Router {
        Router::new(Arc::new(registry), RoutingTables::default(), options)
    }

    fn router() -> Router {
        router_over(fixture_catalog(), RouterOptions::default())
    }

    const TRIVIAL_TASK: &str = "Fix a typo in the readme";
    const CODE_TASK: &str = "Implement a REST API endpoint for user authentication with JWT tokens";
    const ARCHITECT_TASK: &str = "Design a distributed event sourcing architecture for our order \
        platform. Also design the consensus protocol between replicas and a migration strategy \
        from the legacy monolith.";

    // ── End-to-end scenarios ───────────────────────────────────

    #[test]
    fn test_translation_routes_cheap() {
        let result = router().route("Translate 'hello' to Russian", None).unwrap();
        assert!(matches!(result.task_type, TaskType::General | TaskType::Simple));
        assert!(result.score <= 45);
        assert_eq!(result.tier, Tier::Cheap);
        assert_eq!(result.model_id(), "openrouter/deepseek/deepseek-chat");
    }

    #[test]
    fn test_translation_escalates_to_free_when_only_free_models_exist() {
        let mut registry = ModelRegistry::new_empty();
        registry.register(ModelSpec::new("cliproxy/gemini-2.5-flash", "cliproxy", Tier::Free));
        let result = router_over(registry, RouterOptions::default())
            .route("Translate 'hello' to Russian", None)
            .unwrap();
        assert_eq!(result.tier, Tier::Free);
        assert!(result.model.is_free());
    }

    #[test]
    fn test_architect_routes_premium() {
        let result = router().route(ARCHITECT_TASK, None).unwrap();
        assert_eq!(result.task_type, TaskType::Architect);
        assert!(result.score > 70);
        assert_eq!(result.tier, Tier::Premium);
        assert_eq!(result.model_id(), "anthropic/claude-opus-4");
    }

    #[test]
    fn test_code_routes_standard() {
        let result = router().route(CODE_TASK, Some(Capability::Code)).unwrap();
        assert_eq!(result.task_type, TaskType::Code);
        assert_eq!(result.score, 60);
        assert_eq!(result.tier, Tier::Standard);
        assert_eq!(result.model_id(), "anthropic/claude-sonnet-4");
        assert_eq!(result.provider(), "anthropic");
    }

    #[test]
    fn test_research_override() {
        let r = router();
        for task in [
            "Search for the latest news about Rust async runtimes",
            "latest news about the Rust foundation",
            "Найди информацию о CRDT",
        ] {
            let result = r.route(task, None).unwrap();
            assert_eq!(result.tier, Tier::Research, "{task}");
            assert_eq!(result.model_id(), "openrouter/perplexity/sonar-pro");
            assert!(result.fallbacks.is_empty(), "research does not escalate");
        }
    }

    #[test]
    fn test_score_is_clamped() {
        let r = router();
        let long = "rewrite and migrate ".repeat(10_000);
        for task in ["", "   ", TRIVIAL_TASK, ARCHITECT_TASK, long.as_str()] {
            let result = r.route(task, None).unwrap();
            assert!((5..=95).contains(&result.score), "score {} for {task:?}", result.score);
        }
    }

    // ── Selection policy ───────────────────────────────────────

    #[test]
    fn test_free_tier_prefers_fastest_free_model() {
        let result = router().route(TRIVIAL_TASK, None).unwrap();
        assert_eq!(result.tier, Tier::Free);
        assert_eq!(result.score, 5);
        assert_eq!(result.model_id(), "cliproxy/gemini-2.5-flash");
    }

    #[test]
    fn test_prefer_free_picks_free_over_higher_composite() {
        let catalog = || {
            let mut registry = ModelRegistry::new_empty();
            registry.register(
                ModelSpec::new("openrouter/paid-fast", "openrouter", Tier::Cheap)
                    .with_cost(1.0, 1.0)
                    .with_speed(5),
            );
            registry.register(
                ModelSpec::new("openrouter/free-slow", "openrouter", Tier::Cheap).with_speed(1),
            );
            registry
        };
        let task = "Translate 'hello' to Russian";

        let preferring = router_over(catalog(), RouterOptions::default());
        assert_eq!(preferring.route(task, None).unwrap().model_id(), "openrouter/free-slow");

        let neutral = router_over(
            catalog(),
            RouterOptions {
                prefer_free_providers: false,
                ..Default::default()
            },
        );
        assert_eq!(neutral.route(task, None).unwrap().model_id(), "openrouter/paid-fast");
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let r = router_over(
            fixture_catalog(),
            RouterOptions {
                prefer_free_providers: false,
                ..Default::default()
            },
        );
        let result = r.route(CODE_TASK, None).unwrap();
        assert_eq!(result.model_id(), "anthropic/claude-sonnet-4");
        assert_eq!(result.alternatives[0], "openai/gpt-4.1");
    }

    #[test]
    fn test_provider_filter_escalates() {
        let r = router_over(
            fixture_catalog(),
            RouterOptions {
                available_providers: Some(HashSet::from(["anthropic".to_string()])),
                ..Default::default()
            },
        );
        let result = r.route("Translate 'hello' to Russian", None).unwrap();
        assert_eq!(result.tier, Tier::Standard);
        assert_eq!(result.provider(), "anthropic");
        assert!(result.fallbacks.iter().all(|m| m.provider == "anthropic"));
        assert_eq!(result.alternatives, vec!["anthropic/claude-opus-4".to_string()]);
    }

    #[test]
    fn test_capability_filter() {
        let result = router().route(TRIVIAL_TASK, Some(Capability::Vision)).unwrap();
        assert_eq!(result.model_id(), "cliproxy/gemini-2.5-flash");
        assert!(result.fallbacks.iter().all(|m| m.has_capability(Capability::Vision)));
        assert_eq!(result.alternatives, vec!["openrouter/google/gemini-2.0-flash".to_string()]);
    }

    #[test]
    fn test_capability_nobody_has_is_an_error() {
        let err = router().route(TRIVIAL_TASK, Some(Capability::LongContext)).unwrap_err();
        assert!(matches!(err, SwitchyardError::NoSuitableModel));
        assert_eq!(err.to_string(), "no suitable model for any tier");
    }

    #[test]
    fn test_empty_catalog() {
        let r = router_over(ModelRegistry::new_empty(), RouterOptions::default());
        assert!(matches!(r.route("anything", None), Err(SwitchyardError::NoSuitableModel)));
    }

    #[test]
    fn test_research_only_catalog_cannot_serve_general_tasks() {
        let mut registry = ModelRegistry::new_empty();
        registry.register(ModelSpec::new("openrouter/perplexity/sonar", "openrouter", Tier::Research));
        let r = router_over(registry, RouterOptions::default());
        assert!(r.route("Search for the latest news", None).is_ok());
        assert!(matches!(
            r.route("Translate 'hello' to Russian", None),
            Err(SwitchyardError::NoSuitableModel)
        ));
    }

    // ── Fallbacks ──────────────────────────────────────────────

    #[test]
    fn test_fallback_chain_invariants() {
        let r = router();
        let tasks = [TRIVIAL_TASK, CODE_TASK, ARCHITECT_TASK, "Translate 'hello' to Russian"];
        for task in tasks {
            for capability in [None, Some(Capability::Code), Some(Capability::Chat)] {
                let result = r.route(task, capability).unwrap();
                assert!(result.fallbacks.len() <= 4);
                assert!(result.fallbacks.iter().all(|m| m.id != result.model.id));
                if let Some(cap) = capability {
                    assert!(result.fallbacks.iter().all(|m| m.has_capability(cap)));
                }
                let ids: HashSet<_> = result.fallbacks.iter().map(|m| &m.id).collect();
                assert_eq!(ids.len(), result.fallbacks.len(), "fallbacks are deduplicated");
                let expected: Vec<String> =
                    result.fallbacks.iter().take(3).map(|m| m.id.clone()).collect();
                assert_eq!(result.alternatives, expected);
            }
        }
    }

    #[test]
    fn test_fallbacks_climb_tiers_in_order() {
        let result = router().route(TRIVIAL_TASK, None).unwrap();
        let ids: Vec<&str> = result.fallbacks.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "cliproxy/claude-sonnet-4-5",
                "openrouter/deepseek/deepseek-chat",
                "openrouter/google/gemini-2.0-flash",
                "anthropic/claude-sonnet-4",
            ]
        );
    }

    #[test]
    fn test_premium_fallbacks_stay_in_tier() {
        let result = router().route(ARCHITECT_TASK, None).unwrap();
        assert!(result.fallbacks.is_empty());
        assert!(result.alternatives.is_empty());
    }

    // ── Reasoning and signature ────────────────────────────────

    #[test]
    fn test_reasoning_format() {
        let result = router().route("Translate 'hello' to Russian", None).unwrap();
        assert_eq!(
            result.reasoning,
            "type=general | base=35 | →cheap(score=30) | model=openrouter/deepseek/deepseek-chat | rating=52"
        );
        assert_eq!(result.composite_score, 52.0);
    }

    #[test]
    fn test_reasoning_omits_neutral_rating() {
        let mut registry = ModelRegistry::new_empty();
        // 45*0.4 + 30 + 3*4 - 10 == 50
        registry.register(
            ModelSpec::new("openrouter/neutral", "openrouter", Tier::Cheap).with_priority(45),
        );
        let result = router_over(registry, RouterOptions::default())
            .route("Translate 'hello' to Russian", None)
            .unwrap();
        assert_eq!(result.composite_score, 50.0);
        assert!(!result.reasoning.contains("rating="));
        assert!(result.reasoning.ends_with("model=openrouter/neutral"));
    }

    #[test]
    fn test_signature_attached() {
        let result = router().route("Fix bug #123 in file.py", None).unwrap();
        assert_eq!(result.signature, task_signature("Fix bug #456 in file.py"));
        assert_eq!(result.signature.len(), 12);
    }

    #[test]
    fn test_route_result_serializes() {
        let result = router().route(CODE_TASK, None).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["tier"], "standard");
        assert_eq!(json["task_type"], "code");
        assert_eq!(json["model"]["id"], "anthropic/claude-sonnet-4");
    }

    // ── Outcomes and learning ──────────────────────────────────

    #[test]
    fn test_success_rate() {
        let r = router();
        assert_eq!(r.get_success_rate("never/seen"), 1.0);
        r.record_outcome("m/x", "task one", true, 100, None);
        r.record_outcome("m/x", "task two", true, 300, None);
        r.record_outcome("m/x", "task three", false, 0, Some("timeout"));
        assert!((r.get_success_rate("m/x") - 0.667).abs() < 0.01);
        assert_eq!(r.get_avg_latency("m/x"), 200);
        assert_eq!(r.get_avg_latency("never/seen"), 2000);
    }

    #[test]
    fn test_stats() {
        let r = router();
        assert!(r.get_stats().is_empty());
        r.record_outcome("m/a", "t", true, 500, None);
        r.record_outcome("m/a", "t", false, 0, None);
        r.record_outcome("m/b", "t", false, 0, Some("502"));
        let stats = r.get_stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["m/a"].total, 2);
        assert_eq!(stats["m/a"].avg_latency_ms, 500);
        assert_eq!(stats["m/b"].success_rate, 0.0);
        assert_eq!(stats["m/b"].avg_latency_ms, 0);
    }

    #[test]
    fn test_learning_escalates_after_free_failures() {
        let r = router();
        let before = r.route(TRIVIAL_TASK, None).unwrap();
        assert_eq!(before.tier, Tier::Free);

        for model in ["cliproxy/gemini-2.5-flash", "cliproxy/claude-sonnet-4-5"] {
            for _ in 0..3 {
                r.record_outcome(model, TRIVIAL_TASK, false, 0, Some("quota exceeded"));
            }
        }

        let after = r.route(TRIVIAL_TASK, None).unwrap();
        assert!(after.score > before.score);
        assert_eq!(after.score, 31);
        assert_eq!(after.tier, Tier::Cheap);
    }

    #[test]
    fn test_history_moves_composite() {
        let r = router();
        r.record_outcome("openrouter/deepseek/deepseek-chat", "t", true, 400, None);
        let result = r.route("Translate 'hello' to Russian", None).unwrap();
        // latency penalty drops from 10 to 2
        assert_eq!(result.composite_score, 60.0);
    }

    #[test]
    fn test_failures_demote_within_tier() {
        let r = router_over(
            fixture_catalog(),
            RouterOptions {
                prefer_free_providers: false,
                ..Default::default()
            },
        );
        r.record_outcome("anthropic/claude-sonnet-4", CODE_TASK, false, 0, None);
        let result = r.route(CODE_TASK, None).unwrap();
        assert_eq!(result.model_id(), "openai/gpt-4.1");
        assert_eq!(result.alternatives[0], "anthropic/claude-sonnet-4");
    }

    #[test]
    fn test_outcome_log_is_bounded() {
        let r = router();
        for i in 0..1001 {
            r.record_outcome("m/x", &format!("task {i}"), true, 0, None);
        }
        assert_eq!(r.outcomes().len(), 500);
    }

    #[test]
    fn test_huge_latencies_do_not_break_routing() {
        let r = router();
        let model = "cliproxy/gemini-2.5-flash";
        r.record_outcome(model, "t", true, u64::MAX, None);
        r.record_outcome(model, "t", true, 10, None);

        assert_eq!(r.get_avg_latency(model), u64::MAX / 2 + 5);
        assert_eq!(r.get_stats()[model].avg_latency_ms, u64::MAX / 2 + 5);
        let result = r.route(TRIVIAL_TASK, None).unwrap();
        assert!((0.0..=100.0).contains(&result.composite_score));
    }

    // ── Persistence ────────────────────────────────────────────

    #[test]
    fn test_outcomes_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("routing_outcomes.json");
        let options = || RouterOptions {
            outcomes_path: Some(path.clone()),
            ..Default::default()
        };

        let first = router_over(fixture_catalog(), options());
        first.record_outcome("cliproxy/gemini-2.5-flash", "summarize notes", true, 900, None);
        first.record_outcome("cliproxy/gemini-2.5-flash", "summarize notes", false, 0, None);
        assert!(path.exists());

        let second = router_over(fixture_catalog(), options());
        assert_eq!(
            second.get_success_rate("cliproxy/gemini-2.5-flash"),
            first.get_success_rate("cliproxy/gemini-2.5-flash")
        );
        assert_eq!(second.get_avg_latency("cliproxy/gemini-2.5-flash"), 900);
    }

    #[test]
    fn test_persisted_log_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routing_outcomes.json");
        let r = router_over(
            fixture_catalog(),
            RouterOptions {
                outcomes_path: Some(path.clone()),
                ..Default::default()
            },
        );
        let task = "x".repeat(250);
        r.record_outcome("m/x", &task, true, 42, None);

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["version"], 1);
        let entry = &json["outcomes"][0];
        assert_eq!(entry["model"], "m/x");
        assert_eq!(entry["outcome"], "success");
        assert_eq!(entry["latency"], 42);
        assert_eq!(entry["task"].as_str().unwrap().len(), 100);
        assert_eq!(entry["signature"].as_str().unwrap().len(), 12);
        assert!(entry["timestamp"].as_f64().unwrap() > 1_600_000_000.0);
    }

    #[test]
    fn test_failed_save_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let r = router_over(
            fixture_catalog(),
            RouterOptions {
                outcomes_path: Some(blocker.join("outcomes.json")),
                ..Default::default()
            },
        );

        r.record_outcome("cliproxy/gemini-2.5-flash", "t", false, 0, Some("HTTP 500"));

        assert_eq!(r.get_success_rate("cliproxy/gemini-2.5-flash"), 0.0);
        assert_eq!(r.outcomes().len(), 1);
        assert!(!blocker.join("outcomes.json").exists());
    }

    #[test]
    fn test_corrupt_log_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routing_outcomes.json");
        std::fs::write(&path, "{not json").unwrap();
        let r = router_over(
            fixture_catalog(),
            RouterOptions {
                outcomes_path: Some(path.clone()),
                ..Default::default()
            },
        );
        assert!(r.outcomes().is_empty());
        r.record_outcome("m/x", "t", true, 0, None);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"version\": 1"));
    }
}
