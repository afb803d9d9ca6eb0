use partsbot_catalog::{CatalogClient, SearchParams};
use partsbot_core::config::{AppConfig, FinderKind};
use partsbot_dialogue::DialogueClient;

struct CheckResult {
    label: String,
    ok: bool,
    detail: String,
}

pub async fn run_doctor(config: &AppConfig) {
    let mut checks = Vec::new();

    // 1. Gateway bind address parses
    checks.push(check_bind(config));

    // 2. Dialogue backend answers its health check
    checks.push(check_dialogue(config).await);

    // 3. Catalog credentials present
    checks.push(check_catalog_key(config));

    // 4. Catalog answers a one-result search
    checks.push(check_catalog(config).await);

    // 5. Conversation graph finder
    checks.push(check_finder(config));

    // Print results
    let mut ok_count = 0;
    let mut fail_count = 0;

    for check in &checks {
        let icon = if check.ok { "[OK]" } else { "[!!]" };
        println!("  {} {}: {}", icon, check.label, check.detail);
        if check.ok {
            ok_count += 1;
        } else {
            fail_count += 1;
        }
    }

    println!();
    println!("  {} passed, {} issues found", ok_count, fail_count);
}

fn check_bind(config: &AppConfig) -> CheckResult {
    let bind = &config.gateway.bind;
    match bind.parse::<std::net::SocketAddr>() {
        Ok(_) => CheckResult {
            label: "Gateway".into(),
            ok: true,
            detail: format!("Will listen on {}", bind),
        },
        Err(e) => CheckResult {
            label: "Gateway".into(),
            ok: false,
            detail: format!("Invalid bind address '{}': {}", bind, e),
        },
    }
}

async fn check_dialogue(config: &AppConfig) -> CheckResult {
    let label = "Dialogue backend".to_string();
    let client = match DialogueClient::new(&config.dialogue) {
        Ok(c) => c,
        Err(e) => {
            return CheckResult {
                label,
                ok: false,
                detail: e.to_string(),
            }
        }
    };

    match client.health().await {
        Ok(status) if (200..300).contains(&status) => CheckResult {
            label,
            ok: true,
            detail: format!("{} healthy (HTTP {})", client.base_url(), status),
        },
        Ok(status) => CheckResult {
            label,
            ok: false,
            detail: format!("{} unhealthy (HTTP {})", client.base_url(), status),
        },
        Err(e) => CheckResult {
            label,
            ok: false,
            detail: format!("{} unreachable: {}", client.base_url(), e),
        },
    }
}

fn check_catalog_key(config: &AppConfig) -> CheckResult {
    if config.catalog.has_api_key() {
        CheckResult {
            label: "Catalog API key".into(),
            ok: true,
            detail: format!("Configured ({:?} auth)", config.catalog.auth_method),
        }
    } else {
        CheckResult {
            label: "Catalog API key".into(),
            ok: false,
            detail: "No API key set (catalog.api_key or CATALOG_API_KEY)".into(),
        }
    }
}

async fn check_catalog(config: &AppConfig) -> CheckResult {
    let label = "Catalog".to_string();
    let client = match CatalogClient::new(&config.catalog) {
        Ok(c) => c,
        Err(e) => {
            return CheckResult {
                label,
                ok: false,
                detail: e.to_string(),
            }
        }
    };

    match client
        .search_parts(&SearchParams::keyword("brake").with_limit(1))
        .await
    {
        Ok(found) => CheckResult {
            label,
            ok: true,
            detail: format!("{} reachable ({} results for 'brake')", client.base_url(), found.total_results),
        },
        Err(e) => CheckResult {
            label,
            ok: false,
            detail: format!("{}: {}", client.base_url(), e),
        },
    }
}

fn check_finder(config: &AppConfig) -> CheckResult {
    match config.assistant.finder {
        FinderKind::Mock => CheckResult {
            label: "Assistant".into(),
            ok: true,
            detail: "Local graph returns synthetic results".into(),
        },
        FinderKind::Catalog => CheckResult {
            label: "Assistant".into(),
            ok: config.catalog.has_api_key(),
            detail: format!(
                "Local graph searches the catalog (limit {})",
                config.assistant.result_limit
            ),
        },
    }
}
