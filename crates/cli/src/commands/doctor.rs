use std::time::Duration;

use marchelo_core::config::{AppConfig, LoadOptions};
use serde::{Deserialize, Serialize};

use super::{CommandResult, EXIT_FAILURE};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_FAILURE };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_pricing_tables(&config));
            checks.push(check_server_health(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["pricing_tables", "server_health"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_pricing_tables(config: &AppConfig) -> DoctorCheck {
    match config.pricing_tables() {
        Ok(tables) => DoctorCheck {
            name: "pricing_tables",
            status: CheckStatus::Pass,
            details: format!(
                "{} tiers and {} destination zones ({} from config)",
                tables.tiers().count(),
                tables.destinations().len(),
                config.pricing.destinations.len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "pricing_tables",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn health_url(config: &AppConfig) -> String {
    let host = match config.server.bind_address.as_str() {
        "0.0.0.0" | "::" => "127.0.0.1",
        other => other,
    };
    format!("http://{host}:{}/health", config.server.port)
}

fn check_server_health(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "server_health",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let url = health_url(config);
    let result = runtime.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(HEALTH_TIMEOUT)
            .build()
            .map_err(|error| format!("failed to build http client: {error}"))?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|error| format!("server unreachable at `{url}`: {error}"))?;
        let http_status = response.status();
        let body = response
            .json::<HealthBody>()
            .await
            .map_err(|error| format!("unexpected health payload from `{url}`: {error}"))?;

        if http_status.is_success() && body.status == "ready" {
            Ok(format!("`{url}` reported ready"))
        } else {
            Err(format!("`{url}` reported {} ({http_status})", body.status))
        }
    });

    match result {
        Ok(details) => DoctorCheck { name: "server_health", status: CheckStatus::Pass, details },
        Err(details) => DoctorCheck { name: "server_health", status: CheckStatus::Fail, details },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
