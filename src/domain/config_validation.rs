//! Configuration validation.
//!
//! Validates all config fields before a simulation runs. Absent keys fall back
//! to their defaults and are not errors, except `prices_path`.

use crate::domain::error::LevsimError;
use crate::domain::pricing_strategy::StrategyKind;
use crate::domain::simulation::{check_count, COUNT_LIMITS};
use crate::ports::config_port::{parse_bool, ConfigPort};

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), LevsimError> {
    validate_prices_path(config)?;
    validate_prices_column(config)?;
    validate_bool(config, "simulation", "prices_has_headers")?;
    for (key, max) in COUNT_LIMITS {
        validate_count(config, key, max)?;
    }
    validate_strategy(config)?;
    validate_seed(config)?;
    validate_leverage(config)?;
    validate_expense_ratio(config, "baseline")?;
    validate_expense_ratio(config, "leveraged")?;
    validate_target_return(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> LevsimError {
    LevsimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Present-but-blank values count as absent.
fn present(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn validate_prices_path(config: &dyn ConfigPort) -> Result<(), LevsimError> {
    match present(config, "simulation", "prices_path") {
        Some(_) => Ok(()),
        None => Err(LevsimError::ConfigMissing {
            section: "simulation".to_string(),
            key: "prices_path".to_string(),
        }),
    }
}

fn validate_prices_column(config: &dyn ConfigPort) -> Result<(), LevsimError> {
    let Some(raw) = present(config, "simulation", "prices_column") else {
        return Ok(());
    };
    match raw.parse::<usize>() {
        Ok(_) => Ok(()),
        Err(_) => Err(invalid(
            "simulation",
            "prices_column",
            "prices_column must be a non-negative integer",
        )),
    }
}

fn validate_bool(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), LevsimError> {
    let Some(raw) = present(config, section, key) else {
        return Ok(());
    };
    match parse_bool(&raw) {
        Some(_) => Ok(()),
        None => Err(invalid(
            section,
            key,
            format!("{key} must be true/false, yes/no or 1/0"),
        )),
    }
}

fn validate_count(config: &dyn ConfigPort, key: &str, max: u64) -> Result<(), LevsimError> {
    let Some(raw) = present(config, "simulation", key) else {
        return Ok(());
    };
    let value = raw.parse::<u64>().map_err(|_| {
        invalid(
            "simulation",
            key,
            format!("{key} must be an integer between 1 and {max}"),
        )
    })?;
    check_count(key, value, max).map(|_| ())
}

fn parse_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, LevsimError> {
    let Some(raw) = present(config, section, key) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(invalid(section, key, format!("{key} must be a finite number"))),
    }
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), LevsimError> {
    let Some(raw) = present(config, "simulation", "strategy") else {
        return Ok(());
    };
    raw.parse::<StrategyKind>()
        .map(|_| ())
        .map_err(|reason| invalid("simulation", "strategy", reason))
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), LevsimError> {
    let Some(raw) = present(config, "simulation", "seed") else {
        return Ok(());
    };
    match raw.parse::<u64>() {
        Ok(_) => Ok(()),
        Err(_) => Err(invalid(
            "simulation",
            "seed",
            "seed must be a non-negative integer",
        )),
    }
}

fn validate_leverage(config: &dyn ConfigPort) -> Result<(), LevsimError> {
    match parse_double(config, "leveraged", "leverage")? {
        Some(v) if v < 0.0 => Err(invalid(
            "leveraged",
            "leverage",
            "leverage must be non-negative",
        )),
        _ => Ok(()),
    }
}

fn validate_expense_ratio(config: &dyn ConfigPort, section: &str) -> Result<(), LevsimError> {
    match parse_double(config, section, "expense_ratio")? {
        Some(v) if v < 0.0 => Err(invalid(
            section,
            "expense_ratio",
            "expense_ratio must be non-negative",
        )),
        _ => Ok(()),
    }
}

fn validate_target_return(config: &dyn ConfigPort) -> Result<(), LevsimError> {
    parse_double(config, "report", "target_annual_return").map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const VALID: &str = r#"
[simulation]
prices_path = resources/daily-changes.csv
trading_days_per_year = 253
years = 30
simulations = 1000
workers = 4
queue_capacity = 40
strategy = alternating
seed = 42

[baseline]
expense_ratio = 0.03

[leveraged]
leverage = 2.0
expense_ratio = 0.91

[report]
target_annual_return = 15.0
"#;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn assert_invalid(content: &str, section: &str, key: &str) {
        match validate_simulation_config(&adapter(content)) {
            Err(LevsimError::ConfigInvalid {
                section: s, key: k, ..
            }) => {
                assert_eq!(s, section);
                assert_eq!(k, key);
            }
            other => panic!("expected ConfigInvalid for [{section}] {key}, got {other:?}"),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_simulation_config(&adapter(VALID)).is_ok());
    }

    #[test]
    fn minimal_config_passes() {
        let content = "[simulation]\nprices_path = prices.csv\n";
        assert!(validate_simulation_config(&adapter(content)).is_ok());
    }

    #[test]
    fn missing_prices_path() {
        let err = validate_simulation_config(&adapter("[simulation]\nyears = 5\n"));
        assert!(matches!(
            err,
            Err(LevsimError::ConfigMissing { ref key, .. }) if key == "prices_path"
        ));
    }

    #[test]
    fn zero_workers_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\nworkers = 0\n",
            "simulation",
            "workers",
        );
    }

    #[test]
    fn non_numeric_years_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\nyears = lots\n",
            "simulation",
            "years",
        );
    }

    #[test]
    fn unknown_strategy_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\nstrategy = random_walk\n",
            "simulation",
            "strategy",
        );
    }

    #[test]
    fn negative_seed_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\nseed = -3\n",
            "simulation",
            "seed",
        );
    }

    #[test]
    fn negative_leverage_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\n[leveraged]\nleverage = -1\n",
            "leveraged",
            "leverage",
        );
    }

    #[test]
    fn negative_expense_ratio_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\n[baseline]\nexpense_ratio = -0.1\n",
            "baseline",
            "expense_ratio",
        );
    }

    #[test]
    fn non_finite_expense_ratio_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\n[leveraged]\nexpense_ratio = inf\n",
            "leveraged",
            "expense_ratio",
        );
    }

    #[test]
    fn counts_beyond_their_type_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\ntrading_days_per_year = 4294967296\n",
            "simulation",
            "trading_days_per_year",
        );
        assert_invalid(
            "[simulation]\nprices_path = p.csv\nyears = 4294967297\n",
            "simulation",
            "years",
        );
        assert_invalid(
            "[simulation]\nprices_path = p.csv\nqueue_capacity = 9223372036854775807\n",
            "simulation",
            "queue_capacity",
        );
        assert_invalid(
            "[simulation]\nprices_path = p.csv\nsimulations = 18446744073709551615\n",
            "simulation",
            "simulations",
        );
        assert_invalid(
            "[simulation]\nprices_path = p.csv\nworkers = 100000\n",
            "simulation",
            "workers",
        );
    }

    #[test]
    fn misspelled_header_flag_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\nprices_has_headers = ture\n",
            "simulation",
            "prices_has_headers",
        );
    }

    #[test]
    fn header_flag_spellings_accepted() {
        for flag in ["true", "No", "1"] {
            let content =
                format!("[simulation]\nprices_path = p.csv\nprices_has_headers = {flag}\n");
            assert!(validate_simulation_config(&adapter(&content)).is_ok(), "{flag}");
        }
    }

    #[test]
    fn bad_target_return_rejected() {
        assert_invalid(
            "[simulation]\nprices_path = p.csv\n[report]\ntarget_annual_return = high\n",
            "report",
            "target_annual_return",
        );
    }
}
