//! Config value utils.

use std::collections::HashMap;

use crate::core::error::ConfigError;

/// Parses config value string, which consists of two parts - name and options.
/// Example: `D[fraction=0.3]` parts are name `D` and options string `fraction=0.3`.
pub fn parse_config_value(config_str: &str) -> (String, Option<String>) {
    match config_str.split_once('[') {
        Some((l, r)) => (l.trim().to_string(), Some(r.replace(']', ""))),
        None => (config_str.trim().to_string(), None),
    }
}

/// Parses options string from config value, returns map with option names and values.
pub fn parse_options(options_str: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for option_str in options_str.split(',') {
        if let Some((name, value)) = option_str.split_once('=') {
            options.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    options
}

/// Reads a numeric option, falling back to the default value if the option is absent.
pub fn option_f64(options: &HashMap<String, String>, name: &str, default: f64) -> Result<f64, ConfigError> {
    match options.get(name) {
        Some(value) => value
            .parse::<f64>()
            .map_err(|e| ConfigError::invalid(name, format!("can't parse `{}`: {}", value, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_value() {
        assert_eq!(parse_config_value("F"), ("F".to_string(), None));
        assert_eq!(
            parse_config_value("G[mean=0.4,stddev=0.2]"),
            ("G".to_string(), Some("mean=0.4,stddev=0.2".to_string()))
        );
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options("option1=0.8, option2=something");
        assert_eq!(options.get("option1").unwrap(), "0.8");
        assert_eq!(options.get("option2").unwrap(), "something");
        assert_eq!(options.get("option3"), None);
        assert_eq!(option_f64(&options, "option1", 0.).unwrap(), 0.8);
        assert_eq!(option_f64(&options, "option3", 0.5).unwrap(), 0.5);
        assert!(option_f64(&options, "option2", 0.).is_err());
    }
}
