//! Startup configuration: properties file, routing file, and validation.
//!
//! [`Settings::resolve`] merges CLI flags (and their environment variable
//! equivalents) over the properties file. Flags always win. The routing
//! file path, listen port, and signing key must come from one of the two;
//! the default forward URL may be left empty.

pub mod properties;
pub mod rules;
pub mod validation;

use std::path::PathBuf;

use crate::cli::RunArgs;
use crate::error::RelayError;
use crate::relay::signature::SigningKey;
use properties::Properties;

#[derive(Debug, Clone)]
pub struct Settings {
    pub router_file: PathBuf,
    pub port: u16,
    pub signing_key: SigningKey,
    pub default_target: String,
}

impl Settings {
    pub fn resolve(args: &RunArgs, props: &Properties) -> Result<Self, RelayError> {
        let router_file = args
            .router
            .clone()
            .or_else(|| props.get(properties::ROUTER_FILE).map(PathBuf::from))
            .ok_or_else(|| missing(properties::ROUTER_FILE, "--router <file>"))?;

        let port = match args.port {
            Some(port) => port,
            None => {
                let raw = props
                    .get(properties::PORT)
                    .ok_or_else(|| missing(properties::PORT, "--port <port>"))?;
                raw.parse().map_err(|e: std::num::ParseIntError| RelayError::InvalidSetting {
                    key: properties::PORT,
                    value: raw.to_string(),
                    message: e.to_string(),
                })?
            }
        };

        let signing_key = args
            .key
            .as_deref()
            .or_else(|| props.get(properties::CALLBACK_KEY))
            .map(SigningKey::new)
            .ok_or_else(|| missing(properties::CALLBACK_KEY, "--key <key>"))?;

        let default_target = args
            .default_url
            .as_deref()
            .or_else(|| props.get(properties::FORWARD_URL))
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            router_file,
            port,
            signing_key,
            default_target,
        })
    }
}

fn missing(key: &'static str, flag: &str) -> RelayError {
    RelayError::MissingSetting {
        key,
        hint: format!("Pass {flag} or set '{key}' in {}.", properties::DEFAULT_PATH),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::cli::LogLevel;

    // Built by hand so RELAY_* variables in the environment cannot leak in.
    fn run_args(router: Option<&str>, port: Option<u16>, key: Option<&str>) -> RunArgs {
        RunArgs {
            conf: None,
            router: router.map(PathBuf::from),
            port,
            key: key.map(String::from),
            default_url: None,
            host: "127.0.0.1".into(),
            log_level: LogLevel::Info,
            pretty: false,
            json: false,
            timeout: None,
            max_body: 1_048_576,
        }
    }

    fn props(content: &str) -> Properties {
        Properties::parse(content, Path::new("conf.properties")).unwrap()
    }

    const FULL: &str = "default_routerFile=router.json\n\
                        default_port=8080\n\
                        default_callbackKey=from-file\n\
                        default_forward_url=http://default\n";

    #[test]
    fn properties_alone_are_enough() {
        let settings = Settings::resolve(&run_args(None, None, None), &props(FULL)).unwrap();
        assert_eq!(settings.router_file, PathBuf::from("router.json"));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.default_target, "http://default");
    }

    #[test]
    fn flags_override_properties() {
        let args = run_args(Some("other.json"), Some(9090), Some("flag-key"));
        let settings = Settings::resolve(&args, &props(FULL)).unwrap();
        assert_eq!(settings.router_file, PathBuf::from("other.json"));
        assert_eq!(settings.port, 9090);
        let expected = SigningKey::new("flag-key");
        assert_eq!(
            crate::relay::signature::sign(b"x", &settings.signing_key),
            crate::relay::signature::sign(b"x", &expected)
        );
    }

    #[test]
    fn missing_key_is_reported() {
        let err = Settings::resolve(
            &run_args(Some("router.json"), Some(8080), None),
            &Properties::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RelayError::MissingSetting { key: properties::CALLBACK_KEY, .. }
        ));
    }

    #[test]
    fn non_numeric_port_is_reported() {
        let err = Settings::resolve(
            &run_args(None, None, None),
            &props("default_routerFile=r.json\ndefault_port=eighty\ndefault_callbackKey=k"),
        )
        .unwrap_err();
        assert!(matches!(err, RelayError::InvalidSetting { .. }));
    }

    #[test]
    fn default_url_may_be_absent() {
        let args = run_args(Some("router.json"), Some(8080), Some("k"));
        let settings = Settings::resolve(&args, &Properties::default()).unwrap();
        assert!(settings.default_target.is_empty());
    }
}
