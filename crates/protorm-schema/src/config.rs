use crate::prelude::*;
use log::debug;

///
/// Config
/// run-wide generator options
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    pub engine: Engine,
    pub enums: EnumMode,

    /// Report creates from strict update through `Context::set_created`.
    pub gateway: bool,

    /// Silence resolver warnings.
    pub quiet: bool,

    pub marker_match: MarkerMatch,

    /// Rust path prefix used to reach the modules of other proto packages.
    pub package_root: String,
}

impl Config {
    pub const DEFAULT_PACKAGE_ROOT: &'static str = "super";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a plugin parameter string such as
    /// `engine=postgres,enums=string,gateway,quiet`.
    ///
    /// Values compare case-insensitively; unknown keys are ignored.
    #[must_use]
    pub fn from_parameter(param: &str) -> Self {
        let mut config = Self::default();

        for part in param.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));

            match key {
                "engine" if value.eq_ignore_ascii_case("postgres") => {
                    config.engine = Engine::Postgres;
                }
                "engine" => config.engine = Engine::Unset,
                "enums" if value.eq_ignore_ascii_case("string") => {
                    config.enums = EnumMode::Name;
                }
                "enums" => config.enums = EnumMode::Ordinal,
                "gateway" => config.gateway = true,
                "quiet" => config.quiet = true,
                "marker_match" if value.eq_ignore_ascii_case("qualified") => {
                    config.marker_match = MarkerMatch::Qualified;
                }
                "marker_match" => config.marker_match = MarkerMatch::Suffix,
                "package_root" if !value.is_empty() => {
                    config.package_root = value.to_string();
                }
                _ => debug!("ignoring generator parameter '{part}'"),
            }
        }

        config
    }

    #[must_use]
    pub const fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub const fn with_enums(mut self, enums: EnumMode) -> Self {
        self.enums = enums;
        self
    }

    #[must_use]
    pub const fn with_gateway(mut self, gateway: bool) -> Self {
        self.gateway = gateway;
        self
    }

    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    #[must_use]
    pub const fn with_marker_match(mut self, marker_match: MarkerMatch) -> Self {
        self.marker_match = marker_match;
        self
    }

    #[must_use]
    pub fn with_package_root(mut self, root: impl Into<String>) -> Self {
        self.package_root = root.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            enums: EnumMode::default(),
            gateway: false,
            quiet: false,
            marker_match: MarkerMatch::default(),
            package_root: Self::DEFAULT_PACKAGE_ROOT.to_string(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_string_sets_every_option() {
        let config = Config::from_parameter(
            "engine=Postgres,enums=string,gateway,quiet,marker_match=qualified,package_root=crate::pb",
        );

        assert_eq!(config.engine, Engine::Postgres);
        assert_eq!(config.enums, EnumMode::Name);
        assert!(config.gateway);
        assert!(config.quiet);
        assert_eq!(config.marker_match, MarkerMatch::Qualified);
        assert_eq!(config.package_root, "crate::pb");
    }

    #[test]
    fn unknown_and_empty_parameters_keep_defaults() {
        let config = Config::from_parameter("paths=source_relative,,engine=mysql");

        assert_eq!(config, Config::default(), "unknown keys are ignored");
        assert_eq!(config.package_root, "super");
    }

    #[test]
    fn json_config_defaults_missing_keys() {
        let config: Config =
            serde_json::from_str(r#"{ "engine": "postgres" }"#).expect("config json should parse");

        assert_eq!(config, Config::new().with_engine(Engine::Postgres));
    }
}
