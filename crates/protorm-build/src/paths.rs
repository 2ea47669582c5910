use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

const INTERNAL_CRATES: &[&str] = &[
    "protorm",
    "protorm-build",
    "protorm-core",
    "protorm-schema",
    "protorm-utils",
];

fn env_path(name: &str) -> Option<TokenStream> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .and_then(|value| syn::parse_str::<Path>(&value).ok())
        .map(|path| quote!(#path))
}

///
/// CratePaths
///
/// Resolves the runtime crate root used by generated code. Internal protorm
/// crates use the direct crate name; everything else goes through the
/// `protorm::core` facade. `PROTORM_CORE_CRATE` overrides both.
///

#[derive(Clone, Debug)]
pub struct CratePaths {
    pub core: TokenStream,
}

impl CratePaths {
    #[must_use]
    pub fn new() -> Self {
        let pkg = std::env::var("CARGO_PKG_NAME").unwrap_or_default();

        let core = if INTERNAL_CRATES.contains(&pkg.as_str()) {
            quote!(::protorm_core)
        } else {
            quote!(::protorm::core)
        };

        Self {
            core: env_path("PROTORM_CORE_CRATE").unwrap_or(core),
        }
    }

    /// Fixed runtime path, ignoring the environment.
    #[must_use]
    pub const fn with_core(core: TokenStream) -> Self {
        Self { core }
    }
}

impl Default for CratePaths {
    fn default() -> Self {
        Self::new()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TempEnv {
        key: &'static str,
        prev: Option<String>,
    }

    impl TempEnv {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let prev = env::var(key).ok();
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
            Self { key, prev }
        }
    }

    impl Drop for TempEnv {
        fn drop(&mut self) {
            unsafe {
                match &self.prev {
                    Some(value) => env::set_var(self.key, value),
                    None => env::remove_var(self.key),
                }
            }
        }
    }

    #[test]
    fn uses_internal_crate_name_inside_workspace() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _pkg = TempEnv::set("CARGO_PKG_NAME", Some("protorm-core"));
        let _core = TempEnv::set("PROTORM_CORE_CRATE", None);

        let paths = CratePaths::new();

        assert_eq!(paths.core.to_string(), quote!(::protorm_core).to_string());
    }

    #[test]
    fn external_consumers_use_the_facade_or_override() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _pkg = TempEnv::set("CARGO_PKG_NAME", Some("external-app"));
        let _core = TempEnv::set("PROTORM_CORE_CRATE", None);

        assert_eq!(
            CratePaths::new().core.to_string(),
            quote!(::protorm::core).to_string()
        );

        let _core = TempEnv::set("PROTORM_CORE_CRATE", Some("custom::runtime"));
        assert_eq!(
            CratePaths::new().core.to_string(),
            quote!(custom::runtime).to_string()
        );
    }
}
