//! Page environment injected by the server-rendered shell as JS globals:
//! the REST base path plus the acting identity used for the domain-name
//! prefix hint.

use js_sys::Reflect;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFlags {
    pub user: bool,
    pub admin: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEnv {
    pub uri_base: String,
    pub user_name: String,
    pub roles: RoleFlags,
}

impl PageEnv {
    /// Reads `uri_base`, `user_name` and `active_roles` from the window.
    /// Missing globals degrade to empty values rather than failing the boot.
    pub fn from_globals() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let window: &JsValue = window.as_ref();

        let roles = Reflect::get(window, &JsValue::from_str("active_roles"))
            .map(|value| RoleFlags {
                user: truthy_property(&value, "User"),
                admin: truthy_property(&value, "Admin"),
            })
            .unwrap_or_default();

        Self {
            uri_base: string_global(window, "uri_base"),
            user_name: string_global(window, "user_name"),
            roles,
        }
    }
}

/// Non-admin users get their submitted domain names prefixed server-side;
/// the text field's label warns them up front.
pub fn needs_prefix(param: &str, env: &PageEnv) -> bool {
    param == "domain_name" && env.roles.user && !env.roles.admin
}

fn string_global(target: &JsValue, name: &str) -> String {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default()
}

fn truthy_property(target: &JsValue, name: &str) -> bool {
    Reflect::get(target, &JsValue::from_str(name))
        .map(|value| value.is_truthy())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{needs_prefix, PageEnv, RoleFlags};

    fn env(user: bool, admin: bool) -> PageEnv {
        PageEnv {
            uri_base: String::new(),
            user_name: "alice".to_string(),
            roles: RoleFlags { user, admin },
        }
    }

    #[test]
    fn prefix_hint_only_for_plain_users_on_domain_name() {
        assert!(needs_prefix("domain_name", &env(true, false)));
        assert!(!needs_prefix("domain_name", &env(true, true)));
        assert!(!needs_prefix("domain_name", &env(false, false)));
        assert!(!needs_prefix("other_param", &env(true, false)));
    }
}
