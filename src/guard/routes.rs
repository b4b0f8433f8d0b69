//! Path classification shared by the edge and client guards.

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_LANDING_PATH: &str = "/";

/// Dashboard sections that require a session. `/` matches exactly; every
/// other entry also covers its sub-paths.
pub const DEFAULT_PROTECTED_PATHS: &[&str] = &[
    "/",
    "/projects",
    "/activities",
    "/partners",
    "/messages",
    "/settings",
    "/profile",
    "/change-password",
];

const ASSET_PREFIXES: &[&str] = &["/pkg/", "/assets/"];
const ASSET_FILES: &[&str] = &["/favicon.ico", "/theme.css"];

/// Static-file extensions served without a session. Dotted slugs such as
/// `/partners/acme.org` are not assets.
const ASSET_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "map", "wasm", "json", "webmanifest", "txt", "png", "jpg", "jpeg", "gif", "svg", "ico",
    "webp", "avif", "woff", "woff2", "ttf", "otf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Protected,
    Login,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    login: String,
    landing: String,
    protected: Vec<String>,
}

impl RouteTable {
    #[must_use]
    pub fn new<I>(login: &str, landing: &str, protected: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut protected: Vec<String> = protected.into_iter().map(|p| normalize_path(p.as_ref())).collect();
        protected.sort();
        protected.dedup();
        Self { login: normalize_path(login), landing: normalize_path(landing), protected }
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login
    }

    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing
    }

    /// Classify a request path. Query strings and fragments are ignored.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize_path(path);
        if path == self.login {
            return RouteClass::Login;
        }
        if is_asset(&path) {
            return RouteClass::Public;
        }
        if self.protected.iter().any(|p| matches_section(p, &path)) {
            RouteClass::Protected
        } else {
            RouteClass::Public
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PATH, DEFAULT_LANDING_PATH, DEFAULT_PROTECTED_PATHS)
    }
}

/// Strip query and fragment, force a leading `/`, collapse trailing slashes.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let path = raw.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_owned();
    }
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn matches_section(section: &str, path: &str) -> bool {
    if section == "/" {
        return path == "/";
    }
    path.strip_prefix(section)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn is_asset(path: &str) -> bool {
    if ASSET_PREFIXES.iter().any(|p| path.starts_with(p)) || ASSET_FILES.contains(&path) {
        return true;
    }
    path.rsplit('/')
        .next()
        .and_then(|last| last.rsplit_once('.'))
        .is_some_and(|(stem, ext)| {
            !stem.is_empty() && ASSET_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext))
        })
}
