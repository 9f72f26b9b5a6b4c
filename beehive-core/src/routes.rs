//! Role-gated navigation.
//!
//! Each route is tagged with the capability it needs; resolving a path against a
//! session yields either the page to render or where to send the viewer instead.

use std::collections::HashMap;
use std::fmt;

use crate::models::{Role, Session};

pub const SIGN_IN: &str = "/sign-in";
pub const LANDING: &str = "/landing";
pub const NO_ACCESS: &str = "/no-access";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Gallery,
    Upload,
    AdminDashboard,
    AdminUsers,
    AdminUserUploads,
    AdminAnalytics,
    SignIn,
    SignUp,
    Landing,
    NoAccess,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Gallery => "Gallery",
            Page::Upload => "Upload",
            Page::AdminDashboard => "Dashboard",
            Page::AdminUsers => "Users",
            Page::AdminUserUploads => "User Uploads",
            Page::AdminAnalytics => "Analytics",
            Page::SignIn => "Sign In",
            Page::SignUp => "Sign Up",
            Page::Landing => "Welcome",
            Page::NoAccess => "No Access",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Public,
    Role(Role),
}

impl Capability {
    fn redirect_for(&self, session: Option<&Session>) -> Option<&'static str> {
        match (self, session) {
            (Capability::Public, _) => None,
            (Capability::Role(_), None) => Some(SIGN_IN),
            (Capability::Role(required), Some(session)) if session.role() == *required => None,
            (Capability::Role(Role::Admin), Some(_)) => Some(NO_ACCESS),
            (Capability::Role(Role::User), Some(_)) => Some(LANDING),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: &'static str,
    pub page: Page,
    pub capability: Capability,
    /// Shown in the navigation bar of sessions holding the capability.
    pub nav: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render {
        page: Page,
        params: HashMap<String, String>,
    },
    Redirect(&'static str),
    NotFound,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Render { page, .. } => write!(f, "render {}", page.title()),
            Resolution::Redirect(to) => write!(f, "redirect {}", to),
            Resolution::NotFound => write!(f, "not found"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn standard() -> Self {
        let user = Capability::Role(Role::User);
        let admin = Capability::Role(Role::Admin);
        let route = |pattern, page, capability, nav| Route {
            pattern,
            page,
            capability,
            nav,
        };

        Self::new(vec![
            route("/", Page::Home, user, true),
            route("/gallery", Page::Gallery, user, true),
            route("/upload", Page::Upload, user, true),
            route("/admin", Page::AdminDashboard, admin, true),
            route("/admin/users", Page::AdminUsers, admin, true),
            route("/admin/users/:id/uploads", Page::AdminUserUploads, admin, false),
            route("/admin/analytics", Page::AdminAnalytics, admin, true),
            route(SIGN_IN, Page::SignIn, Capability::Public, false),
            route("/sign-up", Page::SignUp, Capability::Public, false),
            route(LANDING, Page::Landing, Capability::Public, false),
            route(NO_ACCESS, Page::NoAccess, Capability::Public, false),
        ])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn resolve(&self, path: &str, session: Option<&Session>) -> Resolution {
        for route in &self.routes {
            if let Some(params) = match_pattern(route.pattern, path) {
                return match route.capability.redirect_for(session) {
                    Some(to) => Resolution::Redirect(to),
                    None => Resolution::Render {
                        page: route.page,
                        params,
                    },
                };
            }
        }
        Resolution::NotFound
    }

    /// Navigation entries for a role, in table order.
    pub fn nav_for(&self, role: Role) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|route| route.nav && route.capability == Capability::Role(role))
            .collect()
    }

    /// Where a freshly signed-in session lands.
    pub fn home_for(&self, role: Role) -> &'static str {
        self.nav_for(role)
            .first()
            .map(|route| route.pattern)
            .unwrap_or(LANDING)
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    let path = if trimmed.is_empty() { "/" } else { trimmed };

    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();
    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (expected, actual) in pattern_parts.iter().zip(&path_parts) {
        if let Some(name) = expected.strip_prefix(':') {
            if actual.is_empty() {
                return None;
            }
            params.insert(name.to_string(), actual.to_string());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;

    fn session(role: Role) -> Session {
        Session::new(Credential::bearer("t"), "id-1", role)
    }

    fn page(resolution: Resolution) -> Option<Page> {
        match resolution {
            Resolution::Render { page, .. } => Some(page),
            _ => None,
        }
    }

    #[test]
    fn test_signed_out_goes_to_sign_in() {
        let table = RouteTable::standard();
        assert_eq!(table.resolve("/gallery", None), Resolution::Redirect(SIGN_IN));
        assert_eq!(table.resolve("/admin", None), Resolution::Redirect(SIGN_IN));
        assert_eq!(page(table.resolve("/sign-in", None)), Some(Page::SignIn));
    }

    #[test]
    fn test_admin_paths_reject_users() {
        let table = RouteTable::standard();
        let user = session(Role::User);
        assert_eq!(
            table.resolve("/admin/analytics", Some(&user)),
            Resolution::Redirect(NO_ACCESS)
        );
        assert_eq!(page(table.resolve("/gallery/", Some(&user))), Some(Page::Gallery));
    }

    #[test]
    fn test_user_paths_reject_admins() {
        let table = RouteTable::standard();
        let admin = session(Role::Admin);
        assert_eq!(table.resolve("/upload", Some(&admin)), Resolution::Redirect(LANDING));
        assert_eq!(page(table.resolve("/admin", Some(&admin))), Some(Page::AdminDashboard));
    }

    #[test]
    fn test_path_params() {
        let table = RouteTable::standard();
        let admin = session(Role::Admin);
        match table.resolve("/admin/users/user-42/uploads?x=1", Some(&admin)) {
            Resolution::Render { page, params } => {
                assert_eq!(page, Page::AdminUserUploads);
                assert_eq!(params.get("id").map(String::as_str), Some("user-42"));
            }
            other => panic!("unexpected {other}"),
        }
        assert_eq!(table.resolve("/nowhere", Some(&admin)), Resolution::NotFound);
    }

    #[test]
    fn test_nav_per_role() {
        let table = RouteTable::standard();
        let titles: Vec<_> = table
            .nav_for(Role::Admin)
            .iter()
            .map(|route| route.page.title())
            .collect();
        assert_eq!(titles, vec!["Dashboard", "Users", "Analytics"]);
        assert_eq!(table.home_for(Role::User), "/");
        assert_eq!(table.home_for(Role::Admin), "/admin");
    }
}
