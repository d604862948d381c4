//! Site routes and the admin guard.

use std::fmt;

use crate::session::Session;

/// A page of the site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    Home,
    /// `/blog`
    Blog,
    /// `/blog/:slug`
    BlogPost {
        /// Post slug.
        slug: String,
    },
    /// `/projects`
    Projects,
    /// `/admin/login`
    AdminLogin,
    /// `/admin/dashboard`
    AdminDashboard,
    /// `/admin/blog/new`
    NewPost,
    /// `/admin/blog/edit/:id`
    EditPost {
        /// Post id.
        id: String,
    },
    /// `/admin/projects/new`
    NewProject,
    /// `/admin/projects/edit/:id`
    EditProject {
        /// Project id.
        id: String,
    },
}

impl Route {
    /// Match a request path. The leading slash is optional; query strings,
    /// fragments and a trailing slash are ignored. Unknown paths give `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_start_matches('/')
            .trim_end_matches('/');
        let segments: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        let route = match segments.as_slice() {
            [] => Self::Home,
            ["blog"] => Self::Blog,
            ["blog", slug] if !slug.is_empty() => Self::BlogPost {
                slug: (*slug).to_string(),
            },
            ["projects"] => Self::Projects,
            ["admin", "login"] => Self::AdminLogin,
            ["admin", "dashboard"] => Self::AdminDashboard,
            ["admin", "blog", "new"] => Self::NewPost,
            ["admin", "blog", "edit", id] if !id.is_empty() => Self::EditPost {
                id: (*id).to_string(),
            },
            ["admin", "projects", "new"] => Self::NewProject,
            ["admin", "projects", "edit", id] if !id.is_empty() => Self::EditProject {
                id: (*id).to_string(),
            },
            _ => return None,
        };
        Some(route)
    }

    /// Canonical path.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Blog => "/blog".to_string(),
            Self::BlogPost { slug } => format!("/blog/{slug}"),
            Self::Projects => "/projects".to_string(),
            Self::AdminLogin => "/admin/login".to_string(),
            Self::AdminDashboard => "/admin/dashboard".to_string(),
            Self::NewPost => "/admin/blog/new".to_string(),
            Self::EditPost { id } => format!("/admin/blog/edit/{id}"),
            Self::NewProject => "/admin/projects/new".to_string(),
            Self::EditProject { id } => format!("/admin/projects/edit/{id}"),
        }
    }

    /// Whether the page is admin-only. The login page itself is open.
    pub const fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::AdminDashboard
                | Self::NewPost
                | Self::EditPost { .. }
                | Self::NewProject
                | Self::EditProject { .. }
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Page actually shown for `route`: gated pages send logged-out visitors to
/// the login page.
pub fn guard(route: Route, session: &Session) -> Route {
    if route.requires_auth() && !session.is_authenticated() {
        tracing::debug!(requested = %route, "redirecting to login");
        Route::AdminLogin
    } else {
        route
    }
}
