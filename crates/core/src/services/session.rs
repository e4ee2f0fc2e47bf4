//! Session state and route guards.
//!
//! A session moves through `Unauthenticated`, `Authenticating` while
//! credentials are checked, then settles on `AuthenticatedNoProfile` or
//! `AuthenticatedWithProfile` once the profile lookup returns. Guards decide
//! where a session may navigate.

use serde::{Deserialize, Serialize};

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    /// No valid credentials.
    Unauthenticated,
    /// Credentials are being checked.
    Authenticating,
    /// Signed in, no profile yet.
    AuthenticatedNoProfile,
    /// Signed in with a profile.
    AuthenticatedWithProfile,
}

impl SessionState {
    /// Settle the state once identity and profile lookups have resolved.
    #[must_use]
    pub const fn resolve(authenticated: bool, has_profile: bool) -> Self {
        match (authenticated, has_profile) {
            (false, _) => Self::Unauthenticated,
            (true, false) => Self::AuthenticatedNoProfile,
            (true, true) => Self::AuthenticatedWithProfile,
        }
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(
            self,
            Self::AuthenticatedNoProfile | Self::AuthenticatedWithProfile
        )
    }
}

/// Who is acting on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    /// User ID.
    pub id: String,
    /// Whether the user may manage everyone's content.
    pub is_admin: bool,
}

impl Viewer {
    /// Whether the viewer may modify something owned by `owner_id`.
    #[must_use]
    pub fn can_manage(&self, owner_id: &str) -> bool {
        self.is_admin || self.id == owner_id
    }
}

/// Pages of the web application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Register,
    Login,
    CreateProfile,
    EditProfile,
    Settings,
    Home,
    Content,
    CreateContent,
    Admin,
    NotFound,
}

impl Route {
    /// Map a path onto a route. Unknown paths are `NotFound`.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Landing,
            "/register" => Self::Register,
            "/login" => Self::Login,
            "/create-profile" => Self::CreateProfile,
            "/edit-profile" => Self::EditProfile,
            "/settings" => Self::Settings,
            "/home" => Self::Home,
            "/content" => Self::Content,
            "/create-content" => Self::CreateContent,
            "/admin" => Self::Admin,
            _ => Self::NotFound,
        }
    }

    /// Canonical path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Register => "/register",
            Self::Login => "/login",
            Self::CreateProfile => "/create-profile",
            Self::EditProfile => "/edit-profile",
            Self::Settings => "/settings",
            Self::Home => "/home",
            Self::Content => "/content",
            Self::CreateContent => "/create-content",
            Self::Admin => "/admin",
            Self::NotFound => "/404",
        }
    }

    /// Requires a signed-in user.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(
            self,
            Self::CreateProfile
                | Self::EditProfile
                | Self::Settings
                | Self::Home
                | Self::Content
                | Self::CreateContent
                | Self::Admin
        )
    }

    /// Requires a profile as well.
    #[must_use]
    pub const fn requires_profile(self) -> bool {
        matches!(
            self,
            Self::EditProfile | Self::Home | Self::Content | Self::Settings
        )
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Navigation {
    /// Render the requested page.
    Allow {
        /// Path that will be rendered.
        path: &'static str,
    },
    /// Go somewhere else instead.
    Redirect {
        /// Path to go to.
        to: &'static str,
    },
    /// No such page.
    NotFound,
}

/// Decide where a session may go.
#[must_use]
pub const fn guard(route: Route, state: SessionState, is_admin: bool) -> Navigation {
    if matches!(route, Route::NotFound) {
        return Navigation::NotFound;
    }

    // Still checking credentials: treat as signed out
    if route.is_protected() && !state.is_authenticated() {
        return Navigation::Redirect {
            to: Route::Login.path(),
        };
    }

    if route.requires_profile() && matches!(state, SessionState::AuthenticatedNoProfile) {
        return Navigation::Redirect {
            to: Route::CreateProfile.path(),
        };
    }

    if matches!(route, Route::CreateProfile)
        && matches!(state, SessionState::AuthenticatedWithProfile)
    {
        return Navigation::Redirect {
            to: Route::Home.path(),
        };
    }

    if matches!(route, Route::Admin) && !is_admin {
        return Navigation::Redirect {
            to: Route::Home.path(),
        };
    }

    Navigation::Allow { path: route.path() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_protected_route_redirects_to_login() {
        for path in [
            "/create-profile",
            "/edit-profile",
            "/settings",
            "/home",
            "/content",
            "/create-content",
            "/admin",
        ] {
            assert_eq!(
                guard(Route::from_path(path), SessionState::Unauthenticated, false),
                Navigation::Redirect { to: "/login" },
                "{path}"
            );
        }
    }

    #[test]
    fn test_authenticating_is_treated_as_signed_out() {
        assert_eq!(
            guard(Route::Home, SessionState::Authenticating, false),
            Navigation::Redirect { to: "/login" }
        );
    }

    #[test]
    fn test_public_routes_are_open() {
        for route in [Route::Landing, Route::Login, Route::Register] {
            assert!(matches!(
                guard(route, SessionState::Unauthenticated, false),
                Navigation::Allow { .. }
            ));
        }
    }

    #[test]
    fn test_profile_required() {
        assert_eq!(
            guard(Route::Home, SessionState::AuthenticatedNoProfile, false),
            Navigation::Redirect {
                to: "/create-profile"
            }
        );
        assert_eq!(
            guard(Route::CreateContent, SessionState::AuthenticatedNoProfile, false),
            Navigation::Allow {
                path: "/create-content"
            }
        );
    }

    #[test]
    fn test_create_profile_with_profile_goes_home() {
        assert_eq!(
            guard(
                Route::CreateProfile,
                SessionState::AuthenticatedWithProfile,
                false
            ),
            Navigation::Redirect { to: "/home" }
        );
    }

    #[test]
    fn test_admin_requires_admin() {
        assert_eq!(
            guard(Route::Admin, SessionState::AuthenticatedWithProfile, false),
            Navigation::Redirect { to: "/home" }
        );
        assert_eq!(
            guard(Route::Admin, SessionState::AuthenticatedWithProfile, true),
            Navigation::Allow { path: "/admin" }
        );
    }

    #[test]
    fn test_route_from_path() {
        assert_eq!(Route::from_path("/"), Route::Landing);
        assert_eq!(Route::from_path("/home/"), Route::Home);
        assert_eq!(Route::from_path("/login?next=/home"), Route::Login);
        assert_eq!(Route::from_path("/nope"), Route::NotFound);
        assert_eq!(
            guard(Route::NotFound, SessionState::Unauthenticated, false),
            Navigation::NotFound
        );
    }

    #[test]
    fn test_viewer_can_manage() {
        let owner = Viewer {
            id: "u1".to_string(),
            is_admin: false,
        };
        let admin = Viewer {
            id: "a1".to_string(),
            is_admin: true,
        };
        assert!(owner.can_manage("u1"));
        assert!(!owner.can_manage("u2"));
        assert!(admin.can_manage("u2"));
    }

    #[test]
    fn test_resolve_state() {
        assert_eq!(
            SessionState::resolve(false, true),
            SessionState::Unauthenticated
        );
        assert_eq!(
            SessionState::resolve(true, false),
            SessionState::AuthenticatedNoProfile
        );
        assert_eq!(
            SessionState::resolve(true, true),
            SessionState::AuthenticatedWithProfile
        );
    }
}
