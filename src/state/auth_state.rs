//! Signed-in user state and the reducer that drives it

use serde::Serialize;

use crate::auth::{
    AuthError, AuthResult, AuthService, LoginRequest, ProfileUpdate, RegisterRequest, User,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            // Until the stored session has been checked
            is_loading: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    SetLoading(bool),
    LoginSuccess(User),
    Logout,
    UpdateUser(User),
}

pub fn reduce(state: AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::SetLoading(is_loading) => AuthState { is_loading, ..state },
        AuthAction::LoginSuccess(user) => AuthState {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
        },
        AuthAction::Logout => AuthState {
            user: None,
            is_authenticated: false,
            is_loading: false,
        },
        AuthAction::UpdateUser(user) => AuthState {
            user: Some(user),
            ..state
        },
    }
}

/// Owns the auth state and persists the session whenever the user changes
pub struct AuthController {
    service: AuthService,
    state: AuthState,
}

impl AuthController {
    pub fn new(service: AuthService) -> Self {
        Self {
            service,
            state: AuthState::default(),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn service(&self) -> &AuthService {
        &self.service
    }

    pub fn dispatch(&mut self, action: AuthAction) {
        let user_changed = matches!(action, AuthAction::LoginSuccess(_) | AuthAction::UpdateUser(_));
        self.state = reduce(std::mem::take(&mut self.state), action);

        if user_changed {
            if let Some(user) = &self.state.user {
                // Failure is logged by the session manager; the in-memory login stands
                let _ = self.service.sessions().save_session(user);
            }
        }
    }

    /// Resume the stored session, if it is still valid.
    /// A resumed session is re-saved, which extends its expiry.
    pub fn restore(&mut self) -> Option<&User> {
        match self.service.sessions().get_session() {
            Some(user) => self.dispatch(AuthAction::LoginSuccess(user)),
            None => self.dispatch(AuthAction::SetLoading(false)),
        }
        self.user()
    }

    pub async fn login(&mut self, request: LoginRequest) -> AuthResult<User> {
        self.dispatch(AuthAction::SetLoading(true));
        let result = self.service.login(request).await;
        self.finish_sign_in(&result);
        result
    }

    pub async fn register(&mut self, request: RegisterRequest) -> AuthResult<User> {
        self.dispatch(AuthAction::SetLoading(true));
        let result = self.service.register(request).await;
        self.finish_sign_in(&result);
        result
    }

    fn finish_sign_in(&mut self, result: &AuthResult<User>) {
        match result {
            Ok(user) => self.dispatch(AuthAction::LoginSuccess(user.clone())),
            Err(_) => self.dispatch(AuthAction::SetLoading(false)),
        }
    }

    /// Update the signed-in user's profile
    pub async fn update_profile(&mut self, update: ProfileUpdate) -> AuthResult<User> {
        let user_id = self
            .state
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or(AuthError::UserNotFound)?;

        let user = self.service.update_profile(&user_id, update).await?;
        self.dispatch(AuthAction::UpdateUser(user.clone()));
        Ok(user)
    }

    pub fn logout(&mut self) {
        self.service.sessions().clear_session();
        self.dispatch(AuthAction::Logout);
    }
}
