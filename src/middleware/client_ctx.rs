use crate::db::get_db_pool;
use crate::error::OpError;
use crate::orm::users::Role;
use crate::user::Profile;
use actix_web::dev::{
    self, Extensions, Payload, Service, ServiceRequest, ServiceResponse, Transform,
};
use actix_web::http::header;
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Client data stored for a single request cycle.
/// Distinct from ClientCtx because it is defined through request data.
#[derive(Clone, Debug)]
pub struct ClientCtxInner {
    /// User data. Optional. None is an unauthenticated request.
    pub client: Option<Profile>,
    /// Time the request started, for latency logging.
    pub request_start: Instant,
}

impl Default for ClientCtxInner {
    fn default() -> Self {
        Self {
            client: None,
            request_start: Instant::now(),
        }
    }
}

impl ClientCtxInner {
    /// Resolves a bearer token to a user. Invalid and expired tokens fall
    /// back to an unauthenticated context rather than failing the request;
    /// handlers that need an identity call `require_login`.
    pub async fn from_bearer_token(token: Option<&str>) -> Self {
        let client = match token {
            Some(token) => {
                match crate::session::authenticate_by_token(get_db_pool(), token).await {
                    Ok(user) => user.map(Profile::from),
                    Err(err) => {
                        log::error!("Session lookup failed: {}", err);
                        None
                    }
                }
            }
            None => None,
        };

        ClientCtxInner {
            client,
            ..Default::default()
        }
    }
}

/// Client context passed to routes.
/// Wraps ClientCtxInner, which is set at the beginning of the request.
#[derive(Clone, Debug)]
pub struct ClientCtx(Data<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Data::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    fn get_or_default_from_extensions(extensions: &mut Extensions) -> Self {
        match extensions.get::<Data<ClientCtxInner>>() {
            // Existing record in extensions; pull it and return clone.
            Some(cbox) => Self(cbox.clone()),
            // No existing record; create and insert it.
            None => {
                let cbox = Data::new(ClientCtxInner::default());
                extensions.insert(cbox.clone());
                Self(cbox)
            }
        }
    }

    /// Returns either the user's id or None.
    pub fn get_id(&self) -> Option<i32> {
        self.0.client.as_ref().map(|u| u.id)
    }

    pub fn get_user(&self) -> Option<&Profile> {
        self.0.client.as_ref()
    }

    pub fn get_role(&self) -> Option<&Role> {
        self.0.client.as_ref().map(|u| &u.role)
    }

    /// Returns either the user's name or a guest placeholder.
    pub fn get_name(&self) -> String {
        match &self.0.client {
            Some(user) => user.name.to_owned(),
            None => "Guest".to_owned(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.0.client.is_some()
    }

    pub fn is_staff(&self) -> bool {
        self.get_role().map(crate::permission::is_staff).unwrap_or(false)
    }

    /// Require user to be logged in. Returns the user id.
    pub fn require_login(&self) -> Result<i32, OpError> {
        self.get_id()
            .ok_or_else(|| OpError::unauthorized("Login required"))
    }

    /// Require a staff role (moderation capability). Returns the profile so
    /// callers can record the moderator identity.
    pub fn require_staff(&self) -> Result<&Profile, OpError> {
        let user = self
            .get_user()
            .ok_or_else(|| OpError::unauthorized("Login required"))?;
        if crate::permission::is_staff(&user.role) {
            Ok(user)
        } else {
            Err(OpError::forbidden("Staff access required"))
        }
    }

    /// Require the admin role. Destructive global operations only.
    pub fn require_admin(&self) -> Result<&Profile, OpError> {
        let user = self
            .get_user()
            .ok_or_else(|| OpError::unauthorized("Login required"))?;
        if crate::permission::is_admin(&user.role) {
            Ok(user)
        } else {
            Err(OpError::forbidden("Admin access required"))
        }
    }

    /// Check if user can modify content (owner or staff).
    pub fn can_modify(&self, resource_user_id: Option<i32>) -> bool {
        if self.is_staff() {
            return true;
        }

        match (self.get_id(), resource_user_id) {
            (Some(user_id), Some(owner_id)) => user_id == owner_id,
            _ => false,
        }
    }

    /// Require ownership of a resource, with no staff override.
    pub fn require_ownership(&self, resource_user_id: Option<i32>) -> Result<(), OpError> {
        let user_id = self.require_login()?;

        match resource_user_id {
            Some(owner_id) if owner_id == user_id => Ok(()),
            _ => Err(OpError::forbidden("You don't own this resource")),
        }
    }

    /// Returns Duration representing request time.
    pub fn request_time(&self) -> Duration {
        Instant::now() - self.0.request_start
    }
}

/// This implementation is what actually provides the `client: ClientCtx` in the parameters of route functions.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::get_or_default_from_extensions(
            &mut req.extensions_mut(),
        )))
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Client context middleware
pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();

        // The token must be copied out of the headers before the request is
        // moved into the future.
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_owned());

        Box::pin(async move {
            let inner = ClientCtxInner::from_bearer_token(token.as_deref()).await;
            req.extensions_mut().insert(Data::new(inner));

            svc.call(req).await
        })
    }
}
