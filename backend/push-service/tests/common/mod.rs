//! In-memory collaborators for push-service tests. Each fake counts its
//! calls so tests can assert which parts of the pipeline ran.
#![allow(dead_code)]

use async_trait::async_trait;
use gala_fcm_shared::{
    AccessToken, AssertionSigner, FCMError, FcmNotification, JwtClaims, ServiceAccountKey,
    SignedAssertion, TokenExchanger,
};
use push_service::auth::{CallerAuthorizer, IdentityProvider, RoleStore};
use push_service::models::CallerIdentity;
use push_service::{
    AppError, FanOutDispatcher, PushDispatchService, PushGateway, RecipientResolver, TokenStore,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const ADMIN_TOKEN: &str = "admin-session-token";
pub const PLAYER_TOKEN: &str = "player-session-token";
pub const PROJECT_ID: &str = "gala-cup";

pub struct FakeIdentity {
    users: HashMap<String, CallerIdentity>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn resolve_user(&self, bearer: &str) -> push_service::Result<Option<CallerIdentity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.get(bearer).copied())
    }
}

pub struct FakeRoles {
    roles: HashMap<Uuid, String>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl RoleStore for FakeRoles {
    async fn role_of(&self, user_id: Uuid) -> push_service::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.roles.get(&user_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeTokenStore {
    tokens: Mutex<Vec<String>>,
    fail_with: Mutex<Option<String>>,
    pub upserted: Mutex<Vec<(Uuid, String)>>,
    pub list_calls: AtomicUsize,
}

#[async_trait]
impl TokenStore for FakeTokenStore {
    async fn list_device_tokens(&self) -> push_service::Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(AppError::Upstream(message));
        }
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn upsert_device_token(&self, user_id: Uuid, token: &str) -> push_service::Result<()> {
        self.upserted
            .lock()
            .unwrap()
            .push((user_id, token.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingSigner {
    pub calls: AtomicUsize,
    pub claims: Mutex<Vec<JwtClaims>>,
}

impl AssertionSigner for CountingSigner {
    fn sign(&self, claims: &JwtClaims) -> Result<SignedAssertion, FCMError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.claims.lock().unwrap().push(claims.clone());
        Ok(SignedAssertion::new(format!("assertion-{}", n)))
    }
}

#[derive(Default)]
pub struct FakeExchanger {
    pub calls: AtomicUsize,
    pub assertions: Mutex<Vec<String>>,
    fail_with: Mutex<Option<String>>,
}

#[async_trait]
impl TokenExchanger for FakeExchanger {
    async fn exchange(&self, assertion: &SignedAssertion) -> Result<AccessToken, FCMError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.assertions
            .lock()
            .unwrap()
            .push(assertion.as_str().to_string());
        if let Some(body) = self.fail_with.lock().unwrap().clone() {
            return Err(FCMError::TokenExchange(body));
        }
        Ok(AccessToken::new(format!("ya29.fake-{}", n)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub access_token: String,
    pub project_id: String,
    pub device_token: String,
    pub title: String,
    pub body: String,
}

#[derive(Default)]
pub struct FakeGateway {
    rejected: Mutex<HashSet<String>>,
    pub deliveries: Mutex<Vec<Delivery>>,
}

impl FakeGateway {
    pub fn attempts(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

#[async_trait]
impl PushGateway for FakeGateway {
    async fn send(
        &self,
        access_token: &AccessToken,
        project_id: &str,
        device_token: &str,
        notification: &FcmNotification,
    ) -> Result<(), FCMError> {
        self.deliveries.lock().unwrap().push(Delivery {
            access_token: access_token.as_str().to_string(),
            project_id: project_id.to_string(),
            device_token: device_token.to_string(),
            title: notification.title.clone(),
            body: notification.body.clone(),
        });

        if self.rejected.lock().unwrap().contains(device_token) {
            return Err(FCMError::Delivery {
                status: 404,
                body: r#"{"error":{"status":"NOT_FOUND","details":[{"errorCode":"UNREGISTERED"}]}}"#
                    .to_string(),
            });
        }
        Ok(())
    }
}

pub struct Harness {
    pub admin_id: Uuid,
    pub player_id: Uuid,
    pub identity: Arc<FakeIdentity>,
    pub roles: Arc<FakeRoles>,
    pub store: Arc<FakeTokenStore>,
    pub signer: Arc<CountingSigner>,
    pub exchanger: Arc<FakeExchanger>,
    pub gateway: Arc<FakeGateway>,
}

impl Harness {
    pub fn new() -> Self {
        let admin_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();

        let users = HashMap::from([
            (
                ADMIN_TOKEN.to_string(),
                CallerIdentity { user_id: admin_id },
            ),
            (
                PLAYER_TOKEN.to_string(),
                CallerIdentity { user_id: player_id },
            ),
        ]);
        let roles = HashMap::from([
            (admin_id, "admin".to_string()),
            (player_id, "player".to_string()),
        ]);

        Self {
            admin_id,
            player_id,
            identity: Arc::new(FakeIdentity {
                users,
                calls: AtomicUsize::new(0),
            }),
            roles: Arc::new(FakeRoles {
                roles,
                calls: AtomicUsize::new(0),
            }),
            store: Arc::new(FakeTokenStore::default()),
            signer: Arc::new(CountingSigner::default()),
            exchanger: Arc::new(FakeExchanger::default()),
            gateway: Arc::new(FakeGateway::default()),
        }
    }

    pub fn with_device_tokens(self, tokens: &[&str]) -> Self {
        *self.store.tokens.lock().unwrap() = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_rejected_tokens(self, tokens: &[&str]) -> Self {
        *self.gateway.rejected.lock().unwrap() = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_failing_exchange(self, body: &str) -> Self {
        *self.exchanger.fail_with.lock().unwrap() = Some(body.to_string());
        self
    }

    pub fn with_failing_store(self, message: &str) -> Self {
        *self.store.fail_with.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn service(&self) -> PushDispatchService {
        PushDispatchService::new(
            CallerAuthorizer::new(self.identity.clone(), self.roles.clone()),
            RecipientResolver::new(self.store.clone()),
            self.signer.clone(),
            self.exchanger.clone(),
            FanOutDispatcher::new(self.gateway.clone(), 4),
            Arc::new(service_account("not-a-real-key")),
        )
    }

    pub fn store_queries(&self) -> usize {
        self.store.list_calls.load(Ordering::SeqCst)
    }

    pub fn mints(&self) -> usize {
        self.signer.calls.load(Ordering::SeqCst)
    }

    pub fn exchanges(&self) -> usize {
        self.exchanger.calls.load(Ordering::SeqCst)
    }
}

pub fn service_account(private_key: &str) -> ServiceAccountKey {
    ServiceAccountKey {
        project_id: PROJECT_ID.to_string(),
        private_key_id: "key-id".to_string(),
        private_key: private_key.to_string(),
        client_email: "push@gala-cup.iam.gserviceaccount.com".to_string(),
        client_id: "123456".to_string(),
        auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
    }
}
