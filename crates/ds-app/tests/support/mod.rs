//! In-memory port fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use ds_app::{FeatureFlagGate, LoadingOrchestrator, LoadingPorts, StateStore};
use ds_core::ports::{
    AuthPort, AuthSession, AuthorizationPort, DatabasePort, FeatureFlagStorePort,
    PlatformProbePort, StorageProbePort, UserDataPort,
};
use ds_core::{PhoneType, Platform, User, UserData, UserId};

pub const USER: &str = "user-1";

static TRACE_INIT: Once = Once::new();

pub fn init_tracing() {
    TRACE_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub struct FakeStorage {
    pub has_key_store: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl StorageProbePort for FakeStorage {
    async fn has_key_store(&self) -> anyhow::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.has_key_store)
    }
}

pub struct FakeDatabase {
    failures_left: AtomicUsize,
    pub calls: AtomicUsize,
}

#[async_trait]
impl DatabasePort for FakeDatabase {
    async fn initialize(&self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            anyhow::bail!("database is locked");
        }
        Ok(())
    }
}

pub struct FakeAuth {
    pub session: Mutex<Option<AuthSession>>,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl AuthPort for FakeAuth {
    async fn load_session(&self) -> anyhow::Result<Option<AuthSession>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.session.lock().unwrap().clone())
    }

    async fn save_session(&self, session: &AuthSession) -> anyhow::Result<()> {
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> anyhow::Result<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

/// User-data repository whose loads can be held back until released.
pub struct FakeUserData {
    pub profiles: Mutex<HashMap<UserId, UserData>>,
    pub gate: Option<Arc<Notify>>,
    pub calls: AtomicUsize,
}

impl FakeUserData {
    pub fn stored(&self, user: &str) -> Option<UserData> {
        self.profiles
            .lock()
            .unwrap()
            .get(&UserId::from(user))
            .cloned()
    }
}

#[async_trait]
impl UserDataPort for FakeUserData {
    async fn load(&self, user: &UserId) -> anyhow::Result<UserData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .get(user)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, user: &UserId, data: &UserData) -> anyhow::Result<()> {
        self.profiles
            .lock()
            .unwrap()
            .insert(user.clone(), data.clone());
        Ok(())
    }
}

pub struct FixedPlatform(pub Platform);

impl PlatformProbePort for FixedPlatform {
    fn detect(&self) -> Platform {
        self.0
    }
}

pub struct FakeAuthorization {
    pub session: AuthSession,
    pub delay: Option<Duration>,
}

#[async_trait]
impl AuthorizationPort for FakeAuthorization {
    async fn authorize(&self) -> anyhow::Result<AuthSession> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.session.clone())
    }
}

pub struct MemoryFlags(pub Mutex<Option<bool>>);

impl FeatureFlagStorePort for MemoryFlags {
    fn read_flag(&self, _key: &str) -> anyhow::Result<Option<bool>> {
        Ok(*self.0.lock().unwrap())
    }

    fn write_flag(&self, _key: &str, value: bool) -> anyhow::Result<()> {
        *self.0.lock().unwrap() = Some(value);
        Ok(())
    }
}

pub fn gate(enabled: bool) -> FeatureFlagGate {
    FeatureFlagGate::new(Arc::new(MemoryFlags(Mutex::new(Some(enabled)))))
}

pub fn complete_data(platform: Platform, phone_type: PhoneType) -> UserData {
    UserData {
        phone_type: Some(phone_type),
        storage_setup_dismissed: platform.is_macos(),
        email_onboarding_completed: true,
        email_connected: true,
        permissions_granted: platform.is_macos(),
        driver_installed: platform.is_windows() && phone_type == PhoneType::IPhone,
    }
}

pub struct Harness {
    pub storage: Arc<FakeStorage>,
    pub database: Arc<FakeDatabase>,
    pub auth: Arc<FakeAuth>,
    pub user_data: Arc<FakeUserData>,
    pub ports: LoadingPorts,
    pub orchestrator: Arc<LoadingOrchestrator>,
}

pub struct HarnessBuilder {
    platform: Platform,
    db_failures: usize,
    session: Option<AuthSession>,
    profile: Option<UserData>,
    auth_delay: Option<Duration>,
    user_data_gate: Option<Arc<Notify>>,
    timeout: Duration,
}

impl HarnessBuilder {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            db_failures: 0,
            session: None,
            profile: None,
            auth_delay: None,
            user_data_gate: None,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn returning_user(mut self, data: UserData) -> Self {
        self.session = Some(AuthSession {
            user: User::new(USER),
            is_new_user: false,
        });
        self.profile = Some(data);
        self
    }

    pub fn new_user(mut self) -> Self {
        self.session = Some(AuthSession {
            user: User::new(USER),
            is_new_user: true,
        });
        self
    }

    pub fn db_failures(mut self, count: usize) -> Self {
        self.db_failures = count;
        self
    }

    pub fn auth_delay(mut self, delay: Duration) -> Self {
        self.auth_delay = Some(delay);
        self
    }

    pub fn user_data_gate(mut self, gate: Arc<Notify>) -> Self {
        self.user_data_gate = Some(gate);
        self
    }

    pub fn build(self) -> Harness {
        init_tracing();
        let storage = Arc::new(FakeStorage {
            has_key_store: true,
            calls: AtomicUsize::new(0),
        });
        let database = Arc::new(FakeDatabase {
            failures_left: AtomicUsize::new(self.db_failures),
            calls: AtomicUsize::new(0),
        });
        let auth = Arc::new(FakeAuth {
            session: Mutex::new(self.session),
            delay: self.auth_delay,
            calls: AtomicUsize::new(0),
        });
        let mut profiles = HashMap::new();
        if let Some(data) = self.profile {
            profiles.insert(UserId::from(USER), data);
        }
        let user_data = Arc::new(FakeUserData {
            profiles: Mutex::new(profiles),
            gate: self.user_data_gate,
            calls: AtomicUsize::new(0),
        });
        let ports = LoadingPorts {
            storage: storage.clone(),
            database: database.clone(),
            auth: auth.clone(),
            user_data: user_data.clone(),
            platform: Arc::new(FixedPlatform(self.platform)),
        };
        let orchestrator = Arc::new(LoadingOrchestrator::new(
            StateStore::default().arc(),
            ports.clone(),
            self.timeout,
        ));
        Harness {
            storage,
            database,
            auth,
            user_data,
            ports,
            orchestrator,
        }
    }
}
