//! 초기화 가드 및 상태 보고
//!
//! 엔진은 프로세스 수명 동안 정확히 한 번 초기화됩니다. 동시에 여러 호출이 들어오면
//! 첫 호출만 초기화 본문을 실행하고 나머지는 완료될 때까지 대기한 뒤 같은 결과를 봅니다.
//! 실패는 sticky하며 재시도하지 않습니다.
//!
//! 초기화 본문은 호출자와 분리된 태스크에서 실행되므로, 기다리던 호출자가 취소되어도
//! 본문은 끝까지 실행되고 결과가 기록됩니다.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use chrono::Duration;
use serde::Serialize;
use tokio::sync::watch;

use crate::config::AuthConfig;
use crate::engine::AuthEngine;
use crate::error::{AuthError, Result};
use crate::store::PgUserStore;
use crate::user::User;

/// 초기화 결과 (엔진 또는 terminal error)
type Outcome = std::result::Result<Arc<AuthEngine>, AuthError>;

/// 초기화 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HealthStatus {
    /// 아직 초기화되지 않음
    Uninitialized,

    /// 정상
    Healthy,

    /// 초기화 실패 (sticky)
    Failed { code: String, message: String },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// 1회 초기화 가드
pub struct Bootstrap {
    /// 초기화 태스크가 결과를 게시하는 채널 (최초 호출 시 한 번만 생성)
    pending: OnceLock<watch::Receiver<Option<Outcome>>>,

    /// 확정된 결과 캐시 (이후 조회는 잠금 없이)
    outcome: OnceLock<Outcome>,
}

impl Bootstrap {
    pub const fn new() -> Self {
        Self {
            pending: OnceLock::new(),
            outcome: OnceLock::new(),
        }
    }

    /// 환경변수 설정으로 PostgreSQL에 연결해 초기화
    pub async fn initialize(&self) {
        self.initialize_with(connect_from_env).await
    }

    /// 주어진 초기화 함수로 초기화
    ///
    /// 이미 초기화됐거나 진행 중이라면 `init`은 호출되지 않고 진행 중인 결과를 기다립니다.
    /// 본문은 별도 태스크에서 실행되므로 이 future를 drop해도 초기화는 중단되지 않습니다.
    pub async fn initialize_with<F, Fut>(&self, init: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AuthEngine>> + Send + 'static,
    {
        let mut rx = self.pending.get_or_init(|| spawn_initializer(init())).clone();

        // 송신측이 사라져도 마지막 값은 남아 있으므로 에러는 무시
        let _ = rx.wait_for(Option::is_some).await;
    }

    /// 초기화 결과 확인
    ///
    /// - 초기화 전 (또는 진행 중): `Ok(())`가 아니라 `NotInitialized`
    /// - 실패: 기록된 terminal error 그대로
    pub fn health_check(&self) -> Result<()> {
        self.engine().map(|_| ())
    }

    /// 직렬화 가능한 상태
    pub fn status(&self) -> HealthStatus {
        match self.outcome() {
            None => HealthStatus::Uninitialized,
            Some(Ok(_)) => HealthStatus::Healthy,
            Some(Err(e)) => HealthStatus::Failed {
                code: e.code().to_string(),
                message: e.to_string(),
            },
        }
    }

    /// 초기화된 엔진
    pub fn engine(&self) -> Result<Arc<AuthEngine>> {
        match self.outcome() {
            None => Err(AuthError::NotInitialized),
            Some(Ok(engine)) => Ok(engine.clone()),
            Some(Err(e)) => Err(e.clone()),
        }
    }

    /// 토큰 발급 (초기화 실패 시 즉시 에러)
    pub fn generate_token(&self, user: &User, validity: Duration) -> Result<String> {
        self.engine()?.generate_token(user, validity)
    }

    /// 토큰 검증 (초기화 실패 시 저장소 접근 없이 즉시 에러)
    pub async fn validate_token(&self, token: &str) -> Result<User> {
        let engine = self.engine()?;
        engine.validate_token(token).await
    }

    fn outcome(&self) -> Option<&Outcome> {
        if let Some(outcome) = self.outcome.get() {
            return Some(outcome);
        }

        let published = self.pending.get()?.borrow().clone()?;
        Some(self.outcome.get_or_init(|| published))
    }

    /// 로컬 인스턴스를 초기화 전 상태로 되돌림
    ///
    /// `&mut`가 필요하므로 프로세스 전역 가드(`global()`)에는 쓸 수 없습니다.
    /// 전역 상태에 의존하는 테스트는 대신 `Bootstrap::new()`로 만든 인스턴스를 사용합니다.
    #[cfg(test)]
    pub(crate) fn reset(&mut self) {
        self.pending = OnceLock::new();
        self.outcome = OnceLock::new();
    }
}

/// 초기화 본문을 분리된 태스크로 실행하고 결과 수신 채널 반환
fn spawn_initializer<Fut>(init: Fut) -> watch::Receiver<Option<Outcome>>
where
    Fut: Future<Output = Result<AuthEngine>> + Send + 'static,
{
    let (tx, rx) = watch::channel(None);

    tokio::spawn(async move {
        // 본문이 panic해도 결과가 게시되도록 한 번 더 감쌈
        let outcome = match tokio::spawn(init).await {
            Ok(Ok(engine)) => {
                tracing::info!(engine = ?engine, "auth library initialized successfully");
                Ok(Arc::new(engine))
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, code = e.code(), "auth library initialization failed");
                Err(e)
            }
            Err(join) => {
                let e = AuthError::configuration(format!("initialization task failed: {}", join));
                tracing::error!(error = %e, code = e.code(), "auth library initialization failed");
                Err(e)
            }
        };
        tx.send_replace(Some(outcome));
    });

    rx
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

async fn connect_from_env() -> Result<AuthEngine> {
    let config = AuthConfig::from_env()?;
    connect(&config).await
}

/// 설정값으로 저장소에 연결하고 엔진 생성
pub async fn connect(config: &AuthConfig) -> Result<AuthEngine> {
    let store = PgUserStore::connect(&config.store_uri, &config.store_database, config.connect_timeout)
        .await
        .map_err(|e| AuthError::Connection {
            message: e.to_string(),
        })?;

    Ok(AuthEngine::from_config(config, Arc::new(store)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Process-wide instance
// ─────────────────────────────────────────────────────────────────────────────

static GLOBAL: Bootstrap = Bootstrap::new();

/// 프로세스 전역 가드
pub fn global() -> &'static Bootstrap {
    &GLOBAL
}

/// 환경변수로 전역 엔진 초기화 (멱등)
pub async fn init_auth_lib() {
    GLOBAL.initialize().await
}

/// 전역 엔진 상태 확인
///
/// `init_auth_lib()`이 완료되기 전에는 `NotInitialized`를 반환합니다.
pub fn health_check() -> Result<()> {
    GLOBAL.health_check()
}

/// 전역 엔진으로 토큰 발급
pub fn generate_token(user: &User, validity: Duration) -> Result<String> {
    GLOBAL.generate_token(user, validity)
}

/// 전역 엔진으로 토큰 검증
pub async fn validate_token(token: &str) -> Result<User> {
    GLOBAL.validate_token(token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};

    use crate::id::UserId;
    use crate::store::MemoryUserStore;

    fn test_user() -> User {
        let at = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        User {
            created_at: at,
            updated_at: at,
            ..User::new("google-123", "a@b.com", "A")
                .with_id(UserId::parse("507f191e810c19729de860ea").unwrap())
        }
    }

    fn test_engine() -> AuthEngine {
        let store = MemoryUserStore::new();
        store.insert(test_user());
        AuthEngine::new("s3cret", Arc::new(store))
    }

    fn connection_refused() -> AuthError {
        AuthError::Connection {
            message: "connection refused".to_string(),
        }
    }

    #[tokio::test]
    async fn test_uninitialized_guard_rejects_calls() {
        let guard = Bootstrap::new();

        assert!(matches!(guard.health_check(), Err(AuthError::NotInitialized)));
        assert_eq!(guard.status(), HealthStatus::Uninitialized);
        assert!(matches!(
            guard.generate_token(&test_user(), Duration::hours(1)),
            Err(AuthError::NotInitialized)
        ));
        assert!(matches!(
            guard.validate_token("anything").await,
            Err(AuthError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_successful_initialization() {
        let guard = Bootstrap::new();
        guard.initialize_with(|| async { Ok(test_engine()) }).await;

        assert!(guard.health_check().is_ok());
        assert!(guard.status().is_healthy());

        let token = guard.generate_token(&test_user(), Duration::hours(1)).unwrap();
        let user = guard.validate_token(&token).await.unwrap();
        assert_eq!(user, test_user());
    }

    #[tokio::test]
    async fn test_failure_is_sticky() {
        let guard = Bootstrap::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        guard
            .initialize_with(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(connection_refused())
            })
            .await;

        // 두 번째 시도는 실행되지 않음
        let counter = runs.clone();
        guard
            .initialize_with(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(test_engine())
            })
            .await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);

        let err = guard.health_check().unwrap_err();
        assert_eq!(err.to_string(), connection_refused().to_string());

        assert!(matches!(
            guard.generate_token(&test_user(), Duration::hours(1)),
            Err(AuthError::Connection { .. })
        ));
        assert!(matches!(
            guard.validate_token("anything").await,
            Err(AuthError::Connection { .. })
        ));

        match guard.status() {
            HealthStatus::Failed { code, .. } => assert_eq!(code, "CONNECTION_ERROR"),
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_initialization_runs_once() {
        let guard = Arc::new(Bootstrap::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let guard = guard.clone();
            let runs = runs.clone();
            handles.push(tokio::spawn(async move {
                guard
                    .initialize_with(|| async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(test_engine())
                    })
                    .await;
                guard.health_check().is_ok()
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_caller_does_not_rerun_initializer() {
        let guard = Arc::new(Bootstrap::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let first = {
            let guard = guard.clone();
            let runs = runs.clone();
            tokio::spawn(async move {
                guard
                    .initialize_with(move || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                        Ok(test_engine())
                    })
                    .await;
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());
        assert_eq!(guard.status(), HealthStatus::Uninitialized);

        // 진행 중인 초기화를 기다릴 뿐 새로 실행하지 않음
        let counter = runs.clone();
        guard
            .initialize_with(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(connection_refused())
            })
            .await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(guard.health_check().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialization_survives_all_callers_cancelled() {
        let guard = Arc::new(Bootstrap::new());

        let caller = {
            let guard = guard.clone();
            async move {
                guard
                    .initialize_with(|| async {
                        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                        Ok(test_engine())
                    })
                    .await
            }
        };
        assert!(tokio::time::timeout(std::time::Duration::from_millis(10), caller)
            .await
            .is_err());

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert!(guard.status().is_healthy());
    }

    #[tokio::test]
    async fn test_panicking_initializer_is_recorded_as_failure() {
        let guard = Bootstrap::new();
        guard
            .initialize_with(|| async {
                let engine: Option<AuthEngine> = None;
                Ok(engine.expect("engine construction failed"))
            })
            .await;

        match guard.status() {
            HealthStatus::Failed { code, message } => {
                assert_eq!(code, "CONFIGURATION_ERROR");
                assert!(message.contains("initialization task failed"));
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_observe_same_failure() {
        let guard = Arc::new(Bootstrap::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let guard = guard.clone();
            handles.push(tokio::spawn(async move {
                guard
                    .initialize_with(|| async {
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Err(AuthError::configuration("missing JWT_SECRET"))
                    })
                    .await;
                guard.status()
            }));
        }

        let mut statuses = Vec::new();
        for handle in handles {
            statuses.push(handle.await.unwrap());
        }
        assert!(statuses.windows(2).all(|w| w[0] == w[1]));
        assert!(matches!(statuses[0], HealthStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_reset_allows_retry() {
        let mut guard = Bootstrap::new();
        guard.initialize_with(|| async { Err(connection_refused()) }).await;
        assert!(guard.health_check().is_err());

        guard.reset();
        guard.initialize_with(|| async { Ok(test_engine()) }).await;
        assert!(guard.health_check().is_ok());
    }

    #[test]
    fn test_status_serialization() {
        let failed = HealthStatus::Failed {
            code: "CONFIGURATION_ERROR".to_string(),
            message: "configuration error: missing".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["code"], "CONFIGURATION_ERROR");

        let json = serde_json::to_value(HealthStatus::Healthy).unwrap();
        assert_eq!(json["state"], "healthy");
    }
}
