use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::api::{AuthApi, KnowledgeBaseApi};
use crate::authz::{Permission, Visibility, VisibilityBinding};
use crate::config::ClientConfig;
use crate::errors::ClientResult;
use crate::http::{ReqwestTransport, Transport};
use crate::navigation::{Resolution, RouteTable, Router};
use crate::pipeline::{ChannelRedirector, Redirector, RequestPipeline};
use crate::session::{FetchOutcome, SessionStore};
use crate::storage::{FileTokenStorage, TokenStorage};

/// Everything a UI needs: the session, the request pipeline and the router,
/// all sharing one session.
#[derive(Clone)]
pub struct KbClient {
    pub config: Arc<ClientConfig>,
    pub session: SessionStore,
    pub pipeline: RequestPipeline,
    pub router: Router,
}

impl KbClient {
    /// Hydrate from durable storage; see [`SessionStore::init`].
    pub fn init(&self) -> ClientResult<Option<JoinHandle<ClientResult<FetchOutcome>>>> {
        self.session.init(&self.pipeline)
    }

    pub async fn fetch_user_info(&self) -> ClientResult<FetchOutcome> {
        self.session.fetch_user_info(&self.pipeline).await
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.session.can(permission)
    }

    pub fn visibility(&self, permission: Permission) -> Visibility {
        VisibilityBinding::new(permission).evaluate(&self.session)
    }

    pub fn navigate(&self, path: &str) -> Resolution {
        self.router.navigate(path)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.pipeline.clone())
    }

    pub fn knowledge_bases(&self) -> KnowledgeBaseApi {
        KnowledgeBaseApi::new(self.pipeline.clone())
    }
}

pub fn create_client(
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn TokenStorage>,
    redirector: Arc<dyn Redirector>,
) -> KbClient {
    create_client_with_routes(config, transport, storage, redirector, RouteTable::standard())
}

pub fn create_client_with_routes(
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn TokenStorage>,
    redirector: Arc<dyn Redirector>,
    routes: RouteTable,
) -> KbClient {
    let config = Arc::new(config);
    let session = SessionStore::new(storage);
    let pipeline = RequestPipeline::new(config.clone(), transport, session.clone(), redirector);
    let router = Router::new(routes, session.clone(), config.login_path.clone(), config.home_path.clone());

    KbClient {
        config,
        session,
        pipeline,
        router,
    }
}

/// Production wiring: reqwest transport, file-backed token, channel redirects.
pub fn create_default_client(config: ClientConfig) -> ClientResult<(KbClient, UnboundedReceiver<String>)> {
    let transport = ReqwestTransport::new(config.timeout)?;
    let storage = FileTokenStorage::new(config.token_file.clone());
    let (redirector, redirects) = ChannelRedirector::new();

    let client = create_client(config, Arc::new(transport), Arc::new(storage), Arc::new(redirector));
    Ok((client, redirects))
}
