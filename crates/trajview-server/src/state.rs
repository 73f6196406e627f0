use trajview_config::ViewerConfig;
use trajview_graph::{GraphLayout, RankedLayout};
use trajview_trace::TraceSession;
use tokio::sync::RwLock;

pub struct ServerState {
    pub session: RwLock<TraceSession>,
    pub config: ViewerConfig,
    pub layout: Box<dyn GraphLayout>,
}

impl ServerState {
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_layout(config, Box::new(RankedLayout))
    }

    pub fn with_layout(config: ViewerConfig, layout: Box<dyn GraphLayout>) -> Self {
        Self {
            session: RwLock::new(TraceSession::new()),
            config,
            layout,
        }
    }
}
