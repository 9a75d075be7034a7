use tokio::sync::mpsc;

/// Performs the hard navigation to the login surface.
pub trait Redirector: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Forwards redirect targets to whoever drives the UI.
#[derive(Debug, Clone)]
pub struct ChannelRedirector {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelRedirector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Redirector for ChannelRedirector {
    fn redirect(&self, path: &str) {
        if self.tx.send(path.to_string()).is_err() {
            tracing::warn!(path, "redirect receiver dropped");
        }
    }
}
