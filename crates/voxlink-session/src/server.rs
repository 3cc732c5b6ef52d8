use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, info_span, warn};
use voxlink_transport::TcpLink;

use crate::config::ServerConfig;
use crate::error::{Result, SessionError};
use crate::intent::{FixedIntent, IntentAnalyzer};
use crate::session::{run_session, SessionReport};
use crate::speech::{SilentSynthesizer, SpeechSynthesizer};

/// How often a stopped server notices its shutdown flag while idle.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Serves device round trips one at a time.
pub struct Server {
    link: TcpLink,
    config: ServerConfig,
    analyzer: Box<dyn IntentAnalyzer + Send>,
    synthesizer: Box<dyn SpeechSynthesizer + Send>,
}

impl Server {
    /// Bind to `addr` with default config, a fixed acknowledgement and no
    /// reply audio.
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let link = TcpLink::bind(addr)?;
        Ok(Self {
            link,
            config: ServerConfig::default(),
            analyzer: Box::new(FixedIntent::default()),
            synthesizer: Box::new(SilentSynthesizer),
        })
    }

    /// Override session config.
    pub fn with_config(mut self, config: ServerConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_analyzer(mut self, analyzer: impl IntentAnalyzer + Send + 'static) -> Self {
        self.analyzer = Box::new(analyzer);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: impl SpeechSynthesizer + Send + 'static) -> Self {
        self.synthesizer = Box::new(synthesizer);
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.link.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Accept one connection and serve it to completion (blocking).
    pub fn serve_one(&self) -> Result<SessionReport> {
        let stream = self.link.accept()?;
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let _span = info_span!("session", %peer).entered();
        run_session(
            stream,
            &self.config,
            self.analyzer.as_ref(),
            self.synthesizer.as_ref(),
        )
    }

    /// Serve sessions until `running` is cleared. Failed sessions and
    /// failed accepts are logged and the loop keeps going; only switching
    /// the listener to polling mode can fail the call.
    ///
    /// `on_session` sees every completed session.
    pub fn serve(
        &self,
        running: &AtomicBool,
        mut on_session: impl FnMut(&SessionReport),
    ) -> Result<usize> {
        self.link.set_nonblocking(true)?;
        info!(addr = %self.local_addr(), "serving");

        let mut served = 0usize;
        while running.load(Ordering::SeqCst) {
            let stream = match self.link.try_accept() {
                Ok(Some(stream)) => stream,
                Ok(None) => {
                    std::thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
                Err(err) => {
                    warn!(%err, "accept failed, retrying");
                    std::thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
            };

            let peer = stream
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            let _span = info_span!("session", %peer).entered();

            match run_session(
                stream,
                &self.config,
                self.analyzer.as_ref(),
                self.synthesizer.as_ref(),
            ) {
                Ok(report) => {
                    served = served.saturating_add(1);
                    on_session(&report);
                }
                Err(SessionError::Frame(err)) if err.is_short_read() => {
                    debug!(%err, "upload incomplete, session aborted");
                }
                Err(err) => warn!(%err, "session aborted"),
            }
        }

        info!(served, "server stopped");
        Ok(served)
    }
}
