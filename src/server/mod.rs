pub mod config;
pub mod content_type;
pub mod endpoint;
pub mod http_status;
pub mod path_resolver;
pub mod request_handler;
pub mod request_parser;
mod select_handler;

use log::{debug, error, info};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};

use config::{ConfigError, ServerConfig};
use endpoint::Endpoint;
use http_status::HttpStatus;
use request_handler::{Outcome, Response};
use request_parser::{RequestContext, RequestError, parse_request, read_request_head};
use select_handler::SelectHandler;

pub struct HttpServer {
    config: ServerConfig,
    port: u16,
    bound_port: AtomicU16,
    request_count: AtomicUsize,
    is_listening: AtomicBool,
}

impl HttpServer {
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        let port = config.validate()?;

        Ok(Self {
            config,
            port,
            bound_port: AtomicU16::new(port),
            request_count: AtomicUsize::new(0),
            is_listening: AtomicBool::new(false),
        })
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The configured port until [`HttpServer::bind`] succeeds, the bound one afterwards.
    pub fn bound_port(&self) -> u16 {
        self.bound_port.load(Ordering::SeqCst)
    }

    pub fn prefix(&self) -> String {
        config::prefix(&self.config.address, self.bound_port())
    }

    pub fn working_directory(&self) -> &Path {
        &self.config.working_directory
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn is_listening(&self) -> bool {
        self.is_listening.load(Ordering::SeqCst)
    }

    /// Binds the endpoint and serves until [`HttpServer::shutdown`] is called.
    pub fn launch(&self) -> std::io::Result<()> {
        let endpoint = self.bind()?;
        self.serve(endpoint);
        Ok(())
    }

    /// Opens the listening sockets and moves the server into the listening state.
    pub fn bind(&self) -> std::io::Result<Endpoint> {
        let endpoint = Endpoint::bind(&self.config.address, self.port)?;
        self.bound_port.store(endpoint.port(), Ordering::SeqCst);
        self.is_listening.store(true, Ordering::SeqCst);
        Ok(endpoint)
    }

    /// Runs the accept loop on an already bound endpoint; blocks the calling thread.
    pub fn serve(&self, endpoint: Endpoint) {
        info!("Working directory is '{}'.", self.config.working_directory.display());
        info!("Listening at '{}'.", self.prefix());

        let select_handler = SelectHandler::new(self.config.poll_interval);
        let fds = endpoint.raw_fds();

        while self.is_listening() {
            let ready = match select_handler.wait_for_readable(&fds) {
                Ok(ready) => ready,
                Err(e) => {
                    error!("pselect error: {}", e);
                    break;
                }
            };

            for index in ready {
                match endpoint.accept(index) {
                    Ok(Some((stream, addr))) => {
                        debug!("New connection from {}", addr);
                        self.serve_connection(stream);
                    }
                    Ok(None) => {}
                    Err(e) => error!("Error accepting connection: {}", e),
                }
            }
        }

        self.shutdown();
        drop(endpoint);
    }

    /// Stops the accept loop; the listeners close once the loop notices.
    pub fn shutdown(&self) {
        if self.is_listening.swap(false, Ordering::SeqCst) {
            info!("Shutting down.");
        }
    }

    fn serve_connection<S: Read + Write>(&self, mut stream: S) -> Option<HttpStatus> {
        let sequence = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;

        let status = match self.respond(&mut stream, sequence) {
            Ok((status, outcome)) => {
                info!("  -> {} {} ({})", status.code(), status.text(), outcome.describe());
                Some(status)
            }
            Err(e) => {
                error!("Request {}: {}", sequence, e);
                None
            }
        };
        info!("");

        status
    }

    fn respond<S: Read + Write>(
        &self,
        stream: &mut S,
        sequence: usize,
    ) -> Result<(HttpStatus, Outcome), RequestError> {
        let context = match read_request_head(stream).and_then(|head| parse_request(&head, sequence)) {
            Ok(context) => context,
            Err(e) if e.is_bad_request() => {
                Response::bad_request().write_to(stream)?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        log_request(&context);
        let response = request_handler::handle(&context, &self.config);
        if let Some(target) = &response.target {
            debug!("Request {} resolved to {:?}", sequence, target);
        }
        response.write_to(stream)?;

        Ok((response.status, response.outcome))
    }
}

fn log_request(context: &RequestContext) {
    info!("Request {}:", context.sequence);
    info!("  {}", context.path);
    info!("  {}", context.method);
    info!("  {}", context.host);
    info!("  {}", context.user_agent);
}
