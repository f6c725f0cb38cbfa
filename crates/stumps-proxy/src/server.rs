//! HTTP/1 listener for a proxy instance.
//!
//! Each accepted connection is served on its own task. Requests are buffered
//! into a [`StumpsHttpContext`], counted, run through the pipeline and, when
//! the environment is recording, captured before the response is written.

use crate::environment::ProxyEnvironment;
use crate::http::{
    read_request, HttpResponseOrigin, IntoHyperResponse, StumpsHttpContext, StumpsHttpResponse,
};
use crate::pipeline::{
    HttpHandler, HttpPipeline, NotFoundHandler, ProcessHandlerResult, StumpsHandler,
};
use crate::recording::{RecordedContext, RecordedRequest, RecordedResponse};
use anyhow::Context;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Serves one [`ProxyEnvironment`] on one address.
pub struct ProxyServer {
    addr: SocketAddr,
    environment: Arc<ProxyEnvironment>,
    pipeline: Arc<HttpPipeline>,
}

impl ProxyServer {
    pub fn new(
        addr: SocketAddr,
        environment: Arc<ProxyEnvironment>,
        pipeline: HttpPipeline,
    ) -> Self {
        Self {
            addr,
            environment,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Server with the standard chain: Stump replay, then 404.
    pub fn with_default_pipeline(addr: SocketAddr, environment: Arc<ProxyEnvironment>) -> Self {
        let pipeline = default_pipeline(Arc::clone(&environment));
        Self::new(addr, environment, pipeline)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn environment(&self) -> &Arc<ProxyEnvironment> {
        &self.environment
    }

    /// Bind the configured address. Port 0 picks a free port; read it back
    /// from the listener's `local_addr`.
    pub async fn bind(&self) -> Result<TcpListener, anyhow::Error> {
        TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind proxy listener on {}", self.addr))
    }

    /// Bind the configured address and serve until the task is dropped.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), anyhow::Error> {
        self.serve_until(listener, std::future::pending()).await
    }

    /// Serve connections until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn serve_until<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), anyhow::Error>
    where
        F: Future<Output = ()>,
    {
        let local = listener.local_addr().context("Listener has no local address")?;
        info!(
            "Stumps proxy for '{}' listening on http://{}",
            self.environment.external_host_name(),
            local
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let local_addr = stream.local_addr().ok();
                            let environment = Arc::clone(&self.environment);
                            let pipeline = Arc::clone(&self.pipeline);
                            tokio::spawn(async move {
                                let io = TokioIo::new(stream);
                                let service = service_fn(move |req| {
                                    let environment = Arc::clone(&environment);
                                    let pipeline = Arc::clone(&pipeline);
                                    async move {
                                        handle_request(
                                            req,
                                            environment,
                                            pipeline,
                                            local_addr,
                                            remote_addr,
                                        )
                                        .await
                                    }
                                });
                                if let Err(e) = http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    debug!("Connection error from {}: {}", remote_addr, e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Accept error on {}: {}", local, e);
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Stumps proxy on {} shutting down", local);
                    return Ok(());
                }
            }
        }
    }
}

/// Stump replay followed by the 404 fallback.
pub fn default_pipeline(environment: Arc<ProxyEnvironment>) -> HttpPipeline {
    HttpPipeline::new()
        .with_handler(StumpsHandler::new(environment))
        .with_handler(NotFoundHandler)
}

async fn handle_request(
    req: Request<Incoming>,
    environment: Arc<ProxyEnvironment>,
    pipeline: Arc<HttpPipeline>,
    local_addr: Option<SocketAddr>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    environment.increment_requests_served();

    let request = match read_request(req, local_addr, Some(remote_addr)).await {
        Ok(request) => request,
        Err(e) => {
            warn!("Failed to read request body from {}: {}", remote_addr, e);
            return Ok(plain_response(StatusCode::BAD_REQUEST));
        }
    };

    let mut context = StumpsHttpContext::new(request);
    match pipeline.process_request(&mut context) {
        Ok(ProcessHandlerResult::Terminate) => {}
        Ok(ProcessHandlerResult::Continue) => service_unavailable(&mut context.response),
        Err(e) => {
            error!(
                "Pipeline failed for {} {}: {}",
                context.request.method, context.request.raw_url, e
            );
            return Ok(plain_response(StatusCode::INTERNAL_SERVER_ERROR));
        }
    }

    if environment.record_traffic() {
        record(&environment, &context);
    }

    match context.response.into_hyper() {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("Failed to build response: {}", e);
            Ok(plain_response(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

fn service_unavailable(response: &mut StumpsHttpResponse) {
    response.status_code = StatusCode::SERVICE_UNAVAILABLE.as_u16();
    response.status_description = "Service Unavailable".to_string();
    response.headers.clear();
    response.content_type = None;
    response.send_chunked = false;
    response.clear_body();
    response.origin = HttpResponseOrigin::ServiceUnavailable;
}

fn record(environment: &ProxyEnvironment, context: &StumpsHttpContext) {
    let captured = RecordedRequest::from_request(&context.request).and_then(|request| {
        RecordedResponse::from_response(&context.response).map(|response| (request, response))
    });

    match captured {
        Ok((request, response)) => {
            let index = environment
                .recordings()
                .add(RecordedContext::new(request, response));
            debug!(
                "Recorded {} {} as #{}",
                context.request.method, context.request.raw_url, index
            );
        }
        Err(e) => warn!(
            "Skipping recording of {} {}: {}",
            context.request.method, context.request.raw_url, e
        ),
    }
}

fn plain_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
