use crate::{aggregate, Error, FormConfig, IncomingForm, ParseOutcome};
use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt};
use http::header::CONTENT_TYPE;
use http::Request;
use http_body::Body;
use http_body_util::BodyStream;
use std::future::Future;

/// The next stage of a request chain.
///
/// It is called exactly once, with either the request carrying the parsed
/// form or the error that rejected it. Any `FnOnce(Result<Request<T>>) -> Future`
/// closure is a `Next`.
pub trait Next<T> {
    type Output;
    type Future: Future<Output = Self::Output>;

    fn call(self, outcome: crate::Result<Request<T>>) -> Self::Future;
}

impl<T, F, Fut> Next<T> for F
where
    F: FnOnce(crate::Result<Request<T>>) -> Fut,
    Fut: Future,
{
    type Output = Fut::Output;
    type Future = Fut;

    fn call(self, outcome: crate::Result<Request<T>>) -> Self::Future {
        self(outcome)
    }
}

/// Turns `multipart/form-data` requests into requests carrying a [`ParseOutcome`].
///
/// The adapter holds the [`FormConfig`] only. Every request gets its own
/// [`IncomingForm`] and its own collected lists, so one adapter can serve any
/// number of concurrent requests.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use form_adapter::{FormAdapter, ParseOutcome};
/// use http::Request;
/// use http_body_util::Full;
///
/// # async fn run() {
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n--X-BOUNDARY--\r\n";
/// let req = Request::post("/profile")
///     .header("content-type", "multipart/form-data; boundary=X-BOUNDARY")
///     .body(Full::new(Bytes::from(data)))
///     .unwrap();
///
/// let adapter = FormAdapter::new();
/// let reply = adapter
///     .handle(req, |outcome: form_adapter::Result<Request<ParseOutcome>>| async move {
///         match outcome {
///             Ok(req) => format!("a = {}", req.body().field("a").unwrap_or_default()),
///             Err(err) => format!("rejected: {}", err),
///         }
///     })
///     .await;
///
/// assert_eq!(reply, "a = 1");
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(run());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormAdapter {
    config: FormConfig,
}

impl FormAdapter {
    /// Creates an adapter with the decoder defaults.
    pub fn new() -> FormAdapter {
        FormAdapter::default()
    }

    /// Creates an adapter whose decoders take every key set in `config`.
    pub fn with_config(config: FormConfig) -> FormAdapter {
        FormAdapter { config }
    }

    /// The configuration applied to every decoder.
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Returns a fresh, configured decoder.
    pub fn decoder(&self) -> IncomingForm {
        let mut form = IncomingForm::new();
        form.configure(&self.config);
        form
    }

    /// Parses the request body and passes the result on to `next`.
    pub async fn handle<B, N>(&self, req: Request<B>, next: N) -> N::Output
    where
        B: Body + Send + 'static,
        B::Data: Into<Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
        N: Next<ParseOutcome>,
    {
        let outcome = self.parse(req).await;
        next.call(outcome).await
    }

    /// Parses the request body, returning the request head with the collected
    /// form as its body.
    pub async fn parse<B>(&self, req: Request<B>) -> crate::Result<Request<ParseOutcome>>
    where
        B: Body + Send + 'static,
        B::Data: Into<Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
    {
        let (parts, body) = req.into_parts();

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .ok_or(Error::MissingContentType)?;

        let boundary = match crate::parse_boundary(content_type) {
            Ok(boundary) => boundary,
            Err(err) => {
                #[cfg(feature = "log")]
                log::debug!("Rejected {} {}: {}", parts.method, parts.uri, err);
                return Err(err);
            }
        };

        let body_stream = BodyStream::new(body)
            .filter_map(|result| async move { result.map(|frame| frame.into_data().ok()).transpose() });

        match self.parse_stream(body_stream, boundary).await {
            Ok(outcome) => Ok(Request::from_parts(parts, outcome)),
            Err(err) => {
                #[cfg(feature = "log")]
                log::debug!("Rejected form {} {}: {}", parts.method, parts.uri, err);
                Err(err)
            }
        }
    }

    /// Parses a raw multipart byte stream with the given boundary.
    pub async fn parse_stream<'r, S, O, E, B>(&self, stream: S, boundary: B) -> crate::Result<ParseOutcome>
    where
        S: Stream<Item = Result<O, E>> + Send + 'r,
        O: Into<Bytes> + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'r,
        B: Into<String>,
    {
        aggregate(self.decoder().parse(stream, boundary)).await
    }
}
