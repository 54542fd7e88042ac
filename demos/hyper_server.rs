use std::{convert::Infallible, net::SocketAddr};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{body::Incoming, Request, Response, StatusCode};
// Import the form-adapter types.
use form_adapter::{Error, FormAdapter, FormConfig, ParseOutcome};

// The route handler that runs once the form is collected.
async fn show_form(outcome: form_adapter::Result<Request<ParseOutcome>>) -> Response<Full<Bytes>> {
    let req = match outcome {
        Ok(req) => req,
        Err(err) => return reject(err),
    };

    let mut report = String::new();

    for field in &req.body().fields {
        report.push_str(&format!("Field: {} = {:?}\n", field.name, field.value));
    }

    for file in &req.body().files {
        report.push_str(&format!(
            "File: {} -> {:?} ({:?}, {} bytes) stored at {}\n",
            file.name,
            file.file.file_name(),
            file.file.content_type(),
            file.file.size(),
            file.file.path().display()
        ));
    }

    Response::new(Full::from(report))
}

// Maps a rejected form to an error response.
fn reject(err: Error) -> Response<Full<Bytes>> {
    let status = match err {
        Error::MissingContentType | Error::NoMultipart | Error::NoBoundary | Error::DecodeContentType(_) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        Error::FieldsSizeExceeded { .. } | Error::FileSizeExceeded { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        Error::Decode(_) | Error::TooManyFields { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut res = Response::new(Full::from(format!("{}: {}", status, err)));
    *res.status_mut() = status;
    res
}

#[tokio::main]
async fn main() {
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    println!("Server running at: {}", addr);

    let adapter = FormAdapter::with_config(
        FormConfig::new()
            .keep_extensions(true)
            .max_file_size(10 * 1024 * 1024),
    );

    loop {
        let (socket, _remote_addr) = listener.accept().await.unwrap();
        let socket = hyper_util::rt::TokioIo::new(socket);
        let adapter = adapter.clone();

        tokio::spawn(async move {
            let service = hyper::service::service_fn(move |req: Request<Incoming>| {
                let adapter = adapter.clone();
                async move { Ok::<_, Infallible>(adapter.handle(req, show_form).await) }
            });

            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(socket, service)
                .await
            {
                eprintln!("server error: {}", e);
            }
        });
    }
}
