//! HTTP client tests against a one-shot local server.
//!
//! Each test binds a listener on an ephemeral port, answers exactly one
//! request with a canned response, and hands the raw request back for
//! inspection.

use csv_cleaner_client::options::{OptionSet, OptionValue};
use csv_cleaner_client::{ClientConfig, FailureKind, HttpUploader, SelectedFile, Uploader};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const SUCCESS_BODY: &str = r#"{"success": true, "file_id": "abc123", "cleaned_filename": "cleaned_abc123_data.csv", "log_filename": "log_abc123_data.json", "message": "File processed successfully!", "summary": {"original_shape": [2, 2], "columns": ["a", "b"], "dtypes": {"a": "int64", "b": "object"}, "missing_values": {"a": 0, "b": 1}, "log": [{"trim_whitespace": "b"}]}, "preview": [{"a": 1, "b": "x"}, {"a": 2, "b": null}]}"#;

struct CannedResponse {
    status_line: &'static str,
    content_type: &'static str,
    body: String,
    delay: Option<Duration>,
    // Declared length when it should differ from the body actually sent
    content_length: Option<usize>,
}

impl CannedResponse {
    fn json(status_line: &'static str, body: &str) -> Self {
        CannedResponse {
            status_line,
            content_type: "application/json",
            body: body.to_string(),
            delay: None,
            content_length: None,
        }
    }
}

/// Serve one request, returning the API base URL and a handle yielding the raw request.
fn serve_once(response: CannedResponse) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let request = read_request(&mut stream);
        if let Some(delay) = response.delay {
            thread::sleep(delay);
            return request;
        }
        let raw = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response.status_line,
            response.content_type,
            response.content_length.unwrap_or(response.body.len()),
            response.body
        );
        let _ = stream.write_all(raw.as_bytes());
        request
    });
    (format!("http://{}/api", addr), handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if request_complete(&buf) {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn request_complete(buf: &[u8]) -> bool {
    let text = String::from_utf8_lossy(buf);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let headers = text[..header_end].to_ascii_lowercase();
    let body_len = buf.len() - (header_end + 4);
    if let Some(line) = headers
        .lines()
        .find(|l| l.starts_with("content-length:"))
    {
        let expected: usize = line["content-length:".len()..].trim().parse().unwrap_or(0);
        return body_len >= expected;
    }
    if headers.contains("transfer-encoding: chunked") {
        return text.ends_with("0\r\n\r\n");
    }
    true
}

fn options() -> OptionSet {
    let mut options = OptionSet::new();
    options.insert("remove_duplicates".to_string(), OptionValue::Flag(true));
    options.insert(
        "missing_strategy".to_string(),
        OptionValue::Choice("median".to_string()),
    );
    options
}

fn data_csv() -> SelectedFile {
    SelectedFile::from_bytes("data.csv", b"a,b\n1,x\n2,\n".to_vec())
}

#[test]
fn test_upload_sends_multipart_and_parses_result() {
    let (base, server) = serve_once(CannedResponse::json("200 OK", SUCCESS_BODY));
    let uploader = HttpUploader::new(ClientConfig::new(&base)).unwrap();

    let result = uploader.submit(&data_csv(), &options()).unwrap();
    assert_eq!(result.file_id, "abc123");
    assert_eq!(result.summary.original_shape, [2, 2]);
    assert_eq!(result.preview.len(), 2);

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /api/upload "));
    assert!(request.contains("multipart/form-data; boundary="));
    assert!(request.contains("name=\"file\"; filename=\"data.csv\""));
    assert!(request.contains("a,b\n1,x\n2,\n"));
    assert!(request.contains("name=\"remove_duplicates\"\r\n\r\ntrue\r\n"));
    assert!(request.contains("name=\"missing_strategy\"\r\n\r\nmedian\r\n"));
}

#[test]
fn test_upload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Sales.CSV");
    std::fs::write(&path, "region,total\nnorth,10\n").unwrap();

    let (base, server) = serve_once(CannedResponse::json("200 OK", SUCCESS_BODY));
    let uploader = HttpUploader::new(ClientConfig::new(&base)).unwrap();
    uploader
        .submit(&SelectedFile::from_path(&path), &OptionSet::new())
        .unwrap();

    let request = server.join().unwrap();
    assert!(request.contains("filename=\"Sales.CSV\""));
    assert!(request.contains("region,total\nnorth,10\n"));
}

#[test]
fn test_server_error_status() {
    let (base, server) = serve_once(CannedResponse::json(
        "500 INTERNAL SERVER ERROR",
        r#"{"error": "boom"}"#,
    ));
    let uploader = HttpUploader::new(ClientConfig::new(&base)).unwrap();

    let err = uploader.submit(&data_csv(), &options()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::TransportError);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "HTTP error! status: 500");
    server.join().unwrap();
}

#[test]
fn test_service_reported_failure() {
    let (base, server) = serve_once(CannedResponse::json(
        "200 OK",
        r#"{"success": false, "error": "Unsupported encoding"}"#,
    ));
    let uploader = HttpUploader::new(ClientConfig::new(&base)).unwrap();

    let err = uploader.submit(&data_csv(), &options()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::ApplicationError);
    assert_eq!(err.to_string(), "Unsupported encoding");
    server.join().unwrap();
}

#[test]
fn test_connection_refused() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let uploader = HttpUploader::new(ClientConfig::new(&format!("http://{}/api", addr))).unwrap();

    let err = uploader.submit(&data_csv(), &options()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::TransportError);
    assert_eq!(err.status(), None);
}

#[test]
fn test_timeout_is_transport_failure() {
    let (base, server) = serve_once(CannedResponse {
        delay: Some(Duration::from_secs(3)),
        ..CannedResponse::json("200 OK", SUCCESS_BODY)
    });
    let config = ClientConfig::new(&base).with_timeout(Some(Duration::from_millis(500)));
    let uploader = HttpUploader::new(config).unwrap();

    let err = uploader.submit(&data_csv(), &options()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::TransportError);
    assert_eq!(err.status(), None);
    server.join().unwrap();
}

#[test]
fn test_health_probe() {
    let (base, server) = serve_once(CannedResponse::json(
        "200 OK",
        r#"{"status": "healthy", "message": "Data Cleaning API is running"}"#,
    ));
    let uploader = HttpUploader::new(ClientConfig::new(&base)).unwrap();

    let health = uploader.health().unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.message, "Data Cleaning API is running");

    let request = server.join().unwrap();
    assert!(request.starts_with("GET /api/health "));
}

#[test]
fn test_download_to_file() {
    let (base, server) = serve_once(CannedResponse {
        status_line: "200 OK",
        content_type: "text/csv",
        body: "a,b\n1,x\n".to_string(),
        delay: None,
        content_length: None,
    });
    let config = ClientConfig::new(&base);
    let url = config.download_url(csv_cleaner_client::ArtifactKind::Csv, "abc123", "data.csv");
    let uploader = HttpUploader::new(config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("data.csv");
    let written = uploader.download_to(&url, &out).unwrap();
    assert_eq!(written, 8);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "a,b\n1,x\n");

    let request = server.join().unwrap();
    assert!(request.starts_with("GET /api/download/csv/abc123/data.csv "));
}

#[test]
fn test_download_missing_artifact() {
    let (base, server) = serve_once(CannedResponse::json(
        "404 NOT FOUND",
        r#"{"error": "File not found"}"#,
    ));
    let config = ClientConfig::new(&base);
    let url = config.download_url(csv_cleaner_client::ArtifactKind::Log, "abc123", "data.json");
    let uploader = HttpUploader::new(config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("data.json");
    assert!(uploader.download_to(&url, &out).is_err());
    assert!(!out.exists());
    server.join().unwrap();
}

#[test]
fn test_truncated_download_leaves_no_file() {
    let (base, server) = serve_once(CannedResponse {
        status_line: "200 OK",
        content_type: "text/csv",
        body: "a,b\n1,2\n".to_string(),
        delay: None,
        content_length: Some(1000),
    });
    let config = ClientConfig::new(&base);
    let url = config.download_url(csv_cleaner_client::ArtifactKind::Csv, "abc123", "data.csv");
    let uploader = HttpUploader::new(config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("data.csv");
    assert!(uploader.download_to(&url, &out).is_err());
    assert!(!out.exists());
    assert!(!dir.path().join("data.csv.part").exists());
    server.join().unwrap();
}

#[test]
fn test_download_replaces_existing_file() {
    let (base, server) = serve_once(CannedResponse {
        status_line: "200 OK",
        content_type: "text/csv",
        body: "x\n9\n".to_string(),
        delay: None,
        content_length: None,
    });
    let config = ClientConfig::new(&base);
    let url = config.download_url(csv_cleaner_client::ArtifactKind::Csv, "abc123", "data.csv");
    let uploader = HttpUploader::new(config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("data.csv");
    std::fs::write(&out, "stale contents").unwrap();
    uploader.download_to(&url, &out).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "x\n9\n");
    assert!(!dir.path().join("data.csv.part").exists());
    server.join().unwrap();
}
