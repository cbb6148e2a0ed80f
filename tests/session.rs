use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::NamedTempFile;
use terminal_api::{find_endpoint, ApiConfig, ApiError, Args, Session};
use tiny_http::{Header, Response, Server, StatusCode};

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    url: String,
    content_type: String,
    form: HashMap<String, String>,
}

struct MockApi {
    host: String,
    seen: Arc<Mutex<Vec<Seen>>>,
    handle: JoinHandle<()>,
}

impl MockApi {
    /// Serve every request with the same status and body until idle.
    fn start(status: u16, body: &'static str) -> Self {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let host = server.server_addr().to_string();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let handle = thread::spawn(move || loop {
            let mut req = match server.recv_timeout(Duration::from_millis(1500)) {
                Ok(Some(req)) => req,
                Ok(None) => break,
                Err(_) => break,
            };
            let mut raw = String::new();
            let _ = req.as_reader().read_to_string(&mut raw);
            let content_type = req
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.as_str().to_string())
                .unwrap_or_default();
            let form = url::form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect();
            seen_clone.lock().expect("lock").push(Seen {
                method: req.method().to_string(),
                url: req.url().to_string(),
                content_type,
                form,
            });
            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("header");
            let _ = req.respond(
                Response::from_string(body)
                    .with_status_code(StatusCode(status))
                    .with_header(header),
            );
        });
        MockApi { host, seen, handle }
    }

    fn config(&self, keys: &NamedTempFile) -> ApiConfig {
        ApiConfig::default()
            .with_protocol("http")
            .with_host(&self.host)
            .with_credentials_path(keys.path())
    }

    /// Wait for the server to go idle and return what it received.
    fn finish(self) -> Vec<Seen> {
        self.handle.join().expect("server thread");
        let seen = self.seen.lock().expect("lock");
        seen.clone()
    }
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn keys_file(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("temp file");
    f.write_all(contents.as_bytes()).expect("write keys");
    f
}

#[test]
fn who_am_i_uses_tokens_from_file() {
    init_logs();
    let api = MockApi::start(200, r#"{"user":{"name":"ada"}}"#);
    let keys = keys_file("user_token=abc\naccess_token=def\n");
    let session = Session::with_config(api.config(&keys), None, None).expect("session");

    let reply = session.who_am_i(Args::new()).expect("who_am_i");
    assert_eq!(reply, json!({"user": {"name": "ada"}}));

    let seen = api.finish();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "/v0.1/who_am_i");
    assert!(seen[0]
        .content_type
        .starts_with("application/x-www-form-urlencoded"));
    let expected: HashMap<String, String> = [("user_token", "abc"), ("access_token", "def")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(seen[0].form, expected);
}

#[test]
fn get_snapshot_sends_snapshot_id() {
    init_logs();
    let api = MockApi::start(200, r#"{"snapshot":{"id":"snap123"}}"#);
    let keys = keys_file("user_token=abc\naccess_token=def\n");
    let session = Session::with_config(api.config(&keys), None, None).expect("session");

    let reply = session
        .get_snapshot(Args::new().arg("snap123"))
        .expect("get_snapshot");
    assert_eq!(reply["snapshot"]["id"], "snap123");

    let seen = api.finish();
    assert_eq!(seen[0].url, "/v0.1/get_snapshot");
    assert_eq!(seen[0].form["snapshot_id"], "snap123");
    assert_eq!(seen[0].form["user_token"], "abc");
    assert_eq!(seen[0].form["access_token"], "def");
}

#[test]
fn explicit_tokens_and_mixed_args_reach_the_server() {
    init_logs();
    let api = MockApi::start(200, "[]");
    let keys = keys_file("user_token=file\naccess_token=file\n");
    let session =
        Session::with_config(api.config(&keys), Some("u1"), Some("a1")).expect("session");

    let reply = session
        .edit_terminal(
            Args::new()
                .arg("ck")
                .arg(4)
                .arg(1600)
                .arg("ignored-by-kw")
                .arg("name")
                .arg("one-too-many")
                .kw("diskspace", 20),
        )
        .expect("edit_terminal");
    assert_eq!(reply, Value::Array(vec![]));

    let seen = api.finish();
    let form = &seen[0].form;
    assert_eq!(form["user_token"], "u1");
    assert_eq!(form["access_token"], "a1");
    assert_eq!(form["container_key"], "ck");
    assert_eq!(form["cpu"], "4");
    assert_eq!(form["ram"], "1600");
    assert_eq!(form["diskspace"], "20");
    assert_eq!(form["name"], "name");
    assert_eq!(form.len(), 7);
}

#[test]
fn call_by_name_matches_generated_method() {
    init_logs();
    let api = MockApi::start(200, r#"{"request_id":"r1","status":"success"}"#);
    let keys = keys_file("");
    let session = Session::with_config(api.config(&keys), Some("u"), Some("a")).expect("session");

    let by_name = session
        .call_by_name("request_progress", Args::new().arg("r1"))
        .expect("by name");
    let endpoint = find_endpoint("request_progress").expect("endpoint");
    let by_table = session
        .call(endpoint, Args::new().arg("r1"))
        .expect("by table");
    let by_method = session
        .request_progress(Args::new().arg("r1"))
        .expect("by method");
    assert_eq!(by_name, by_table);
    assert_eq!(by_table, by_method);

    let seen = api.finish();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|s| s.url == "/v0.1/request_progress"));
    assert!(seen.iter().all(|s| s.form["request_id"] == "r1"));
}

#[test]
fn error_status_fails_without_retry() {
    init_logs();
    let api = MockApi::start(500, r#"{"error":"boom"}"#);
    let keys = keys_file("user_token=abc\naccess_token=def\n");
    let session = Session::with_config(api.config(&keys), None, None).expect("session");

    let err = session.balance(Args::new()).expect_err("500 must fail");
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Status {
            endpoint,
            status,
            body,
        }) => {
            assert_eq!(endpoint, "balance");
            assert_eq!(*status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(api.finish().len(), 1, "exactly one attempt");
}

#[test]
fn invalid_json_is_a_decode_error() {
    init_logs();
    let api = MockApi::start(200, "<html>not json</html>");
    let keys = keys_file("user_token=abc\naccess_token=def\n");
    let session = Session::with_config(api.config(&keys), None, None).expect("session");

    let err = session.list_terminals(Args::new()).expect_err("bad json");
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::Decode { endpoint, .. }) if endpoint == "list_terminals"
    ));
    assert_eq!(api.finish().len(), 1);
}

#[test]
fn connection_failure_is_reported() {
    init_logs();
    // Grab a free port, then close it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let keys = keys_file("user_token=abc\naccess_token=def\n");
    let cfg = ApiConfig::default()
        .with_protocol("http")
        .with_host(&format!("127.0.0.1:{port}"))
        .with_credentials_path(keys.path());
    let session = Session::with_config(cfg, None, None).expect("session");

    let err = session.who_am_i(Args::new()).expect_err("nothing listening");
    assert!(err.downcast_ref::<reqwest::Error>().is_some());
    assert!(err.to_string().contains("who_am_i"));
}
