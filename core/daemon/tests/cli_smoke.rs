use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tempfile::TempDir;

fn read_request(stream: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).expect("Failed to read request");
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buffer).to_string();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buffer.len() >= header_end + 4 + content_length {
            break;
        }
    }
    String::from_utf8_lossy(&buffer).to_string()
}

fn respond(stream: &mut TcpStream, body: &str) {
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream
        .write_all(response.as_bytes())
        .expect("Failed to write response");
}

fn write_config(dir: &Path, base_url: &str) -> std::path::PathBuf {
    let path = dir.join("config.yaml");
    let content = format!(
        r#"
api:
  base_url: "{}"
  timeout_seconds: 5
message:
  sender: "monitorbot"
  text: "Welcome!"
monitoring:
  poll_interval_seconds: 30
  baseline_on_startup: false
  pre_dispatch_delay_seconds: 0
"#,
        base_url
    );
    fs_err::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn once_mode_greets_new_user_and_exits_cleanly() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fake presence API");
    let base_url = format!("http://{}", listener.local_addr().expect("addr"));
    let server = thread::spawn(move || {
        let mut requests = Vec::new();
        for body in [
            r#"{"sessions":[{"screen_name":"alice","online_seconds":4}]}"#,
            "{}",
        ] {
            let (mut stream, _) = listener.accept().expect("Failed to accept");
            requests.push(read_request(&mut stream));
            respond(&mut stream, body);
        }
        requests
    });

    let temp_dir = TempDir::new().expect("temp dir");
    let config_path = write_config(temp_dir.path(), &base_url);

    let status = Command::new(env!("CARGO_BIN_EXE_signon-monitor"))
        .arg("--config")
        .arg(&config_path)
        .arg("--once")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("Failed to run signon-monitor");
    assert!(status.success());

    let requests = server.join().expect("Fake server panicked");
    assert!(requests[0].starts_with("GET /session "));
    assert!(requests[1].starts_with("POST /instant-message "));
    let body = requests[1].split("\r\n\r\n").nth(1).expect("body");
    let message: serde_json::Value = serde_json::from_str(body).expect("json body");
    assert_eq!(message["to"], "alice");
    assert_eq!(message["from"], "monitorbot");
    assert_eq!(message["text"], "Welcome!");
}

#[test]
fn missing_config_fails_fast() {
    let temp_dir = TempDir::new().expect("temp dir");
    let status = Command::new(env!("CARGO_BIN_EXE_signon-monitor"))
        .arg("--config")
        .arg(temp_dir.path().join("missing.yaml"))
        .arg("--once")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("Failed to run signon-monitor");
    assert_eq!(status.code(), Some(1));
}
