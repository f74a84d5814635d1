use std::io::{BufRead, BufReader, Read};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_cors-serve");

fn server_command(root: &std::path::Path, port: u16) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.env("SERVE_SERVER__HOST", "127.0.0.1")
        .env("SERVE_SERVER__PORT", port.to_string())
        .env("SERVE_SERVER__ROOT", root)
        .env("SERVE_LOGGING__ACCESS_LOG", "false")
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    cmd
}

fn read_stdout(child: &mut Child) -> String {
    let mut out = String::new();
    child
        .stdout
        .take()
        .unwrap()
        .read_to_string(&mut out)
        .unwrap();
    out
}

#[test]
fn port_in_use_exits_with_status_1() {
    let root = tempfile::tempdir().unwrap();
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let mut child = server_command(root.path(), port).spawn().unwrap();
    let stdout = read_stdout(&mut child);
    let status = child.wait().unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(
        stdout.contains(&format!("Port {port} is already in use")),
        "stdout: {stdout}"
    );
}

#[test]
fn missing_root_exits_with_status_1() {
    let root = tempfile::tempdir().unwrap();
    let missing = root.path().join("does-not-exist");

    let mut child = server_command(&missing, 0).spawn().unwrap();
    let stdout = read_stdout(&mut child);
    let status = child.wait().unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(stdout.starts_with("Error starting server:"), "stdout: {stdout}");
}

#[cfg(unix)]
#[test]
fn interrupt_stops_cleanly() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("index.html"), "hi").unwrap();

    let mut child = server_command(root.path(), 0).spawn().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let mut banner = Vec::new();
    for _ in 0..3 {
        let mut line = String::new();
        stdout.read_line(&mut line).unwrap();
        banner.push(line.trim_end().to_string());
    }
    assert!(banner[0].starts_with("Server running at http://localhost:"));
    assert!(banner[1].ends_with("/state-machine-test.html"));
    assert_eq!(banner[2], "Press Ctrl+C to stop the server");

    let port: u16 = banner[0]
        .trim_start_matches("Server running at http://localhost:")
        .trim_end_matches('/')
        .parse()
        .unwrap();

    let kill = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(kill.success());

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    let status = child.wait().unwrap();

    assert_eq!(status.code(), Some(0));
    assert!(rest.contains("Server stopped."), "stdout: {rest}");
    assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
}

#[cfg(unix)]
#[test]
fn access_lines_stay_off_stdout() {
    use std::io::Write;
    use std::net::TcpStream;

    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("a.js"), "x=1").unwrap();

    let mut child = server_command(root.path(), 0)
        .env("SERVE_LOGGING__ACCESS_LOG", "true")
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let mut banner = String::new();
    for _ in 0..3 {
        stdout.read_line(&mut banner).unwrap();
    }
    let port: u16 = banner
        .lines()
        .next()
        .unwrap()
        .trim_start_matches("Server running at http://localhost:")
        .trim_end_matches('/')
        .parse()
        .unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream
        .write_all(b"GET /a.js HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    assert!(response.starts_with(b"HTTP/1.1 200"));

    let kill = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(kill.success());

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    let mut stderr = String::new();
    child
        .stderr
        .take()
        .unwrap()
        .read_to_string(&mut stderr)
        .unwrap();
    assert_eq!(child.wait().unwrap().code(), Some(0));

    assert_eq!(banner.lines().count(), 3);
    assert_eq!(rest, "\nServer stopped.\n");
    assert!(stderr.contains("\"GET /a.js HTTP/1.1\" 200 3"), "stderr: {stderr}");
}
