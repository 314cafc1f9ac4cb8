//! End-to-end test for `zplc send` against a mock printer FTP server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use assert_cmd::Command;

fn send_line(stream: &mut TcpStream, line: &str) {
    stream.write_all(line.as_bytes()).unwrap();
    stream.write_all(b"\r\n").unwrap();
    stream.flush().unwrap();
}

fn read_line(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    line.trim_end().to_string()
}

/// Minimal active-mode printer: greet, accept login, take one `STOR`
/// upload, and return what was stored and under which name.
fn spawn_mock_printer() -> (u16, thread::JoinHandle<(String, Vec<u8>)>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        send_line(&mut stream, "220 printer ready");
        let user = read_line(&mut reader);
        assert!(user.starts_with("USER "), "got {user}");
        send_line(&mut stream, "230 logged in");

        let port_cmd = read_line(&mut reader);
        let args = port_cmd.strip_prefix("PORT ").unwrap();
        let octets: Vec<u16> = args.split(',').map(|o| o.parse().unwrap()).collect();
        let data_port = octets[4] * 256 + octets[5];
        send_line(&mut stream, "200 PORT command successful");

        assert_eq!(read_line(&mut reader), "TYPE I");
        send_line(&mut stream, "200 switching to binary");

        let stor = read_line(&mut reader);
        let name = stor.strip_prefix("STOR ").unwrap().to_string();
        send_line(&mut stream, "150 opening data connection");

        let mut data_stream = TcpStream::connect(("127.0.0.1", data_port)).unwrap();
        let mut payload = Vec::new();
        data_stream.read_to_end(&mut payload).unwrap();
        send_line(&mut stream, "226 transfer complete");

        // QUIT from the client's disconnect.
        let quit = read_line(&mut reader);
        assert_eq!(quit, "QUIT");
        send_line(&mut stream, "221 goodbye");

        (name, payload)
    });

    (port, handle)
}

#[test]
fn send_delivers_the_file_over_active_ftp() {
    let (port, handle) = spawn_mock_printer();

    let dir = tempfile::tempdir().unwrap();
    let job_path = dir.path().join("shelf label.zpl");
    let job = b"^XA^FO30,30^FDSHELF A1^FS^XZ".to_vec();
    std::fs::write(&job_path, &job).unwrap();

    Command::cargo_bin("zplc")
        .unwrap()
        .args([
            "send",
            job_path.to_str().unwrap(),
            "--host",
            &format!("127.0.0.1:{port}"),
            "--user",
            "admin",
        ])
        .assert()
        .success();

    let (name, payload) = handle.join().unwrap();
    // Remote name derived from the file stem: alphanumerics, uppercased.
    assert_eq!(name, "SHELFLAB");
    assert_eq!(payload, job);
}

#[test]
fn send_honors_an_explicit_remote_name() {
    let (port, handle) = spawn_mock_printer();

    let dir = tempfile::tempdir().unwrap();
    let job_path = dir.path().join("job.zpl");
    std::fs::write(&job_path, b"^XA^XZ").unwrap();

    Command::cargo_bin("zplc")
        .unwrap()
        .args([
            "send",
            job_path.to_str().unwrap(),
            "--host",
            &format!("127.0.0.1:{port}"),
            "--name",
            "BATCH7",
        ])
        .assert()
        .success();

    let (name, payload) = handle.join().unwrap();
    assert_eq!(name, "BATCH7");
    assert_eq!(payload, b"^XA^XZ");
}

#[test]
fn send_fails_cleanly_when_nothing_listens() {
    let dir = tempfile::tempdir().unwrap();
    let job_path = dir.path().join("job.zpl");
    std::fs::write(&job_path, b"^XA^XZ").unwrap();

    // Bind-then-drop to get a port with no listener behind it.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    Command::cargo_bin("zplc")
        .unwrap()
        .args([
            "send",
            job_path.to_str().unwrap(),
            "--host",
            &format!("127.0.0.1:{port}"),
        ])
        .assert()
        .failure();
}
