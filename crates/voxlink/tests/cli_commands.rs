#![cfg(feature = "cli")]

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "voxlink-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn voxlink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_voxlink"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("voxlink should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).expect("stdout should be json")
}

fn free_port() -> u16 {
    let probe = TcpListener::bind("127.0.0.1:0").expect("probe should bind");
    probe.local_addr().expect("probe addr").port()
}

#[test]
fn ir_value_prints_frame() {
    let output = voxlink(&["ir", "16", "--format", "json"]);
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["ir_code"], "B24DA05FD02F");
    assert_eq!(value["temperature"], 26);
    assert_eq!(value["mode"], "cool");
}

#[test]
fn ir_raw_format_prints_hex_line() {
    let output = voxlink(&["ir", "high", "--format", "raw"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "B24D40BFD02F\n");
}

#[test]
fn ir_off_prints_null() {
    let output = voxlink(&["ir", "--action", "关闭", "--format", "json"]);
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert!(value["ir_code"].is_null());
}

#[test]
fn ir_decode_rejects_bad_complement() {
    let output = voxlink(&["ir", "--decode", "B24DA05FD02E", "--format", "json"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn adpcm_encode_and_decode_files() {
    let dir = unique_temp_dir("adpcm");
    let pcm = dir.join("in.pcm");
    let adpcm = dir.join("mid.adpcm");
    let raw = dir.join("out.pcm");

    let samples: Vec<u8> = (0..1000i16)
        .flat_map(|i| ((i % 50) * 300).to_le_bytes())
        .collect();
    std::fs::write(&pcm, &samples).expect("pcm should be writable");

    let output = voxlink(&[
        "adpcm",
        "encode",
        pcm.to_str().unwrap(),
        adpcm.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_json(&output)["output_bytes"], 500);
    assert_eq!(std::fs::metadata(&adpcm).unwrap().len(), 500);

    let output = voxlink(&[
        "adpcm",
        "decode",
        adpcm.to_str().unwrap(),
        raw.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_json(&output)["samples"], 1000);
    assert_eq!(std::fs::metadata(&raw).unwrap().len(), 2000);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn adpcm_missing_input_is_usage_error() {
    let output = voxlink(&["adpcm", "encode", "/nonexistent/in.pcm", "/tmp/out.adpcm"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn serve_and_send_round_trip() {
    let dir = unique_temp_dir("roundtrip");
    let intent = dir.join("intent.json");
    let upload = dir.join("upload.pcm");
    let saved = dir.join("reply.adpcm");
    std::fs::write(
        &intent,
        "```json\n{\"reply\":\"好的，已调到25度\",\"command\":{\"has_command\":true,\"target\":\"空调\",\"action\":\"调节\",\"value\":\"25\"}}\n```",
    )
    .expect("intent should be writable");
    std::fs::write(&upload, vec![0u8; 3200]).expect("upload should be writable");

    let addr = format!("127.0.0.1:{}", free_port());
    let mut server = Command::new(env!("CARGO_BIN_EXE_voxlink"))
        .args(["--log-level", "error", "--format", "json", "serve"])
        .args(["--listen", &addr])
        .args(["--count", "1", "--reply-delay", "0s", "--chunk-delay", "0ms"])
        .arg("--intent-file")
        .arg(&intent)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("serve should start");

    let start = Instant::now();
    let output = loop {
        let output = voxlink(&[
            "--format",
            "json",
            "send",
            &addr,
            "--file",
            upload.to_str().unwrap(),
            "--save-reply",
            saved.to_str().unwrap(),
        ]);
        if output.status.success() {
            break output;
        }
        if start.elapsed() >= Duration::from_secs(5) {
            let _ = server.kill();
            panic!("send never succeeded: {output:?}");
        }
        thread::sleep(Duration::from_millis(50));
    };

    let value = stdout_json(&output);
    assert_eq!(value["upload_bytes"], 3200);
    assert_eq!(value["control"]["status"], "ok");
    assert_eq!(value["control"]["reply_text"], "好的，已调到25度");
    assert_eq!(value["control"]["control"]["value"], "25");
    assert_eq!(value["control"]["control"]["ir_code"], "B24DA05FC03F");
    assert_eq!(value["audio_bytes"], 0);
    assert!(saved.exists());

    let served = server.wait_with_output().expect("serve should exit");
    assert!(served.status.success(), "{served:?}");
    let report: serde_json::Value =
        serde_json::from_slice(&served.stdout).expect("report should be json");
    assert_eq!(report["ingest_bytes"], 3200);
    assert_eq!(report["ir_code"], "B24DA05FC03F");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn version_prints_name() {
    let output = voxlink(&["version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("voxlink "));
}
