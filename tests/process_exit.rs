//! Exit-code behaviour, checked by re-running this test binary as a child
//! process in one of the modes below.
#![cfg(unix)]

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{Ipv4Addr, SocketAddr, TcpStream},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use procvisor::{
    FATAL_EXIT_CODE, FailurePolicy, OpError, OpFn, Process, ProcessConfig, Scope, Supervisor,
    SupervisorState, WATCHDOG_EXIT_CODE,
};

const CHILD_MODE: &str = "PROCVISOR_EXIT_TEST_MODE";
const READY_LINE: &str = "child: running";
const CLEANED_LINE: &str = "child: cleaned";
const RETURNED_LINE: &str = "child: run returned";
const LISTENING_PREFIX: &str = "child: listening on ";
const CHECKING_LINE: &str = "child: readiness check started";

fn cfg(shutdown_timeout: Duration, failure_policy: FailurePolicy) -> ProcessConfig {
    ProcessConfig {
        health_addr: Some(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))),
        shutdown_timeout,
        failure_policy,
        ..ProcessConfig::default()
    }
}

async fn stuck_clean() {
    let process = Process::builder()
        .stop(OpFn::arc("stuck", |_scope: Scope| async {
            std::future::pending::<()>().await;
            Ok::<_, OpError>(())
        }))
        .build();

    let sup = Supervisor::builder(cfg(Duration::from_millis(50), FailurePolicy::Log)).build();
    let _ = sup.run_until(process, async {}).await;
    println!("{RETURNED_LINE}");
}

async fn graceful_on_signal() {
    let process = Process::builder()
        .start(OpFn::arc("serve", |scope: Scope| async move {
            scope.cancelled().await;
            Ok::<_, OpError>(())
        }))
        .stop(OpFn::arc("stop", |_scope: Scope| async {
            println!("{CLEANED_LINE}");
            Ok::<_, OpError>(())
        }))
        .build();

    let sup = Supervisor::builder(cfg(Duration::from_secs(5), FailurePolicy::Log)).build();
    let mut state = sup.watch_state();
    tokio::spawn(async move {
        if state.wait_for(|s| *s == SupervisorState::Running).await.is_ok() {
            println!("{READY_LINE}");
        }
    });

    sup.run(process).await.unwrap();
    println!("{RETURNED_LINE}");
}

/// Readiness check that is still running when shutdown begins.
async fn readiness_in_flight(cooperative: bool) {
    let process = Process::builder()
        .start(OpFn::arc("serve", |scope: Scope| async move {
            scope.cancelled().await;
            Ok::<_, OpError>(())
        }))
        .ready(OpFn::arc("slow-ready", move |scope: Scope| async move {
            println!("{CHECKING_LINE}");
            if !cooperative {
                std::future::pending::<()>().await;
            }
            scope.cancelled().await;
            scope.check()
        }))
        .stop(OpFn::arc("stop", |_scope: Scope| async {
            println!("{CLEANED_LINE}");
            Ok::<_, OpError>(())
        }))
        .build();

    let sup = Supervisor::builder(cfg(Duration::from_millis(300), FailurePolicy::Log)).build();
    let watcher = sup.clone();
    tokio::spawn(async move {
        let mut state = watcher.watch_state();
        if state.wait_for(|s| *s == SupervisorState::Running).await.is_ok() {
            if let Some(addr) = watcher.health_addr() {
                println!("{LISTENING_PREFIX}{addr}");
            }
        }
    });

    sup.run(process).await.unwrap();
    println!("{RETURNED_LINE}");
}

async fn fatal_serve_failure() {
    let process = Process::builder()
        .start(OpFn::arc("serve", |_scope: Scope| async {
            Err::<(), _>(OpError::fail("listener crashed"))
        }))
        .build();

    let sup = Supervisor::builder(cfg(Duration::from_secs(5), FailurePolicy::Exit)).build();
    let _ = sup.run(process).await;
    println!("{RETURNED_LINE}");
}

/// Entry point for the child process; a no-op in a normal test run.
#[test]
fn child_entry() {
    let Ok(mode) = std::env::var(CHILD_MODE) else {
        return;
    };
    let rt = tokio::runtime::Runtime::new().unwrap();
    match mode.as_str() {
        "stuck-clean" => rt.block_on(stuck_clean()),
        "graceful" => rt.block_on(graceful_on_signal()),
        "cooperative-readiness" => rt.block_on(readiness_in_flight(true)),
        "stuck-readiness" => rt.block_on(readiness_in_flight(false)),
        "fatal" => rt.block_on(fatal_serve_failure()),
        other => panic!("unknown child mode {other}"),
    }
}

fn spawn_child(mode: &str) -> Child {
    Command::new(std::env::current_exe().unwrap())
        .args(["child_entry", "--exact", "--nocapture", "--quiet", "--test-threads=1"])
        .env(CHILD_MODE, mode)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> ExitStatus {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("child did not exit within {limit:?}");
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn send_signal(child: &Child, signal: libc::c_int) {
    let pid = i32::try_from(child.id()).unwrap();
    // SAFETY: plain kill(2) on a child we own.
    assert_eq!(unsafe { libc::kill(pid, signal) }, 0);
}

fn read_lines(child: &mut Child) -> Vec<String> {
    let stdout = child.stdout.take().unwrap();
    BufReader::new(stdout).lines().map_while(Result::ok).collect()
}

#[test]
fn watchdog_exits_when_clean_misses_the_deadline() {
    let mut child = spawn_child("stuck-clean");
    let status = wait_with_deadline(&mut child, Duration::from_secs(10));
    let lines = read_lines(&mut child);

    assert_eq!(status.code(), Some(WATCHDOG_EXIT_CODE));
    assert!(!lines.iter().any(|l| l == RETURNED_LINE));
}

fn assert_graceful_on(signal: libc::c_int) {
    let mut child = spawn_child("graceful");
    let stdout = child.stdout.take().unwrap();
    let mut lines = BufReader::new(stdout).lines().map_while(Result::ok);

    assert!(lines.by_ref().any(|l| l == READY_LINE));
    send_signal(&child, signal);

    let rest: Vec<String> = lines.collect();
    let status = wait_with_deadline(&mut child, Duration::from_secs(10));

    assert!(status.success(), "signal {signal}: child exited with {status}");
    assert!(rest.iter().any(|l| l == CLEANED_LINE), "signal {signal}: clean did not run");
    assert!(rest.iter().any(|l| l == RETURNED_LINE), "signal {signal}: run did not return");
}

#[test]
fn sigint_shuts_down_gracefully() {
    assert_graceful_on(libc::SIGINT);
}

#[test]
fn sighup_shuts_down_gracefully() {
    assert_graceful_on(libc::SIGHUP);
}

#[test]
fn sigterm_shuts_down_gracefully() {
    assert_graceful_on(libc::SIGTERM);
}

#[test]
fn sigquit_shuts_down_gracefully() {
    assert_graceful_on(libc::SIGQUIT);
}

struct InFlightOutcome {
    status: ExitStatus,
    lines: Vec<String>,
    response: String,
}

/// Sends `GET /ready`, waits until the check is running, then sends SIGTERM.
fn shutdown_with_readiness_in_flight(mode: &str) -> InFlightOutcome {
    let mut child = spawn_child(mode);
    let stdout = child.stdout.take().unwrap();
    let mut lines = BufReader::new(stdout).lines().map_while(Result::ok);

    let addr: SocketAddr = lines
        .by_ref()
        .find_map(|l| l.strip_prefix(LISTENING_PREFIX).map(|a| a.parse().unwrap()))
        .unwrap();
    let mut conn = TcpStream::connect(addr).unwrap();
    conn.write_all(b"GET /ready HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .unwrap();
    assert!(lines.by_ref().any(|l| l == CHECKING_LINE));

    send_signal(&child, libc::SIGTERM);
    let rest: Vec<String> = lines.collect();
    let status = wait_with_deadline(&mut child, Duration::from_secs(10));

    conn.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut response = String::new();
    let _ = conn.read_to_string(&mut response);

    InFlightOutcome {
        status,
        lines: rest,
        response,
    }
}

#[test]
fn in_flight_readiness_check_drains_on_shutdown() {
    for _ in 0..5 {
        let out = shutdown_with_readiness_in_flight("cooperative-readiness");

        assert!(out.status.success(), "child exited with {}", out.status);
        assert!(out.lines.iter().any(|l| l == CLEANED_LINE));
        assert!(out.lines.iter().any(|l| l == RETURNED_LINE));
        assert!(out.response.starts_with("HTTP/1.1 503"), "{}", out.response);
        assert!(out.response.ends_with("context canceled"), "{}", out.response);
    }
}

#[test]
fn stuck_readiness_check_never_trips_the_watchdog() {
    for _ in 0..5 {
        let out = shutdown_with_readiness_in_flight("stuck-readiness");

        assert_eq!(out.status.code(), Some(0), "child exited with {}", out.status);
        assert!(out.lines.iter().any(|l| l == CLEANED_LINE));
        assert!(out.lines.iter().any(|l| l == RETURNED_LINE));
    }
}

#[test]
fn exit_policy_ends_the_process_after_a_serve_failure() {
    let mut child = spawn_child("fatal");
    let status = wait_with_deadline(&mut child, Duration::from_secs(10));
    let lines = read_lines(&mut child);

    assert_eq!(status.code(), Some(FATAL_EXIT_CODE));
    assert!(!lines.iter().any(|l| l == RETURNED_LINE));
}
