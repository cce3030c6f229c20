//! Session tests driving `Shell::run` over in-memory streams.

use dn42_shell::{
    registry::{key::PublicKey, Asn, Authorizer, Registry, SessionIdentity},
    CommandTable, Exit, Flow, PeerStatus, Peering, Shell, ShellConfig, ERASE,
};
use std::{
    net::IpAddr,
    sync::{mpsc, Arc, Mutex},
    time::Duration,
};

const INTRO: &str = "AS4242420263 SSH Shell. Type help or ? to list commands.\r\n";
const PROMPT: &str = "\r\nAS4242420263> ";
const WG_KEY: &str = "kLYW7G/H7bOr6RD+9Cd0Nh5uFyu1ShDIkt/l7P+fQnU=";

/// Peering backend recording every call.
#[derive(Debug, Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

impl Recorder {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Peering for Recorder {
    fn peer_create(&self, asn: &Asn, public_key: &str, endpoint: IpAddr, port: u16) -> bool {
        self.record(format!("create {asn} {public_key} {endpoint} {port}"));
        true
    }

    fn peer_remove(&self, asn: &Asn) -> bool {
        self.record(format!("remove {asn}"));
        true
    }

    fn peer_status(&self, asn: &Asn) -> Option<PeerStatus> {
        self.record(format!("status {asn}"));
        None
    }

    fn list_peers(&self) -> Vec<Asn> {
        vec![Asn::new("4242420266"), Asn::new("4242420276")]
    }
}

/// Peering backend whose `peer_create` waits until another session opens it.
#[derive(Debug)]
struct Gate {
    open: Mutex<mpsc::Receiver<()>>,
}

impl Peering for Gate {
    fn peer_create(&self, _: &Asn, _: &str, _: IpAddr, _: u16) -> bool {
        let open = self.open.lock().unwrap();
        open.recv_timeout(Duration::from_secs(10)).is_ok()
    }

    fn peer_remove(&self, _: &Asn) -> bool {
        true
    }

    fn peer_status(&self, _: &Asn) -> Option<PeerStatus> {
        None
    }

    fn list_peers(&self) -> Vec<Asn> {
        Vec::new()
    }
}

fn config() -> ShellConfig {
    ShellConfig::new(&Asn::new("4242420263"))
}

fn foo() -> SessionIdentity {
    SessionIdentity::new("foo", vec![Asn::new("4242420263"), Asn::new("4242420264")])
}

/// Run a session of `identity` over `input`, returning the exit and
/// everything written to the client.
async fn session(shell: &Shell, identity: &SessionIdentity, input: &[u8]) -> (Exit, String) {
    let mut output = Vec::new();
    let exit = shell.run(identity, input, &mut output).await.unwrap();
    (exit, String::from_utf8(output).unwrap())
}

fn recording_shell() -> (Shell, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let shell = Shell::new(config(), CommandTable::builtin(), recorder.clone());
    (shell, recorder)
}

#[tokio::test]
async fn bye_ends_session() {
    let (exit, output) = session(&Shell::builtin(config()), &foo(), b"bye\r").await;

    assert_eq!(exit, Exit::Command);
    assert_eq!(
        output,
        format!("{INTRO}{PROMPT}bye\r\nSee you later!\r\n")
    );
}

#[tokio::test]
async fn input_after_bye_is_ignored() {
    let (exit, output) = session(&Shell::builtin(config()), &foo(), b"bye\rgreet\r").await;

    assert_eq!(exit, Exit::Command);
    assert!(!output.contains("Hello there!"));
}

#[tokio::test]
async fn backspace_edits_line() {
    let (exit, output) = session(&Shell::builtin(config()), &foo(), b"hey\x7fllo\r").await;
    let erase = String::from_utf8(ERASE.to_vec()).unwrap();

    assert_eq!(exit, Exit::EndOfInput);
    assert_eq!(
        output,
        format!("{INTRO}{PROMPT}hey{erase}llo\r\n*** Unknown syntax: hello\r\n{PROMPT}")
    );
}

#[tokio::test]
async fn backspace_on_empty_line_writes_nothing() {
    let (exit, output) = session(&Shell::builtin(config()), &foo(), b"\x7f\x7f").await;

    assert_eq!(exit, Exit::EndOfInput);
    assert_eq!(output, format!("{INTRO}{PROMPT}"));
}

#[tokio::test]
async fn close_with_partial_line_ends_session() {
    let (exit, output) = session(&Shell::builtin(config()), &foo(), b"bye").await;

    assert_eq!(exit, Exit::EndOfInput);
    assert!(!output.contains("See you later!"));
}

#[tokio::test]
async fn empty_line_ends_session() {
    let (exit, output) = session(&Shell::builtin(config()), &foo(), b"\rgreet\r").await;

    assert_eq!(exit, Exit::EndOfInput);
    assert_eq!(output, format!("{INTRO}{PROMPT}\r\n"));
}

#[tokio::test]
async fn whitespace_only_line_writes_empty_line() {
    let (exit, output) = session(&Shell::builtin(config()), &foo(), b"   \rbye\r").await;

    assert_eq!(exit, Exit::Command);
    assert_eq!(
        output,
        format!("{INTRO}{PROMPT}   \r\n\r\n{PROMPT}bye\r\nSee you later!\r\n")
    );
}

#[tokio::test]
async fn unknown_command_keeps_session_open() {
    let input = b"foobar arg1\rgreet\rbye\n";
    let (exit, output) = session(&Shell::builtin(config()), &foo(), input).await;

    assert_eq!(exit, Exit::Command);
    assert!(output.contains("foobar arg1\r\n*** Unknown syntax: foobar arg1\r\n"));
    assert!(output.contains("Hello there!\r\n"));
}

#[tokio::test]
async fn tabs_are_ignored() {
    let (_, output) = session(&Shell::builtin(config()), &foo(), b"gr\teet\tAda\r").await;

    assert!(output.contains("greetAda\r\n*** Unknown syntax: greetAda\r\n"));
}

#[tokio::test]
async fn help() {
    let (_, output) = session(&Shell::builtin(config()), &foo(), b"help\r?bye\rhelp nope\r").await;

    assert!(output.contains(concat!(
        "Documented commands (type help <topic>):\r\n",
        "========================================\r\n",
        "bye  create  greet  help  peers  remove  status  whoami\r\n",
    )));
    assert!(!output.contains("Undocumented commands:"));
    assert!(output.contains("bye\r\nEnd the session.\r\n"));
    assert!(output.contains("*** No help on nope\r\n"));
}

#[tokio::test]
async fn help_lists_undocumented_commands() {
    let mut commands = CommandTable::builtin();
    commands.insert("ping", None, |ctx, _| {
        ctx.output.line("pong");
        Flow::Continue
    });

    let shell = Shell::new(config(), commands, Arc::new(Recorder::default()));
    let (_, output) = session(&shell, &foo(), b"help\rping\r").await;

    assert!(output.contains("Undocumented commands:\r\n======================\r\nping\r\n"));
    assert!(output.contains("pong\r\n"));
}

#[tokio::test]
async fn whoami() {
    let (_, output) = session(&Shell::builtin(config()), &foo(), b"whoami\r").await;

    assert!(output.contains("| Maintainer | AS           |\r\n"));
    assert!(output.contains("| FOO-MNT    | AS4242420263 |\r\n"));
    assert!(output.contains("| FOO-MNT    | AS4242420264 |\r\n"));
}

#[tokio::test]
async fn peers() {
    let (_, output) = session(&Shell::builtin(config()), &foo(), b"peers\r").await;

    assert!(output.contains(concat!(
        " Known peers\r\n",
        "+------------+\r\n",
        "| AS         |\r\n",
        "+------------+\r\n",
        "| 4242420266 |\r\n",
        "| 4242420276 |\r\n",
        "+------------+\r\n",
    )));
}

#[tokio::test]
async fn peering_on_foreign_asn_is_denied() {
    let (shell, recorder) = recording_shell();
    let input = format!(
        "create AS4242420265 {WG_KEY} fd42::1 51820\rremove 4242420265\rstatus as4242420265\r"
    );
    let (_, output) = session(&shell, &foo(), input.as_bytes()).await;

    assert_eq!(
        output
            .matches("*** AS4242420265 is not maintained by foo\r\n")
            .count(),
        3
    );
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn peering_on_own_asn() {
    let (shell, recorder) = recording_shell();
    let input = format!(
        "create AS4242420263 {WG_KEY} [fd42::1] 51820\rremove 4242420264\rstatus as4242420263\r"
    );
    let (_, output) = session(&shell, &foo(), input.as_bytes()).await;

    assert!(output.contains("Peering with AS4242420263 created\r\n"));
    assert!(output.contains("Peering with AS4242420264 removed\r\n"));
    assert!(output.contains("No peering with AS4242420263\r\n"));
    assert_eq!(
        recorder.calls(),
        [
            format!("create 4242420263 {WG_KEY} fd42::1 51820"),
            "remove 4242420264".to_owned(),
            "status 4242420263".to_owned(),
        ]
    );
}

#[tokio::test]
async fn create_validates_arguments() {
    let (shell, recorder) = recording_shell();
    let input = format!(
        concat!(
            "create 4242420263\r",
            "create 4242420263 c2hvcnQ= fd42::1 51820\r",
            "create 4242420263 {key} fd42::1 0\r",
            "create 4242420263 {key} fd42::1 65536\r",
            "create 4242420263 {key} 192.0.2.1 51820\r",
            "create nope {key} fd42::1 51820\r",
        ),
        key = WG_KEY
    );
    let (_, output) = session(&shell, &foo(), input.as_bytes()).await;

    assert!(output.contains(
        "*** Usage: create <asn> <wg-public-key> <endpoint> <port>\r\n"
    ));
    assert!(output.contains("*** Invalid WireGuard public key: c2hvcnQ=\r\n"));
    assert!(output.contains("*** Invalid port: 0\r\n"));
    assert!(output.contains("*** Invalid port: 65536\r\n"));
    assert!(output.contains("*** Endpoint 192.0.2.1 has no IPv6 address\r\n"));
    assert!(output.contains("*** Invalid AS number: nope\r\n"));
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn session_from_registry_identity() {
    let authorizer = Authorizer::new(Registry::open("../dn42-registry/tests/registry"));
    let key = PublicKey::from_openssh(
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIKLZfD1c+ILxiPG8JrGCBqZ6ixoZh8RJpqeZO6avutSc bar",
    )
    .unwrap();

    let identity = authorizer.authenticate("bar", key.key_data()).unwrap();
    let (shell, recorder) = recording_shell();
    let (_, output) = session(&shell, &identity, b"remove 4242420265\rremove 4242420263\r").await;

    assert!(output.contains("Peering with AS4242420265 removed\r\n"));
    assert!(output.contains("*** AS4242420263 is not maintained by bar\r\n"));
    assert_eq!(recorder.calls(), ["remove 4242420265"]);
}

#[tokio::test]
async fn blocking_command_does_not_stall_other_sessions() {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);

    let mut commands = CommandTable::builtin();
    commands.insert("open", None, move |ctx, _| {
        tx.lock().unwrap().send(()).unwrap();
        ctx.output.line("opened");
        Flow::Continue
    });

    let gate = Arc::new(Gate {
        open: Mutex::new(rx),
    });
    let shell = Shell::new(config(), commands, gate);
    let identity = foo();
    let create = format!("create AS4242420263 {WG_KEY} fd42::1 51820\r");

    // both sessions share the single test runtime thread
    let ((_, waiting), (_, opening)) = tokio::join!(
        session(&shell, &identity, create.as_bytes()),
        session(&shell, &identity, b"open\r"),
    );

    assert!(waiting.contains("Peering with AS4242420263 created\r\n"));
    assert!(opening.contains("opened\r\n"));
}

#[tokio::test(start_paused = true)]
async fn idle_timeout() {
    let shell = Shell::builtin(config().idle_timeout(Duration::from_secs(300)));
    let (client, server) = tokio::io::duplex(1024);
    let (reader, writer) = tokio::io::split(server);

    let exit = shell.run(&foo(), reader, writer).await.unwrap();
    assert_eq!(exit, Exit::IdleTimeout);
    drop(client);
}
