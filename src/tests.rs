use std::{
    collections::HashSet,
    io,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{
    chassis::{boot_options::BootOptionParameter, SET_SYSTEM_BOOT_OPTIONS},
    connection::{rmcp, CompletionCode, Message, NetFn, Transport},
    dispatch::{Context, Dispatcher, Request},
    machine::{BmcRegistry, BootDevice, Machine},
    session::{
        auth::{self, AuthType},
        Password, Session, User,
    },
    Bmc, Config,
};

const SESSION_ID: u32 = 0x1234_5678;
const INITIAL_SEQUENCE: u32 = 100;

fn bmc_ip() -> IpAddr {
    "10.0.0.2".parse().unwrap()
}

fn client() -> SocketAddr {
    "10.0.0.100:50000".parse().unwrap()
}

fn password() -> Password {
    Password::new(b"password").unwrap()
}

struct MockTransport {
    local_ip: Option<IpAddr>,
    fail: bool,
    sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
}

impl MockTransport {
    fn new(local_ip: Option<IpAddr>) -> Self {
        Self {
            local_ip,
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn failing(local_ip: Option<IpAddr>) -> Self {
        Self {
            fail: true,
            ..Self::new(local_ip)
        }
    }

    fn responses(&self) -> Vec<(rmcp::SessionWrapper, Message)> {
        self.sent
            .lock()
            .iter()
            .map(|(data, to)| {
                assert_eq!(*to, client());
                rmcp::decode(data).unwrap()
            })
            .collect()
    }
}

impl Transport for MockTransport {
    fn local_ip(&self) -> Option<IpAddr> {
        self.local_ip
    }

    fn send_to(&self, data: &[u8], destination: SocketAddr) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::Other, "network unreachable"));
        }

        self.sent.lock().push((data.to_vec(), destination));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingMachine {
    devices: Mutex<Vec<BootDevice>>,
}

impl Machine for RecordingMachine {
    fn set_boot_device(&self, device: BootDevice) {
        self.devices.lock().push(device);
    }
}

struct Harness {
    bmc: Bmc,
    transport: MockTransport,
    machine: Arc<RecordingMachine>,
}

impl Harness {
    fn new(config: Config) -> Self {
        Self::with_transport(config, MockTransport::new(Some(bmc_ip())))
    }

    fn with_transport(config: Config, transport: MockTransport) -> Self {
        Self::with_dispatcher(config, Dispatcher::default(), transport)
    }

    fn with_dispatcher(config: Config, dispatcher: Dispatcher, transport: MockTransport) -> Self {
        let machine = Arc::new(RecordingMachine::default());
        let registry = Arc::new(BmcRegistry::new());
        registry.register(bmc_ip(), machine.clone());

        let bmc = Bmc::with_dispatcher(config, dispatcher, registry);

        let user = User::new("admin", password());
        let session = Session::new(SESSION_ID, user, AuthType::MD5, INITIAL_SEQUENCE);
        assert_eq!(bmc.sessions().insert(session), Ok(None));

        Self {
            bmc,
            transport,
            machine,
        }
    }

    fn send(&self, datagram: &[u8]) {
        self.bmc.handle_datagram(&self.transport, client(), datagram);
    }

    fn boot_option(&self, sequence: u32, data: &[u8]) {
        self.send(&request(
            SESSION_ID,
            sequence,
            AuthType::MD5,
            &password(),
            Message::new_request(NetFn::Chassis, SET_SYSTEM_BOOT_OPTIONS, data.to_vec()),
        ));
    }

    fn session_sequences(&self, session_id: u32) -> (u32, u32) {
        let handle = self.bmc.sessions().lookup(session_id).unwrap();
        let session = handle.lock();
        (session.local_sequence(), session.remote_sequence())
    }

    fn devices(&self) -> Vec<BootDevice> {
        self.machine.devices.lock().clone()
    }
}

fn request(
    session_id: u32,
    sequence: u32,
    auth_type: AuthType,
    password: &Password,
    message: Message,
) -> Vec<u8> {
    let auth_code = auth::compute(auth_type, password, session_id, &message.to_bytes(), sequence);

    let wrapper = rmcp::SessionWrapper {
        auth_type,
        sequence_number: sequence,
        session_id,
        auth_code,
    };

    rmcp::encode(&wrapper, &message).unwrap()
}

fn assert_boot_options_success(message: &Message) {
    assert_eq!(message.netfn(), NetFn::Chassis);
    assert!(message.is_response());
    assert_eq!(message.cmd(), SET_SYSTEM_BOOT_OPTIONS);
    assert_eq!(message.data().len(), 1);
    assert!(CompletionCode::from(message.data()[0]).is_success());
}

#[test]
fn unsupported_parameters_are_acknowledged() {
    let harness = Harness::new(Config::default());

    for (i, selector) in [0x01, 0x02, 0x03, 0x06, 0x07, 0x20].into_iter().enumerate() {
        harness.boot_option(INITIAL_SEQUENCE + i as u32, &[selector, 0xAA]);

        let responses = harness.transport.responses();
        assert_eq!(responses.len(), i + 1, "selector 0x{selector:02X}");

        let (wrapper, message) = responses.last().unwrap();
        assert_boot_options_success(message);
        assert_eq!(wrapper.session_id, SESSION_ID);
        assert_eq!(wrapper.sequence_number, INITIAL_SEQUENCE + 1 + i as u32);
    }

    assert!(harness.devices().is_empty());
}

#[test]
fn boot_flags_set_device() {
    let cases = [
        (0x04, Some(BootDevice::Pxe)),
        (0x08, Some(BootDevice::Disk)),
        (0x14, Some(BootDevice::OpticalDisc)),
        (0x10, None),
        (0x00, None),
        (0x28, None),
    ];

    for (device, expected) in cases {
        let harness = Harness::new(Config::default());

        harness.boot_option(INITIAL_SEQUENCE, &[0x05, 0x80, device, 0x00, 0x00, 0x00]);

        assert_eq!(
            harness.devices(),
            expected.into_iter().collect::<Vec<_>>(),
            "device byte 0x{device:02X}"
        );

        let responses = harness.transport.responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].0.sequence_number, INITIAL_SEQUENCE + 1);
        assert_boot_options_success(&responses[0].1);
    }
}

#[test]
fn truncated_boot_flags_still_answer() {
    let harness = Harness::new(Config::default());

    harness.boot_option(INITIAL_SEQUENCE, &[0x05, 0x80, 0x04]);

    assert_eq!(harness.devices(), vec![BootDevice::Pxe]);
    assert_eq!(harness.transport.responses().len(), 1);
}

#[test]
fn boot_flags_without_machine_are_dropped() {
    let transports = [
        MockTransport::new(Some("10.0.0.3".parse().unwrap())),
        MockTransport::new(None),
    ];

    for transport in transports {
        let harness = Harness::with_transport(Config::default(), transport);

        harness.boot_option(INITIAL_SEQUENCE, &[0x05, 0x80, 0x04, 0x00, 0x00, 0x00]);

        assert!(harness.transport.responses().is_empty());
        assert!(harness.devices().is_empty());
        assert_eq!(
            harness.session_sequences(SESSION_ID),
            (INITIAL_SEQUENCE, INITIAL_SEQUENCE)
        );
    }
}

#[test]
fn other_parameters_do_not_need_a_machine() {
    let harness = Harness::with_transport(Config::default(), MockTransport::new(None));

    harness.boot_option(INITIAL_SEQUENCE, &[0x00, 0x05]);
    harness.boot_option(INITIAL_SEQUENCE + 1, &[0x04, 0x01, 0x01]);
    harness.boot_option(INITIAL_SEQUENCE + 2, &[0x01]);

    let responses = harness.transport.responses();
    assert_eq!(responses.len(), 3);
    responses
        .iter()
        .for_each(|(_, message)| assert_boot_options_success(message));
}

#[test]
fn empty_boot_options_request_reads_as_set_in_progress() {
    let harness = Harness::new(Config::default());

    harness.boot_option(INITIAL_SEQUENCE, &[]);

    let responses = harness.transport.responses();
    assert_eq!(responses.len(), 1);
    assert_boot_options_success(&responses[0].1);
}

#[test]
fn response_is_authenticated() {
    let harness = Harness::new(Config::default());

    harness.boot_option(INITIAL_SEQUENCE, &[0x00, 0x01]);

    let (wrapper, message) = harness.transport.responses().remove(0);

    assert_eq!(wrapper.auth_type, AuthType::MD5);
    assert_eq!(wrapper.sequence_number, INITIAL_SEQUENCE + 1);

    let expected = auth::compute(
        AuthType::MD5,
        &password(),
        SESSION_ID,
        &message.to_bytes(),
        wrapper.sequence_number,
    );

    assert!(auth::verify(wrapper.auth_code.as_ref(), expected.as_ref()));
    assert_eq!(
        harness.session_sequences(SESSION_ID),
        (INITIAL_SEQUENCE + 1, INITIAL_SEQUENCE + 1)
    );
}

#[test]
fn bad_auth_code_is_answered_when_lenient() {
    let harness = Harness::new(Config::default());
    let wrong = Password::new(b"wrong").unwrap();

    harness.send(&request(
        SESSION_ID,
        INITIAL_SEQUENCE,
        AuthType::MD5,
        &wrong,
        Message::new_request(NetFn::Chassis, SET_SYSTEM_BOOT_OPTIONS, vec![0x00, 0x00]),
    ));

    assert_eq!(harness.transport.responses().len(), 1);
    assert_eq!(harness.session_sequences(SESSION_ID).0, INITIAL_SEQUENCE + 1);
}

#[test]
fn bad_auth_code_is_dropped_when_strict() {
    let harness = Harness::new(Config::default().with_strict_authentication(true));
    let wrong = Password::new(b"wrong").unwrap();

    harness.send(&request(
        SESSION_ID,
        INITIAL_SEQUENCE,
        AuthType::MD5,
        &wrong,
        Message::new_request(NetFn::Chassis, SET_SYSTEM_BOOT_OPTIONS, vec![0x00, 0x00]),
    ));

    assert!(harness.transport.responses().is_empty());
    assert_eq!(
        harness.session_sequences(SESSION_ID),
        (INITIAL_SEQUENCE, INITIAL_SEQUENCE)
    );

    harness.boot_option(INITIAL_SEQUENCE, &[0x00, 0x00]);
    assert_eq!(harness.transport.responses().len(), 1);
}

#[test]
fn mismatched_auth_type_is_answered_when_lenient() {
    let harness = Harness::new(Config::default());
    let message = Message::new_request(NetFn::Chassis, SET_SYSTEM_BOOT_OPTIONS, vec![0x00, 0x00]);

    let wrapper = rmcp::SessionWrapper {
        auth_type: AuthType::MD2,
        sequence_number: INITIAL_SEQUENCE,
        session_id: SESSION_ID,
        auth_code: Some([0; 16]),
    };
    harness.send(&rmcp::encode(&wrapper, &message).unwrap());

    let responses = harness.transport.responses();
    assert_eq!(responses.len(), 1);
    assert_eq!(
        harness.session_sequences(SESSION_ID),
        (INITIAL_SEQUENCE + 1, INITIAL_SEQUENCE + 1)
    );

    let (wrapper, message) = &responses[0];
    assert_boot_options_success(message);
    assert_eq!(wrapper.auth_type, AuthType::MD2);
    assert_eq!(wrapper.sequence_number, INITIAL_SEQUENCE + 1);

    let expected = auth::compute(
        AuthType::MD2,
        &password(),
        SESSION_ID,
        &message.to_bytes(),
        wrapper.sequence_number,
    );
    assert!(auth::verify(wrapper.auth_code.as_ref(), expected.as_ref()));
}

#[test]
fn auth_code_covers_received_bytes() {
    let harness = Harness::new(Config::default().with_strict_authentication(true));

    let message = Message::new_request(NetFn::Chassis, SET_SYSTEM_BOOT_OPTIONS, vec![0x00, 0x00]);
    let mut payload = message.to_bytes();
    *payload.last_mut().unwrap() ^= 0xFF;

    let wrapper = rmcp::SessionWrapper {
        auth_type: AuthType::MD5,
        sequence_number: INITIAL_SEQUENCE,
        session_id: SESSION_ID,
        auth_code: auth::compute(AuthType::MD5, &password(), SESSION_ID, &payload, INITIAL_SEQUENCE),
    };

    let mut datagram = Vec::new();
    rmcp::RmcpHeader::new_ipmi().write(&mut datagram);
    wrapper.write(&payload, &mut datagram).unwrap();

    harness.send(&datagram);

    let responses = harness.transport.responses();
    assert_eq!(responses.len(), 1);
    assert_boot_options_success(&responses[0].1);
    assert_eq!(
        harness.session_sequences(SESSION_ID),
        (INITIAL_SEQUENCE + 1, INITIAL_SEQUENCE + 1)
    );
}

#[test]
fn unknown_session() {
    let lenient = Harness::new(Config::default());
    let strict = Harness::new(Config::default().with_strict_authentication(true));

    let datagram = request(
        0xCAFE_0001,
        7,
        AuthType::MD5,
        &password(),
        Message::new_request(NetFn::Chassis, SET_SYSTEM_BOOT_OPTIONS, vec![0x00, 0x00]),
    );

    lenient.send(&datagram);
    strict.send(&datagram);

    let (wrapper, message) = lenient.transport.responses().remove(0);
    assert_eq!(wrapper.auth_type, AuthType::None);
    assert_eq!(wrapper.session_id, 0xCAFE_0001);
    assert_eq!(wrapper.sequence_number, 7);
    assert_boot_options_success(&message);

    assert!(strict.transport.responses().is_empty());
}

#[test]
fn closed_session_is_unknown() {
    let harness = Harness::new(Config::default().with_strict_authentication(true));

    assert!(harness.bmc.sessions().close(SESSION_ID).is_some());
    harness.boot_option(INITIAL_SEQUENCE, &[0x00, 0x00]);

    assert!(harness.transport.responses().is_empty());
}

#[test]
fn unknown_command_is_invalid() {
    let harness = Harness::new(Config::default());

    harness.send(&request(
        SESSION_ID,
        INITIAL_SEQUENCE,
        AuthType::MD5,
        &password(),
        Message::new_request(NetFn::App, 0x01, Vec::new()),
    ));

    let (_, message) = harness.transport.responses().remove(0);
    assert_eq!(message.netfn(), NetFn::App);
    assert!(message.is_response());
    assert_eq!(message.cmd(), 0x01);
    assert_eq!(message.data().len(), 1);
    assert_eq!(
        CompletionCode::from(message.data()[0]),
        CompletionCode::InvalidCommand
    );
}

#[test]
fn responses_and_garbage_are_ignored() {
    let harness = Harness::new(Config::default());

    let response = Message::new_request(NetFn::Chassis, SET_SYSTEM_BOOT_OPTIONS, vec![0x05])
        .response(CompletionCode::Success, &[]);
    harness.send(&request(
        SESSION_ID,
        INITIAL_SEQUENCE,
        AuthType::MD5,
        &password(),
        response,
    ));

    let asf_ping = [0x06, 0x00, 0xFF, 0x06, 0x00, 0x00, 0x11, 0xBE, 0x80, 0x00, 0x00, 0x00];
    harness.send(&asf_ping);
    harness.send(&[0x06, 0x00]);
    harness.send(&[]);

    assert!(harness.transport.responses().is_empty());
    assert_eq!(
        harness.session_sequences(SESSION_ID),
        (INITIAL_SEQUENCE, INITIAL_SEQUENCE)
    );
}

#[test]
fn failed_send_still_advances_session() {
    let harness = Harness::with_transport(
        Config::default(),
        MockTransport::failing(Some(bmc_ip())),
    );

    harness.boot_option(INITIAL_SEQUENCE, &[0x05, 0x80, 0x08, 0x00, 0x00, 0x00]);

    assert_eq!(harness.devices(), vec![BootDevice::Disk]);
    assert_eq!(harness.session_sequences(SESSION_ID).0, INITIAL_SEQUENCE + 1);
}

#[test]
fn custom_boot_option_handler() {
    fn busy(ctx: &Context<'_>, request: &Request<'_>, _: &crate::chassis::boot_options::ParameterSelector<'_>) {
        ctx.respond(request, CompletionCode::NodeBusy, &[]);
    }

    let dispatcher = crate::chassis::register(Dispatcher::builder())
        .boot_option(BootOptionParameter::BootInitiatorInfo, busy)
        .build();

    let harness = Harness::with_dispatcher(
        Config::default(),
        dispatcher,
        MockTransport::new(Some(bmc_ip())),
    );

    harness.boot_option(INITIAL_SEQUENCE, &[0x06, 0x00]);
    harness.boot_option(INITIAL_SEQUENCE + 1, &[0x07, 0x00]);

    let responses = harness.transport.responses();
    assert_eq!(responses[0].1.data(), &[0xC0]);
    assert_eq!(responses[1].1.data(), &[0x00]);
}

#[test]
fn sessionless_exchange() {
    let harness = Harness::new(Config::default());

    let datagram = hex::decode("0600ff07000000000000000000092000e0810008000176").unwrap();
    harness.send(&datagram);

    let sent = harness.transport.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        hex::encode(&sent[0].0),
        "0600ff070000000000000000000881047b20000800d800"
    );
}

#[test]
fn concurrent_sessions_advance_once_per_response() {
    const REQUESTS: u32 = 64;
    const OTHER_SESSION: u32 = 0x0BAD_CAFE;

    let harness = Harness::new(Config::default());
    let other = Session::new(
        OTHER_SESSION,
        User::new("operator", password()),
        AuthType::Key,
        0,
    );
    harness.bmc.sessions().insert(other).unwrap();

    std::thread::scope(|s| {
        for thread in 0..4 {
            let harness = &harness;
            s.spawn(move || {
                for i in 0..REQUESTS / 2 {
                    let (session_id, auth_type) = if (thread + i) % 2 == 0 {
                        (SESSION_ID, AuthType::MD5)
                    } else {
                        (OTHER_SESSION, AuthType::Key)
                    };

                    harness.send(&request(
                        session_id,
                        i,
                        auth_type,
                        &password(),
                        Message::new_request(
                            NetFn::Chassis,
                            SET_SYSTEM_BOOT_OPTIONS,
                            vec![0x01, 0x00],
                        ),
                    ));
                }
            });
        }
    });

    let responses = harness.transport.responses();
    assert_eq!(responses.len(), 2 * REQUESTS as usize);

    let sequences = |session_id: u32| {
        responses
            .iter()
            .filter(|(wrapper, _)| wrapper.session_id == session_id)
            .map(|(wrapper, _)| wrapper.sequence_number)
            .collect::<HashSet<_>>()
    };

    let expected: HashSet<_> = (INITIAL_SEQUENCE + 1..=INITIAL_SEQUENCE + REQUESTS).collect();
    assert_eq!(sequences(SESSION_ID), expected);
    assert_eq!(sequences(OTHER_SESSION), (1..=REQUESTS).collect::<HashSet<_>>());

    assert_eq!(
        harness.session_sequences(SESSION_ID),
        (INITIAL_SEQUENCE + REQUESTS, INITIAL_SEQUENCE + REQUESTS)
    );
    assert_eq!(
        harness.session_sequences(OTHER_SESSION),
        (REQUESTS, REQUESTS)
    );
}
