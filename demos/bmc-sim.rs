use std::{
    net::{SocketAddr, UdpSocket},
    sync::Arc,
};

use clap::{Parser, ValueEnum};
use ipmi_sim::{
    machine::{BmcRegistry, BootDevice, Machine},
    session::{auth::AuthType, Password, Session, User},
    Bmc, Config,
};

#[derive(Clone, Copy, ValueEnum)]
enum Auth {
    None,
    Md5,
    Key,
}

impl From<Auth> for AuthType {
    fn from(value: Auth) -> Self {
        match value {
            Auth::None => AuthType::None,
            Auth::Md5 => AuthType::MD5,
            Auth::Key => AuthType::Key,
        }
    }
}

#[derive(Parser)]
pub struct Command {
    /// The address to listen on. Must be a concrete IP, since it identifies
    /// the simulated BMC.
    #[clap(long, short, default_value = "127.0.0.1:623")]
    listen: SocketAddr,

    #[clap(long, short, default_value = "admin")]
    username: String,

    #[clap(long, short, default_value = "password")]
    password: String,

    /// Pre-established session to accept requests for. A random one is
    /// opened if not given.
    #[clap(long)]
    session_id: Option<u32>,

    #[clap(long, value_enum, default_value = "md5")]
    auth: Auth,

    /// Drop requests that fail authentication instead of answering them.
    #[clap(long)]
    strict: bool,
}

struct LoggingMachine {
    name: String,
}

impl Machine for LoggingMachine {
    fn set_boot_device(&self, device: BootDevice) {
        log::info!("{}: next boot from {device}", self.name);
    }
}

fn main() -> std::io::Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or("info".to_string()))
        .init();

    let args = Command::parse();

    let password = Password::new(args.password.as_bytes()).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Password may be at most 16 bytes long",
        )
    })?;

    let socket = Arc::new(UdpSocket::bind(args.listen)?);
    let local_ip = socket.local_addr()?.ip();

    let registry = Arc::new(BmcRegistry::new());
    registry.register(
        local_ip,
        Arc::new(LoggingMachine {
            name: format!("vm@{local_ip}"),
        }),
    );

    let config = Config::default().with_strict_authentication(args.strict);
    let bmc = Arc::new(Bmc::new(config, registry));

    let user = User::new(args.username, password);
    let auth_type = args.auth.into();
    let session_id = match args.session_id {
        Some(id) => {
            if bmc.sessions().insert(Session::new(id, user, auth_type, 0)).is_err() {
                let err = std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "Session ID 0 is reserved",
                );
                return Err(err);
            }
            id
        }
        None => bmc.sessions().open(user, auth_type, 0),
    };

    log::info!(
        "Simulated BMC listening on {}, session 0x{session_id:08X}",
        socket.local_addr()?
    );

    let mut buffer = [0u8; 1024];
    loop {
        let (len, from) = match socket.recv_from(&mut buffer) {
            Ok(received) => received,
            Err(e) => {
                log::warn!("Receive failed: {e}");
                continue;
            }
        };

        let data = buffer[..len].to_vec();
        let (bmc, socket) = (bmc.clone(), socket.clone());

        std::thread::spawn(move || bmc.handle_datagram(&*socket, from, &data));
    }
}
