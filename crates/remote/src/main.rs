use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use crossterm::event::EventStream;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use discobot_protocol::{Direction, MotionCommand};
use log::LevelFilter;
use reedline::{DefaultPrompt, DefaultPromptSegment, Prompt, Reedline};

use crate::connection::{DryRunLink, Link, SerialLink};
use crate::session::Session;

mod connection;
mod dispatch;
mod display;
mod error;
mod input;
mod session;

const TICK: Duration = Duration::from_millis(50);

const HELP: &str = "\
commands:
  ports         list the serial ports on this machine
  open [PORT]   open a serial port (defaults to the one given on the command line)
  close         close the serial port
  drive         drive with the arrow keys or w/a/s/d
  toggle DIR    toggle one of up, down, left, right
  stop          let go of everything and stop the robot
  test          send a single forward command
  status        show what's held and what the robot was told
  quit          exit";

/// Drive a DiscoBot over its serial link.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Serial port to open on startup, like /dev/ttyACM0 or COM3.
    port: Option<String>,
    #[arg(long, default_value_t = connection::DEFAULT_BAUD)]
    baud: u32,
    /// How long to wait after opening the port before sending anything.
    #[arg(long, default_value_t = 2000)]
    settle_ms: u64,
    /// Log commands instead of sending them.
    #[arg(long)]
    dry_run: bool,
    /// List the available serial ports and exit.
    #[arg(long)]
    list: bool,
}

#[derive(Debug)]
enum Error {
    Exit,
    Err(anyhow::Error),
}

impl<E> From<E> for Error
where
    E: Into<anyhow::Error>,
{
    fn from(e: E) -> Self {
        Error::Err(e.into())
    }
}

type Result<T> = std::result::Result<T, Error>;

fn string_prompt(s: &str) -> DefaultPrompt {
    DefaultPrompt::new(
        DefaultPromptSegment::Basic(s.to_owned()),
        DefaultPromptSegment::Empty,
    )
}

fn read_cmd(reed: &mut Reedline, prompt: &dyn Prompt) -> Result<String> {
    let s = reed.read_line(prompt)?;
    match s {
        reedline::Signal::Success(s) => Ok(s),
        reedline::Signal::CtrlC | reedline::Signal::CtrlD => Err(Error::Exit),
    }
}

fn print_ports() -> anyhow::Result<()> {
    let ports = connection::list_ports()?;
    if ports.is_empty() {
        eprintln!("no serial ports found");
    }
    for p in ports {
        println!("{p}");
    }
    Ok(())
}

async fn open_link(args: &Args, port: Option<&str>) -> anyhow::Result<Link> {
    if args.dry_run {
        return Ok(Link::DryRun(DryRunLink::new(port.unwrap_or("dry-run"))));
    }
    let port = port.ok_or_else(|| anyhow!("which port? `ports` lists the available ones"))?;
    let settle = Duration::from_millis(args.settle_ms);
    Ok(Link::Serial(SerialLink::open(port, args.baud, settle).await?))
}

async fn open(
    args: &Args,
    session: &mut Session<Option<Link>>,
    port: Option<&str>,
) -> anyhow::Result<()> {
    close(session).await;
    let link = open_link(args, port.or(args.port.as_deref())).await?;
    session.attach(link);
    // Whatever the robot was doing before the port opened, it's now in step
    // with what's held.
    session.release_all()?;
    Ok(())
}

async fn close(session: &mut Session<Option<Link>>) {
    if session.writer().is_none() {
        return;
    }
    if let Err(e) = session.release_all() {
        log::warn!("couldn't stop the robot before closing: {e}");
    }
    if let Some(link) = session.detach() {
        link.close().await;
    }
}

async fn drive_mode(session: &mut Session<Option<Link>>) -> Result<()> {
    eprintln!("Arrow keys or w/a/s/d to steer, <space> to stop, q to leave.");
    enable_raw_mode()?;

    let ret = input::drive(&mut EventStream::new(), session).await;

    disable_raw_mode()?;
    Ok(ret?)
}

async fn command_mode(args: &Args, session: &mut Session<Option<Link>>) -> Result<()> {
    let mut reed = Reedline::create();
    let prompt = string_prompt("discobot");
    loop {
        let line = read_cmd(&mut reed, &prompt)?;
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            continue;
        };
        let arg = words.next();

        let ret: anyhow::Result<()> = match cmd {
            "quit" | "exit" => break,
            "help" | "?" => {
                eprintln!("{HELP}");
                Ok(())
            }
            "ports" => print_ports(),
            "open" => open(args, session, arg).await,
            "close" => {
                if session.writer().is_none() {
                    eprintln!("no port is open");
                }
                close(session).await;
                Ok(())
            }
            "drive" => match drive_mode(session).await {
                Ok(()) => Ok(()),
                Err(Error::Exit) => return Err(Error::Exit),
                Err(Error::Err(e)) => Err(e),
            },
            "toggle" => {
                let arg = arg.unwrap_or_default();
                match arg.parse::<Direction>() {
                    Ok(d) => session.toggle(d).map(|_| ()).map_err(Into::into),
                    Err(_) => Err(error::Error::InvalidDirection(arg.to_owned()).into()),
                }
            }
            "stop" => session.release_all().map_err(Into::into),
            "test" => session.send(MotionCommand::Forward).map_err(Into::into),
            "status" => {
                match session.writer() {
                    Some(link) => eprintln!("port: {}", link.name()),
                    None => eprintln!("port: not open"),
                }
                Ok(())
            }
            _ => Err(anyhow!("unknown command {cmd:?}, try `help`")),
        };

        match ret {
            Ok(()) => {
                if matches!(cmd, "toggle" | "stop" | "status") {
                    eprintln!("{}", display::status_line(session.signals()));
                }
            }
            Err(e) => eprintln!("error: {e:#}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    if args.list {
        return print_ports();
    }

    let mut session: Session<Option<Link>> = Session::new(None);
    if args.port.is_some() || args.dry_run {
        if let Err(e) = open(&args, &mut session, None).await {
            eprintln!("error: {e:#}");
        }
    }
    eprintln!("Type `help` for a list of commands.");

    let ret = command_mode(&args, &mut session).await;
    close(&mut session).await;
    eprintln!("exiting...");

    match ret {
        Ok(()) | Err(Error::Exit) => Ok(()),
        Err(Error::Err(e)) => Err(e),
    }
}
