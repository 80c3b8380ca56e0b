//! The control-socket client: joins its arguments into one command line,
//! sends it to the running window manager, and relays the reply.
use std::{
    io::{Read, Write},
    os::unix::net::UnixStream,
    process::exit,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const USAGE: &str = "usage: lathcmd [-hv] <COMMAND>";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None => {
            eprintln!("{}", USAGE);
            exit(2);
        }
        Some("-h") => {
            println!("{}", USAGE);
            return;
        }
        Some("-v") => {
            println!("lathcmd {}", VERSION);
            return;
        }
        _ => (),
    }

    let path = match std::env::var("LATHSOCK") {
        Ok(p) if !p.is_empty() => p,
        _ => {
            eprintln!("lathcmd: LATHSOCK is not set: is lath running?");
            exit(1);
        }
    };

    // Arguments that contained whitespace had their quoting eaten by the
    // shell; re-quote them so the command tokenizer sees them whole.
    let line = args
        .iter()
        .map(|a| {
            if a.contains(char::is_whitespace) {
                format!("\"{}\"", a)
            } else {
                a.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut stream = match UnixStream::connect(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("lathcmd: unable to connect to {}: {}", path, e);
            exit(1);
        }
    };

    if let Err(e) = stream
        .write_all(line.as_bytes())
        .and_then(|_| stream.write_all(b"\n"))
        .and_then(|_| stream.shutdown(std::net::Shutdown::Write))
    {
        eprintln!("lathcmd: unable to send command: {}", e);
        exit(1);
    }

    let mut reply = String::new();
    if let Err(e) = stream.read_to_string(&mut reply) {
        eprintln!("lathcmd: unable to read reply: {}", e);
        exit(1);
    }

    if let Some(msg) = reply.strip_prefix('!') {
        eprintln!("{}", msg);
        exit(1);
    }
    if !reply.is_empty() {
        println!("{}", reply.trim_end());
    }
}
