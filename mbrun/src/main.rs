//! Non-interactive driver: parses a `.bas` file, runs it to completion and
//! services the chain/run requests `CHAIN`, `RUN "file"` and `MERGE`
//! publish. Exit code 0 on a clean halt, 1 on a parse failure or an
//! untrapped runtime error.

#[macro_use]
extern crate clap;

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Arg;
use log::debug;

use mbasic::error::{ErrorCode, RuntimeError};
use mbasic::interpreter::{ChainRequest, Interpreter};
use mbasic::io::{DiskFileSystem, StdConsole};
use mbasic::program::HaltReason;

#[derive(Debug)]
enum Error {
    Io(std::io::Error, PathBuf),
    Parse(mbparse::Error),
    Runtime(RuntimeError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io(err, path) => write!(f, "Reading \"{}\" failed: {}", path.display(), err),
            Error::Parse(err) => write!(f, "{}", err),
            Error::Runtime(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    env_logger::init();
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("PROGRAM")
                .help("Sets the BASIC source file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("trace")
                .short("t")
                .long("trace")
                .help("Starts with TRON active"),
        )
        .get_matches();

    let path = matches.value_of("PROGRAM").unwrap();
    let code = match run(path, matches.is_present("trace")) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}", err);
            1
        }
    };
    process::exit(code);
}

fn load(path: &str) -> Result<mbasic::ast::Program, Error> {
    let source =
        fs::read_to_string(path).map_err(|err| Error::Io(err, PathBuf::from(path)))?;
    debug!("read {} bytes from {}", source.len(), path);
    mbparse::parse(&source).map_err(Error::Parse)
}

fn run(path: &str, trace: bool) -> Result<(), Error> {
    let program = load(path)?;
    let mut interpreter = Interpreter::new(
        program,
        Box::new(StdConsole::new()),
        Box::new(DiskFileSystem::new()),
    );
    interpreter.runtime.trace = trace;

    loop {
        match interpreter.run() {
            HaltReason::End => match interpreter.take_request() {
                None => return Ok(()),
                Some(request) => {
                    if !service_request(&mut interpreter, request)? {
                        return Ok(());
                    }
                }
            },
            HaltReason::Stop | HaltReason::Breakpoint | HaltReason::Break => {
                println!("Break in {}", interpreter.pc().line);
                return Ok(());
            }
            HaltReason::Error | HaltReason::Input => {
                let error = interpreter
                    .last_error()
                    .unwrap_or_else(|| RuntimeError::new(ErrorCode::InternalError));
                return Err(Error::Runtime(error));
            }
        }
    }
}

/// Applies one chain/run request; returns whether execution continues.
fn service_request(
    interpreter: &mut Interpreter,
    request: ChainRequest,
) -> Result<bool, Error> {
    match &request.file {
        None => {
            debug!("run request: restart at {:?}", request.start_line);
            interpreter.rerun(request.start_line, request.keep_variables);
            Ok(true)
        }
        Some(file) => {
            debug!(
                "chain request: {} (merge={}, keep={})",
                file, request.merge, request.keep_variables
            );
            let program = load(file)?;
            interpreter.chain(program, &request);
            Ok(request.run_after)
        }
    }
}
