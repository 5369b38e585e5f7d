#![forbid(unsafe_code)]
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::{env, ffi, fs};

use clap::{Arg, ArgAction, ArgGroup};
use lzw16::channel::CodeReader;
use lzw16::{Decoder, Encoder, DEFAULT_BIT_LENGTH, MAX_BIT_LENGTH};
use tracing_subscriber::EnvFilter;

fn main() -> CodingResult {
    init_logging();
    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os());
        run_coding(flags)
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lzw=info,lzw16=info"));
    // Stdout may carry the coded data.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_coding(flags: Flags) -> Result<(), io::Error> {
    let Flags {
        input,
        operation,
        bit_length,
        output,
    } = flags;

    let output = match (output, &input) {
        (Some(path), _) => Output::File(path),
        (None, Input::File(path)) if operation != Operation::Codes => {
            Output::File(output_path(path, operation))
        }
        (None, _) => Output::Stdout,
    };

    if let (Input::File(from), Output::File(to)) = (&input, &output) {
        if is_same_file(from, to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("refusing to overwrite the input {}", from.display()),
            ));
        }
    }

    let reader: Box<dyn BufRead> = match &input {
        Input::File(path) => Box::new(io::BufReader::with_capacity(1 << 16, fs::File::open(path)?)),
        Input::Stdin => Box::new(io::BufReader::with_capacity(1 << 16, io::stdin())),
    };
    let mut writer: Box<dyn Write> = match &output {
        Output::File(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        Output::Stdout => Box::new(io::BufWriter::new(io::stdout())),
    };

    tracing::info!(?input, ?output, bit_length, ?operation, "started");
    let result = match operation {
        Operation::Encode => {
            let mut encoder = Encoder::new(bit_length)?;
            encoder.into_stream(&mut writer).encode_all(reader)
        }
        Operation::Decode => {
            let mut decoder = Decoder::new(bit_length)?;
            decoder.into_stream(&mut writer).decode_all(reader)
        }
        Operation::Codes => {
            list_codes(reader, &mut writer)?;
            return writer.flush();
        }
    };

    // Flush what was decoded even if the stream turned out to be broken.
    writer.flush()?;
    result.status?;
    tracing::info!(
        bytes_read = result.bytes_read,
        bytes_written = result.bytes_written,
        "finished"
    );
    Ok(())
}

/// Whether both paths name the same existing file, however they are spelled.
fn is_same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }

    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        // A missing output can not be the input.
        _ => false,
    }
}

/// Print every code of an encoded stream on its own line.
fn list_codes(reader: impl Read, writer: &mut impl Write) -> io::Result<()> {
    for code in CodeReader::new(reader) {
        writeln!(writer, "{}", code?)?;
    }
    Ok(())
}

/// Derive the output file next to the input.
///
/// Encoding turns `name.ext` into `name.lzw`, decoding turns it into `name_decoded.txt`.
fn output_path(input: &Path, operation: Operation) -> PathBuf {
    match operation {
        Operation::Encode => input.with_extension("lzw"),
        Operation::Decode | Operation::Codes => {
            let mut name = input
                .file_stem()
                .map(ffi::OsStr::to_os_string)
                .unwrap_or_default();
            name.push("_decoded.txt");
            input.with_file_name(name)
        }
    }
}

struct Flags {
    input: Input,
    operation: Operation,
    bit_length: u8,
    output: Option<PathBuf>,
}

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

#[derive(Debug)]
enum Output {
    File(PathBuf),
    Stdout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Encode,
    Decode,
    Codes,
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Input::Stdin,
            operation: Operation::Encode,
            bit_length: DEFAULT_BIT_LENGTH,
            output: None,
        }
    }
}

fn command() -> clap::Command {
    clap::Command::new("lzw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress and decompress files with 16-bit LZW codes")
        .arg(
            Arg::new("decode")
                .short('d')
                .long("decode")
                .action(ArgAction::SetTrue)
                .help("Decode an .lzw file"),
        )
        .arg(
            Arg::new("encode")
                .short('e')
                .long("encode")
                .action(ArgAction::SetTrue)
                .help("Encode a file"),
        )
        .arg(
            Arg::new("codes")
                .short('c')
                .long("codes")
                .action(ArgAction::SetTrue)
                .help("Print the codes of an .lzw file, one per line"),
        )
        .group(
            ArgGroup::new("operation")
                .args(["decode", "encode", "codes"])
                .multiple(false)
                .required(true),
        )
        .arg(
            Arg::new("bit_length")
                .short('w')
                .long("bit-length")
                .value_parser(clap::value_parser!(u8).range(1..=i64::from(MAX_BIT_LENGTH)))
                .help("Limit the dictionary to 2^N entries, must match when decoding"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Output file, derived from the input by default"),
        )
        .arg(
            Arg::new("file")
                .default_value("-")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Input file or '-' for stdin"),
        )
}

impl Flags {
    fn from_args(args: impl IntoIterator<Item = ffi::OsString>) -> Self {
        let mut flags = Flags::default();
        let matches = command().get_matches_from(args);

        if matches.get_flag("decode") {
            flags.operation = Operation::Decode;
        } else if matches.get_flag("codes") {
            flags.operation = Operation::Codes;
        } else if matches.get_flag("encode") {
            flags.operation = Operation::Encode;
        }

        if let Some(&bits) = matches.get_one::<u8>("bit_length") {
            flags.bit_length = bits;
        }

        flags.output = matches.get_one::<PathBuf>("output").cloned();

        match matches.get_one::<PathBuf>("file") {
            None => flags.input = Input::Stdin,
            Some(p) if *p == PathBuf::from("-") => flags.input = Input::Stdin,
            Some(p) => flags.input = Input::File(p.clone()),
        }

        flags
    }
}

enum CodingResult {
    Ok,
    Err(io::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<(), io::Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                tracing::error!("{}", err);
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
