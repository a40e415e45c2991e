use super::hexdump;
use crate::assembler::{self, disasm, listing, ErrorKind};
use crate::image::Image;
use crate::loader::{self, Config};
use ansi_term::Colour::Red;
use anyhow::{anyhow, Context};
use std::fmt::Display;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[cfg(windows)]
pub fn terminal_init() {
    // Without ANSI support errors are still printed, just uncoloured.
    let _ = ansi_term::enable_ansi_support();
}

#[cfg(not(windows))]
pub fn terminal_init() {}

pub fn logging_init() {
    let env = env_logger::Env::default()
        .filter_or("RAVM_LOG", "warn")
        .write_style("RAVM_LOG_STYLE");
    env_logger::init_from_env(env);
}

#[derive(StructOpt, Debug)]
#[structopt(name = "ravm")]
pub enum CommandRoot {
    /// Assembles a source file into an executable image
    Asm(SubcommandAsm),
    /// Validates an image and shows how it would be laid out in memory
    Inspect(SubcommandInspect),
    /// Prints a file as hex, sixteen bytes to a row
    Dump(SubcommandDump),
    /// Prints the program section of an image as assembly source
    Disasm(SubcommandDisasm),
}

#[derive(StructOpt, Debug)]
#[structopt(name = "rasm")]
pub struct SubcommandAsm {
    #[structopt(name = "input.ras", parse(from_os_str))]
    input: PathBuf,

    #[structopt(name = "output.dat", parse(from_os_str), default_value = "out.dat")]
    output: PathBuf,

    /// Print the label table once assembly succeeds
    #[structopt(short, long)]
    listing: bool,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandInspect {
    #[structopt(name = "image.dat", parse(from_os_str))]
    image: PathBuf,

    /// VM memory in megabytes, not counting the data section
    #[structopt(short, long, default_value = "1")]
    memory: u32,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandDump {
    #[structopt(name = "file", parse(from_os_str))]
    file: PathBuf,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandDisasm {
    #[structopt(name = "image.dat", parse(from_os_str))]
    image: PathBuf,
}

fn report(err: impl Display) {
    eprintln!("{} {}", Red.bold().paint("error:"), err);
}

fn finish(result: Result<(), anyhow::Error>) -> ! {
    match result {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            report(format!("{:#}", err));
            std::process::exit(ErrorKind::Generic.exit_code());
        }
    }
}

pub fn root(cmd: CommandRoot) -> ! {
    match cmd {
        CommandRoot::Asm(scmd) => asm(scmd),
        CommandRoot::Inspect(scmd) => finish(inspect(scmd)),
        CommandRoot::Dump(scmd) => finish(dump(scmd)),
        CommandRoot::Disasm(scmd) => finish(disasm(scmd)),
    }
}

/// Assembly failures exit with the status of their error class.
pub fn asm(cmd: SubcommandAsm) -> ! {
    let plan = match assembler::assemble_path(&cmd.input, &cmd.output) {
        Ok(plan) => plan,
        Err(err) => {
            report(&err);
            std::process::exit(err.exit_code());
        }
    };

    if cmd.listing {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(err) = listing::write_listing(plan.symbols(), &mut out).and_then(|_| out.flush())
        {
            report(err);
            std::process::exit(ErrorKind::Generic.exit_code());
        }
    }

    std::process::exit(0);
}

fn read(path: &Path) -> Result<Vec<u8>, anyhow::Error> {
    std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn inspect(cmd: SubcommandInspect) -> Result<(), anyhow::Error> {
    let bytes = read(&cmd.image)?;
    let config = Config::new(cmd.memory)?;
    let loaded = loader::load_bytes(&config, &bytes)
        .with_context(|| format!("cannot load '{}'", cmd.image.display()))?;

    println!("program  {:>10} bytes", loaded.program().len());
    println!(
        "memory   {:>10} bytes  {:#010x}..{:#010x}",
        loaded.memory().len(),
        0,
        loaded.memory().len()
    );
    println!(
        "data     {:>10} bytes  {:#010x}..{:#010x}",
        loaded.data_length(),
        loaded.data_base(),
        loaded.data_base() as u64 + loaded.data_length() as u64
    );
    println!("stack    {:>10} bytes", loaded.stack().len());

    Ok(())
}

fn dump(cmd: SubcommandDump) -> Result<(), anyhow::Error> {
    let bytes = read(&cmd.file)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    hexdump::write_hexdump(&bytes, &mut out)?;
    out.flush()?;
    Ok(())
}

fn disasm(cmd: SubcommandDisasm) -> Result<(), anyhow::Error> {
    let bytes = read(&cmd.image)?;
    let image = Image::parse(&bytes)?;
    let words = image
        .program_words()
        .ok_or_else(|| anyhow!("program section is not a whole number of words"))?;

    print!("{}", disasm::render(&disasm::disassemble(&words)?));
    Ok(())
}
