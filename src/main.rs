use ravm::cli::command;
use structopt::StructOpt;

fn main() {
    command::terminal_init();
    command::logging_init();
    command::root(command::CommandRoot::from_args());
}
