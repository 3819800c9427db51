use std::process;

fn main() {
    if let Err(e) = lmchat::cli::main() {
        eprintln!("❌ {e}");
        process::exit(1);
    }
}
