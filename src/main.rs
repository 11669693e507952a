fn main() {
    if let Err(err) = backtrack_lib::run() {
        eprintln!("backtrack: {err:#}");
        std::process::exit(1);
    }
}
