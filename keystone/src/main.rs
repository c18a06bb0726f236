fn main() {
    if let Err(e) = keystone::run_cli() {
        eprintln!("Error: {e:#}");
        std::process::exit(keystone::exit_status(&e));
    }
}
