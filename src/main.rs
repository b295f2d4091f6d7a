fn main() {
    if let Err(e) = cellwm_lib::run() {
        eprintln!("cellwm: {}", e);
        std::process::exit(1);
    }
}
