fn main() {
    if let Err(e) = csv_render::cli::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
