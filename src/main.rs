fn main() {
    if let Err(err) = reconflow::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
