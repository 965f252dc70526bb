fn main() {
    if let Err(err) = annotrack::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
