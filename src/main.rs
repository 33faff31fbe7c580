fn main() {
    if let Err(err) = json_ndv_gen::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
