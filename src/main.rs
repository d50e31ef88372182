fn main() {
    #[cfg(feature = "cli")]
    viewstate::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("viewstate: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
