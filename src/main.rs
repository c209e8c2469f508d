fn main() {
    #[cfg(feature = "cli")]
    bzflow::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("bzflow: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
