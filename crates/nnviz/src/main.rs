#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = nnviz::cli::run_from_env() {
        tracing::error!(target: "nnviz", error = %error, kind = error.error_type(), "nnviz failed");
        eprintln!("nnviz: {error}");
        std::process::exit(error.exit_code());
    }
}
