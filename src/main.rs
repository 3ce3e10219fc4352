fn main() -> anyhow::Result<()> {
    codescope::cli::run()
}
