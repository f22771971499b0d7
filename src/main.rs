fn main() -> std::process::ExitCode {
    meme_insight_lib::run()
}
