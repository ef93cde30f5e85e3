#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = nu_html_checker::cli::main().await;
    std::process::exit(code);
}
