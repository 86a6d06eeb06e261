use dossier_tracker_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("dossier-tracker error: {err}");
        std::process::exit(1);
    }
}
