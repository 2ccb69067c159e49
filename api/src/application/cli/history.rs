use nutritot_core::{
    domain::session::ports::HistoryGateway, infrastructure::history::HttpHistoryGateway,
};

use crate::args::HistoryArgs;

pub async fn run(args: HistoryArgs) -> Result<(), anyhow::Error> {
    let gateway = HttpHistoryGateway::new(&args.client.server_url)?;
    let history = gateway.fetch(args.user_id).await?;

    if history.is_empty() {
        eprintln!("No analysis results yet");
    }
    println!("{}", serde_json::to_string_pretty(&history)?);

    Ok(())
}
