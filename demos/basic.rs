use langdock_http::{CancellationToken, LangdockClient};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let folder_id: Uuid = std::env::var("LANGDOCK_FOLDER_ID")?.parse()?;
    let client = LangdockClient::from_env().map_err(anyhow::Error::msg)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let knowledge = client.knowledge().cancel_on(cancel);

    let listing = knowledge.list_files(folder_id).await?;
    for file in listing.result {
        println!("{} {} ({})", file.id, file.name, file.mime_type);
    }

    let hits = knowledge.search("release checklist").await?;
    for hit in hits.result {
        println!("{:.3} {} - {}", hit.similarity, hit.subname, hit.url);
    }

    Ok(())
}
