#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chatroom_server::run().await
}
