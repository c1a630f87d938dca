#[tokio::main]
async fn main() {
    tent_rental_backend::run().await;
}
